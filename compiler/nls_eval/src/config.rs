//! Runtime configuration.

/// Default ceiling on reduction steps along one evaluation path.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Limits applied to one runtime session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum reduction depth, or `None` for no limit.
    ///
    /// Each trip through the reduction loop and each nested reduction of an
    /// operator or built-in argument counts one step. Exceeding the limit
    /// fails the expression with `ReductionTooDeep`.
    pub max_depth: Option<usize>,
    /// Maximum number of live heap nodes, or `None` for no limit.
    pub max_nodes: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_nodes: None,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}
