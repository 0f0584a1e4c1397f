//! Stack growth for deep tree walks.
//!
//! Expression trees handed to the runtime can be arbitrarily deep: a long
//! list literal is a right-nested chain of cons cells, and a chain of curried
//! applications nests one application per argument. Every recursive walk over
//! the heap (reduction, deep clone, parsing and printing) runs its body
//! through [`ensure_sufficient_stack`] so that depth is bounded by memory and
//! by the configured reduction ceiling, never by the native thread stack.
//!
//! On native targets the stack is grown on demand with `stacker`. On WASM the
//! closure is called directly.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn count_cells(&self, id: NodeId) -> usize {
///     ensure_sufficient_stack(|| match self.rest(id) {
///         Some(rest) => 1 + self.count_cells(rest),
///         None => 1,
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
