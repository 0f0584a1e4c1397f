//! Node variants.
//!
//! A node is one heap block. Every child handle stored in a variant is an
//! owning edge: the parent holds one reference on it, released when the
//! parent is torn down. The only non-owning link is [`Var::next`], the
//! substitution chain.

use smallvec::SmallVec;

use crate::{Ident, NodeId};

/// Native routine behind a `Function` node.
///
/// Dispatch happens in the evaluator by matching on this enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Builds an abstraction from a parameter list and a body.
    Abst,
    /// Binds a symbol in the symbol table.
    Set,
}

impl Builtin {
    /// Exact number of arguments the native routine consumes.
    pub const fn arity(self) -> usize {
        match self {
            Builtin::Add
            | Builtin::Sub
            | Builtin::Mul
            | Builtin::Div
            | Builtin::Mod
            | Builtin::Abst
            | Builtin::Set => 2,
        }
    }

    /// Canonical name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Add => "add",
            Builtin::Sub => "sub",
            Builtin::Mul => "mul",
            Builtin::Div => "div",
            Builtin::Mod => "mod",
            Builtin::Abst => "abst",
            Builtin::Set => "set",
        }
    }
}

/// Which child slot of a parent a [`Location`] designates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// `Cons::head` of a list cell.
    Head,
    /// `Application::func`.
    Func,
    /// `Abstraction::body`.
    Body,
}

/// A child slot inside a parent node: the target of a substitution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub parent: NodeId,
    pub edge: Edge,
}

impl Location {
    pub const fn new(parent: NodeId, edge: Edge) -> Self {
        Location { parent, edge }
    }
}

/// Variable occurrence.
#[derive(Clone, Debug)]
pub struct Var {
    pub name: Ident,
    /// Next slot in the substitution chain, if any.
    ///
    /// On a bound variable (an element of an abstraction's parameter list)
    /// this is the first occurrence of that variable in the body; on an
    /// occurrence it is the following occurrence.
    pub next: Option<Location>,
}

impl Var {
    pub fn new(name: Ident) -> Self {
        Var { name, next: None }
    }
}

/// Built-in function value.
#[derive(Clone, Debug)]
pub struct Function {
    /// Name it was registered under (aliases keep their own spelling).
    pub name: Ident,
    pub arity: usize,
    pub builtin: Builtin,
}

/// Lambda abstraction. `arity` always equals the length of `vars`.
#[derive(Copy, Clone, Debug)]
pub struct Abstraction {
    /// List of `Var` nodes.
    pub vars: NodeId,
    pub arity: usize,
    pub body: NodeId,
}

/// Pending call.
#[derive(Copy, Clone, Debug)]
pub struct Application {
    pub func: NodeId,
    /// Non-empty argument list.
    pub args: NodeId,
}

/// List cell.
#[derive(Copy, Clone, Debug)]
pub struct Cons {
    pub head: NodeId,
    /// Next cell, or `None` on the last one.
    pub rest: Option<NodeId>,
}

/// Payload of a heap block.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Int(i64),
    Var(Var),
    Function(Function),
    Abstraction(Abstraction),
    Application(Application),
    List(Cons),
}

/// Fieldless mirror of [`NodeKind`] for dispatch without holding a borrow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Int,
    Var,
    Function,
    Abstraction,
    Application,
    List,
}

impl NodeTag {
    /// Diagnostic type label.
    pub const fn label(self) -> &'static str {
        match self {
            NodeTag::Int => "int",
            NodeTag::Var => "var",
            NodeTag::Function => "function",
            NodeTag::Abstraction => "abstraction",
            NodeTag::Application => "application",
            NodeTag::List => "list",
        }
    }
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Int(_) => NodeTag::Int,
            NodeKind::Var(_) => NodeTag::Var,
            NodeKind::Function(_) => NodeTag::Function,
            NodeKind::Abstraction(_) => NodeTag::Abstraction,
            NodeKind::Application(_) => NodeTag::Application,
            NodeKind::List(_) => NodeTag::List,
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.tag().label()
    }

    /// Owned child handles, in field order.
    pub fn children(&self) -> SmallVec<[NodeId; 2]> {
        let mut children = SmallVec::new();
        match self {
            NodeKind::Int(_) | NodeKind::Var(_) | NodeKind::Function(_) => {}
            NodeKind::Abstraction(abs) => {
                children.push(abs.vars);
                children.push(abs.body);
            }
            NodeKind::Application(app) => {
                children.push(app.func);
                children.push(app.args);
            }
            NodeKind::List(cons) => {
                children.push(cons.head);
                children.extend(cons.rest);
            }
        }
        children
    }
}
