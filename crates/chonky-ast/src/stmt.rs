//! Statement AST nodes.
//!
//! Provides nodes for every construct the code generator handles:
//! - Declarations (scalars, pointers, lists) and reassignments
//! - Control flow (if/else, while, compile-time for)
//! - Functions, calls and namespaces
//! - Raw assembly, inclusion of external units, raw memory writes
//! - Base-address directives

use chonky_core::{ScalarType, Span, ValueType};

use crate::expr::{Condition, Expr};
use crate::node::NodeKind;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// `int x = value;`
    VarDecl(&'ast VarDecl<'ast>),
    /// `int<char> xs[3] = [...];`
    ListDecl(&'ast ListDecl<'ast>),
    /// `x = value;`
    Reassign(&'ast Reassign<'ast>),
    /// `xs[i] = value;`
    IndexAssign(&'ast IndexAssign<'ast>),
    /// `if (a op b) { ... } else { ... }`
    If(&'ast IfStmt<'ast>),
    /// `while (a op b) { ... }`
    While(&'ast WhileStmt<'ast>),
    /// `for i in xs { ... }`, unrolled during compilation.
    For(&'ast ForStmt<'ast>),
    /// `fn name(params) { ... }`
    FunctionDecl(&'ast FunctionDecl<'ast>),
    /// `name(args);` or `ns::name(args);`
    Call(&'ast CallStmt<'ast>),
    /// `class Name { ... }`
    Namespace(&'ast NamespaceDecl<'ast>),
    /// Raw assembly with `{name}` placeholders.
    Embed(&'ast EmbedStmt<'ast>),
    /// An external unit parsed ahead of time.
    Include(&'ast IncludeStmt<'ast>),
    /// `[addr, type] = value;`
    AdvancedWrite(&'ast AdvancedWrite<'ast>),
    /// `bitstart addr` / `bitdata addr`
    Directive(Directive),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::VarDecl(s) => s.span,
            Self::ListDecl(s) => s.span,
            Self::Reassign(s) => s.span,
            Self::IndexAssign(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::For(s) => s.span,
            Self::FunctionDecl(s) => s.span,
            Self::Call(s) => s.span,
            Self::Namespace(s) => s.span,
            Self::Embed(s) => s.span,
            Self::Include(s) => s.span,
            Self::AdvancedWrite(s) => s.span,
            Self::Directive(s) => s.span,
        }
    }

    /// The node kind of this statement.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::VarDecl(_) => NodeKind::VariableAssignment,
            Self::ListDecl(_) => NodeKind::ListDeclaration,
            Self::Reassign(_) => NodeKind::VariableReassignment,
            Self::IndexAssign(_) => NodeKind::IndexReassignment,
            Self::If(_) => NodeKind::Conditional,
            Self::While(_) => NodeKind::While,
            Self::For(_) => NodeKind::ForComp,
            Self::FunctionDecl(_) => NodeKind::FunctionDeclaration,
            Self::Call(_) => NodeKind::FunctionCall,
            Self::Namespace(_) => NodeKind::ClassDeclaration,
            Self::Embed(_) => NodeKind::Embed,
            Self::Include(_) => NodeKind::Include,
            Self::AdvancedWrite(_) => NodeKind::AdvancedWrite,
            Self::Directive(d) => match d.kind {
                DirectiveKind::Bitstart => NodeKind::Bitstart,
                DirectiveKind::Bitdata => NodeKind::Bitdata,
            },
        }
    }
}

/// Scalar or pointer declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    /// Declared type. A `List` type here is declared through the list path.
    pub ty: ValueType,
    /// Variable name.
    pub name: &'ast str,
    /// Initial value.
    pub value: Expr<'ast>,
    pub span: Span,
}

/// List declaration.
///
/// Elements come from `value` when present, otherwise `len` zeroed elements
/// of `element` are declared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListDecl<'ast> {
    /// List name.
    pub name: &'ast str,
    /// Element type. Inferred from the first element when absent.
    pub element: Option<ScalarType>,
    /// Declared length.
    pub len: Option<u32>,
    /// A list literal, a string, or a variable to copy from.
    pub value: Option<Expr<'ast>>,
    pub span: Span,
}

/// Reassignment of an existing variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reassign<'ast> {
    pub name: &'ast str,
    pub value: Expr<'ast>,
    pub span: Span,
}

/// Write to one element of a list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexAssign<'ast> {
    /// The list variable.
    pub name: &'ast str,
    /// Literal or variable index.
    pub index: Expr<'ast>,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: Condition<'ast>,
    pub then_body: &'ast [Stmt<'ast>],
    pub else_body: Option<&'ast [Stmt<'ast>]>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: Condition<'ast>,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// Loop over the indices of a list whose length is known while compiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Loop variable, declared as `int`.
    pub var: &'ast str,
    /// The list whose length bounds the loop.
    pub iterable: &'ast str,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: &'ast str,
    pub ty: ValueType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: &'ast str,
    pub params: &'ast [Param<'ast>],
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallStmt<'ast> {
    /// Namespace qualifier of `ns::name(...)`.
    pub namespace: Option<&'ast str>,
    pub name: &'ast str,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamespaceDecl<'ast> {
    pub name: &'ast str,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// Raw assembly. `{name}` is replaced with the address of variable `name`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedStmt<'ast> {
    pub code: &'ast str,
    pub span: Span,
}

/// An included unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncludeStmt<'ast> {
    /// Where the unit was read from.
    pub path: &'ast str,
    /// Its top-level statements.
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// Store to a literal address, bypassing the variable table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvancedWrite<'ast> {
    pub address: u32,
    /// Width of the store.
    pub ty: ScalarType,
    pub value: Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Moves the variable allocation cursor.
    Bitstart,
    /// Moves the data allocation cursor.
    Bitdata,
}

/// A compile-time directive. Emits no code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub address: u32,
    pub span: Span,
}
