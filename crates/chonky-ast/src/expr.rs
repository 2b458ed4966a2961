//! Expression AST nodes.
//!
//! Expressions are the right-hand sides of declarations, assignments and
//! call arguments. Literal kinds map one-to-one onto the scalar types; the
//! rest reference variables by name.

use crate::ops::{BinaryOp, Comparison};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Decimal integer literal.
    Int(i64),
    /// Hexadecimal integer literal.
    Hex(u32),
    /// Character literal, as its code.
    Char(u8),
    /// String literal. One character behaves as a `Char`; longer strings are char lists.
    Str(&'ast str),
    /// Reference to a variable.
    Ident(&'ast str),
    /// List literal `[a, b, c]`.
    List(&'ast [Expr<'ast>]),
    /// Element read `xs[i]`.
    Index(&'ast IndexExpr<'ast>),
    /// Address of a variable `&x`.
    AddressOf(&'ast str),
    /// Read through a pointer `*p`.
    Deref(&'ast str),
    /// Arithmetic `a + b`.
    Binary(&'ast BinaryExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// The node tag for this expression, used in diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Expr::Int(_) => "INT",
            Expr::Hex(_) => "HEX",
            Expr::Char(_) => "CHAR",
            Expr::Str(_) => "STRING",
            Expr::Ident(_) => "ID",
            Expr::List(_) => "LIST",
            Expr::Index(_) => "GET_INDEX",
            Expr::AddressOf(_) => "POINTER",
            Expr::Deref(_) => "DEREFERENCE",
            Expr::Binary(_) => "ARITHMETIC",
        }
    }

    /// The value of an integer-like literal.
    pub fn literal_value(&self) -> Option<i64> {
        match *self {
            Expr::Int(value) => Some(value),
            Expr::Hex(value) => Some(i64::from(value)),
            Expr::Char(code) => Some(i64::from(code)),
            _ => None,
        }
    }
}

/// `list[index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    /// The list variable.
    pub list: &'ast str,
    /// A literal or a variable reference.
    pub index: Expr<'ast>,
}

/// `lhs op rhs`. Both operands are literals or variable references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// The operator.
    pub op: BinaryOp,
    /// Left operand.
    pub lhs: Expr<'ast>,
    /// Right operand.
    pub rhs: Expr<'ast>,
}

/// The comparison guarding an `if` or `while`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition<'ast> {
    /// The comparator.
    pub op: Comparison,
    /// First compared operand.
    pub lhs: Expr<'ast>,
    /// Second compared operand.
    pub rhs: Expr<'ast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values() {
        assert_eq!(Expr::Int(-3).literal_value(), Some(-3));
        assert_eq!(Expr::Hex(0xff).literal_value(), Some(255));
        assert_eq!(Expr::Char(b'A').literal_value(), Some(65));
        assert_eq!(Expr::Ident("x").literal_value(), None);
    }

    #[test]
    fn tags() {
        assert_eq!(Expr::Str("hi").tag(), "STRING");
        assert_eq!(Expr::AddressOf("x").tag(), "POINTER");
    }
}
