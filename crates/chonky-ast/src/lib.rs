//! Abstract syntax tree consumed by the chonky code generator.
//!
//! The tree is produced by an external parser and handed over already built.
//! This crate provides:
//! - Arena-allocated node definitions ([`Stmt`], [`Expr`], [`Condition`])
//! - Operator enums ([`BinaryOp`], [`Comparison`])
//! - [`NodeKind`], the tag of every statement node and its output class
//! - [`AstBuilder`] for constructing trees in a [`bumpalo::Bump`]
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use chonky_ast::AstBuilder;
//! use chonky_core::ScalarType;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let program = ast.program(&[
//!     ast.var_decl(1, ScalarType::Int, "a", ast.int(5)),
//!     ast.reassign(2, "a", ast.int(7)),
//! ]);
//! assert_eq!(program.len(), 2);
//! ```

pub mod builder;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;

pub use builder::AstBuilder;
pub use expr::{BinaryExpr, Condition, Expr, IndexExpr};
pub use node::{NodeClass, NodeKind};
pub use ops::{BinaryOp, Comparison};
pub use stmt::{
    AdvancedWrite, CallStmt, Directive, DirectiveKind, EmbedStmt, ForStmt, FunctionDecl, IfStmt,
    IncludeStmt, IndexAssign, ListDecl, NamespaceDecl, Param, Reassign, Stmt, VarDecl, WhileStmt,
};
