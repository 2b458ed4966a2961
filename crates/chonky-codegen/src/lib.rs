//! Scoped code generator for chonky.
//!
//! Walks an already-parsed [`chonky_ast`] tree and emits assembly text for
//! the chonky register machine. This crate provides:
//! - [`SymbolArena`], the per-scope variable, function and namespace tables
//!   with their bump-allocation cursors
//! - [`Scope`], the compilation context of one block, forked for nested
//!   blocks and synced back through a [`ScopeLink`]
//! - [`StmtCompiler`] and [`ExprCompiler`], one handler per node kind
//! - A typed instruction IR ([`Instr`], [`Item`]) collected into
//!   [`Fragment`]s and rendered to text at the end
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use chonky_ast::AstBuilder;
//! use chonky_codegen::{CompilerConfig, compile};
//! use chonky_core::ScalarType;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let program = ast.program(&[
//!     ast.var_decl(1, ScalarType::Int, "x", ast.int(5)),
//!     ast.reassign(2, "x", ast.int(7)),
//! ]);
//!
//! let compiled = compile(program, CompilerConfig::default()).unwrap();
//! assert!(compiled.body_text().contains("ldr r20, #7"));
//! ```

pub mod config;
pub mod emit;
pub mod expr;
pub mod ir;
pub mod program;
pub mod scope;
pub mod stmt;
pub mod symbols;

pub use config::{CompileFlags, CompilerConfig};
pub use emit::{Fragment, IfLabels, WhileLabels};
pub use expr::{ExprCompiler, Loaded};
pub use ir::{AluOp, BranchCond, Instr, Item, Operand, Reg, Routine, ShiftOp, Width};
pub use program::{CompiledProgram, compile};
pub use scope::{Scope, ScopeLink, ScopeMode};
pub use stmt::StmtCompiler;
pub use symbols::{Function, Namespace, Param, StoredValue, SymbolArena, Variable};

use chonky_core::CompilationError;

/// Result type for code generation.
pub type Result<T> = std::result::Result<T, CompilationError>;
