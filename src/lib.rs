//! chonky: a scoped code generator and two-pass assembler for the chonky
//! register machine.
//!
//! The workspace is split by stage:
//! - [`chonky_core`] - spans, storage types and the error taxonomy
//! - [`chonky_ast`] - the tree handed over by the parser
//! - [`chonky_codegen`] - scopes, symbol tables and statement handlers
//! - [`chonky_asm`] - the instruction set table and the assembler
//!
//! This crate ties them together behind [`Unit`], which compiles a program,
//! splices it into the runtime template and assembles the result.

pub mod template;
pub mod unit;

pub use unit::{Build, Unit, UnitConfig};

pub use chonky_asm::{Assembler, ObjectCode};
pub use chonky_codegen::{CompileFlags, CompilerConfig};
pub use chonky_core::{AssemblyError, ChonkyError, CompilationError};

/// Result type for a full build.
pub type Result<T> = std::result::Result<T, ChonkyError>;
