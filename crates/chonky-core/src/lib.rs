//! Core types shared by every chonky crate.
//!
//! This crate provides:
//! - [`Span`] for source-line tracking in diagnostics
//! - [`ScalarType`] and [`ValueType`], the storage types of the language
//! - The error taxonomy: [`CompilationError`], [`AssemblyError`] and [`ChonkyError`]

pub mod error;
pub mod span;
pub mod types;

pub use error::{AssemblyError, ChonkyError, CompilationError};
pub use span::Span;
pub use types::{ScalarType, ValueType};
