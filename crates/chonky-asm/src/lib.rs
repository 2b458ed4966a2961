//! Two-pass assembler for the chonky register machine.
//!
//! This crate provides:
//! - The Instruction Set Table ([`Mnemonic`], [`Opcode`], [`Encoding`])
//! - A line reader that splits assembly text into labels and instructions
//! - [`Assembler`], which lays out label offsets in pass 1 and encodes in pass 2
//! - [`ObjectCode`], the flat byte output with per-byte line info
//!
//! # Example
//!
//! ```
//! use chonky_asm::Assembler;
//!
//! let object = Assembler::new()
//!     .assemble(".start\nldr r16, .start\njpr r16\n")
//!     .unwrap();
//! assert_eq!(object.len(), 12);
//! assert_eq!(object.labels().get("start"), Some(0));
//! ```

pub mod assembler;
pub mod isa;
pub mod labels;
pub mod object;
pub mod source;

pub use assembler::{Assembler, Layout};
pub use isa::{Encoding, Mnemonic, Opcode};
pub use labels::LabelTable;
pub use object::ObjectCode;
pub use source::{LineKind, SourceLine, read_lines};

/// Result type for assembler operations.
pub type Result<T> = std::result::Result<T, chonky_core::AssemblyError>;
