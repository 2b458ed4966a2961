//! Error types for the chonky toolchain.
//!
//! Every error in the toolchain is fatal: the first one raised aborts the
//! build and no partial output is produced.
//!
//! - [`CompilationError`] - raised by the code generator, carries a [`Span`]
//! - [`AssemblyError`] - raised by the assembler, carries an assembly-text line
//! - [`ChonkyError`] - the pipeline-level union of both

use thiserror::Error;

use crate::span::Span;

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error produced while turning an AST into bytes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChonkyError {
    /// Code generation failed.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// Assembly failed.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors raised while generating assembly from the AST.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A referenced variable is not bound in the active scope.
    #[error("at {span}: unknown variable '{name}' (bound: [{}])", .bound.join(", "))]
    UnknownVariable {
        /// The name that was looked up.
        name: String,
        /// Every name bound in the scope at the time, sorted.
        bound: Vec<String>,
        /// Where the variable was referenced.
        span: Span,
    },

    /// A variable was declared twice in one scope.
    #[error("at {span}: variable '{name}' already exists")]
    VariableExists {
        /// The variable name.
        name: String,
        /// Where the second declaration occurred.
        span: Span,
    },

    /// The type of a value does not match the type it is stored into.
    #[error("at {span}: type mismatch for '{name}': found {found}, expected {expected}")]
    TypeMismatch {
        /// The variable (or parameter) being written.
        name: String,
        /// The type of the resolved expression.
        found: String,
        /// The declared type.
        expected: String,
        /// Where the mismatch occurred.
        span: Span,
    },

    /// A type name is not one of the known scalar types.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType {
        /// The type name.
        name: String,
        /// Where the type was named.
        span: Span,
    },

    /// A called function is not declared.
    #[error("at {span}: unknown function '{name}'")]
    UnknownFunction {
        /// The function name, qualified if the call was.
        name: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A function was declared twice in one scope.
    #[error("at {span}: function '{name}' already exists")]
    FunctionExists {
        /// The function name.
        name: String,
        /// Where the second declaration occurred.
        span: Span,
    },

    /// A qualified call named a namespace that does not exist.
    #[error("at {span}: namespace '{name}' not found (available: [{}])", .available.join(", "))]
    NamespaceNotFound {
        /// The namespace name.
        name: String,
        /// Namespaces visible at the call site, sorted.
        available: Vec<String>,
        /// Where the call occurred.
        span: Span,
    },

    /// A node tag does not name any known node kind.
    #[error("at {span}: unknown action '{kind}'")]
    UnknownAction {
        /// The unrecognised tag.
        kind: String,
        /// Where the node came from.
        span: Span,
    },

    /// A literal does not fit in the width of its destination.
    #[error("at {span}: value {value} overflows {ty} '{name}'")]
    Overflow {
        /// The destination variable.
        name: String,
        /// The literal value.
        value: i64,
        /// The destination type name.
        ty: String,
        /// Where the literal occurred.
        span: Span,
    },

    /// A literal index is past the end of a list.
    #[error("at {span}: index {index} out of bounds for '{name}' of length {len}")]
    OutOfBounds {
        /// The list variable.
        name: String,
        /// The index used.
        index: i64,
        /// The list length.
        len: u32,
        /// Where the access occurred.
        span: Span,
    },

    /// A call passed the wrong number of arguments.
    #[error("at {span}: '{function}' takes {expected} argument(s), {found} supplied")]
    ArgumentCount {
        /// The called function.
        function: String,
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied arguments.
        found: usize,
        /// Where the call occurred.
        span: Span,
    },

    /// A shift amount was not a literal.
    #[error("at {span}: shift amount for '{name}' must be a literal")]
    VariableShift {
        /// The destination of the shift.
        name: String,
        /// Where the shift occurred.
        span: Span,
    },

    /// An expression shape that has no code generation.
    #[error("at {span}: unsupported expression: {message}")]
    UnsupportedExpression {
        /// What was found.
        message: String,
        /// Where it occurred.
        span: Span,
    },

    /// A base-address directive outside a scope that allows it.
    #[error("at {span}: base address can only be set at the top level with bit setting enabled")]
    UnauthorizedBitSet {
        /// Where the directive occurred.
        span: Span,
    },

    /// A base-address directive would move an allocation cursor backwards.
    #[error("at {span}: cannot move allocation cursor back from {cursor:#x} to {requested:#x}")]
    AddressRegression {
        /// The requested base address.
        requested: u32,
        /// The current cursor.
        cursor: u32,
        /// Where the directive occurred.
        span: Span,
    },

    /// An allocation would run past the end of the address space.
    #[error("at {span}: no room for {size} byte(s) at {cursor:#x}")]
    AddressOverflow {
        /// Bytes requested.
        size: u32,
        /// The cursor the allocation would start at.
        cursor: u32,
        /// Where the allocation was made.
        span: Span,
    },
}

impl CompilationError {
    /// The source location this error points at.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnknownVariable { span, .. }
            | CompilationError::VariableExists { span, .. }
            | CompilationError::TypeMismatch { span, .. }
            | CompilationError::UnknownType { span, .. }
            | CompilationError::UnknownFunction { span, .. }
            | CompilationError::FunctionExists { span, .. }
            | CompilationError::NamespaceNotFound { span, .. }
            | CompilationError::UnknownAction { span, .. }
            | CompilationError::Overflow { span, .. }
            | CompilationError::OutOfBounds { span, .. }
            | CompilationError::ArgumentCount { span, .. }
            | CompilationError::VariableShift { span, .. }
            | CompilationError::UnsupportedExpression { span, .. }
            | CompilationError::UnauthorizedBitSet { span }
            | CompilationError::AddressRegression { span, .. }
            | CompilationError::AddressOverflow { span, .. } => *span,
        }
    }
}

// ============================================================================
// Assembly Errors
// ============================================================================

/// Errors raised while assembling text into bytes.
///
/// `line` is the 1-based line of the assembly text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The mnemonic is not in the instruction set.
    #[error("line {line}: unbound instruction '{mnemonic}'")]
    UnboundInstruction {
        /// The mnemonic as written.
        mnemonic: String,
        /// Assembly line.
        line: usize,
    },

    /// The instruction has the wrong number of operands.
    #[error("line {line}: '{mnemonic}' expects {expected} operand(s), got {found}")]
    ArityMismatch {
        /// The mnemonic.
        mnemonic: String,
        /// Operands the instruction takes.
        expected: usize,
        /// Operands supplied.
        found: usize,
        /// Assembly line.
        line: usize,
    },

    /// A label operand was never defined.
    #[error("line {line}: unknown label '{label}'")]
    UnknownLabel {
        /// The label name without its sigil.
        label: String,
        /// Assembly line.
        line: usize,
    },

    /// A label was defined twice.
    #[error("line {line}: label '{label}' already defined")]
    DuplicateLabel {
        /// The label name without its sigil.
        label: String,
        /// Assembly line of the second definition.
        line: usize,
    },

    /// An operand could not be parsed for its slot.
    #[error("line {line}: invalid operand '{operand}': {reason}")]
    InvalidOperand {
        /// The operand as written.
        operand: String,
        /// What was expected.
        reason: &'static str,
        /// Assembly line.
        line: usize,
    },

    /// A register field does not fit in one byte.
    #[error("line {line}: operand '{operand}' does not fit in a byte")]
    OperandRange {
        /// The operand as written.
        operand: String,
        /// Assembly line.
        line: usize,
    },

    /// A `$N` reference looks past the last instruction.
    #[error("line {line}: forward reference ${distance} runs past the end of the program")]
    ForwardReferencePastEnd {
        /// The requested distance.
        distance: usize,
        /// Assembly line.
        line: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variable_lists_bound_names() {
        let err = CompilationError::UnknownVariable {
            name: "z".into(),
            bound: vec!["a".into(), "b".into()],
            span: Span::new(4),
        };
        assert_eq!(
            err.to_string(),
            "at line 4: unknown variable 'z' (bound: [a, b])"
        );
        assert_eq!(err.span(), Span::new(4));
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let err = CompilationError::TypeMismatch {
            name: "x".into(),
            found: "char".into(),
            expected: "int".into(),
            span: Span::new(2),
        };
        assert_eq!(
            err.to_string(),
            "at line 2: type mismatch for 'x': found char, expected int"
        );
    }

    #[test]
    fn pipeline_error_is_transparent() {
        let err: ChonkyError = AssemblyError::UnboundInstruction {
            mnemonic: "frob".into(),
            line: 9,
        }
        .into();
        assert_eq!(err.to_string(), "line 9: unbound instruction 'frob'");
    }
}
