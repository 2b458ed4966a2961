//! Node kinds.
//!
//! Every statement node carries a tag naming its kind. External parsers that
//! hand over trees as `(KIND, fields, line)` records resolve the tag with
//! [`NodeKind::from_tag`]; the code generator uses [`NodeKind::class`] to
//! decide which output stream a node's code goes to.

use std::fmt;

use chonky_core::{CompilationError, Span};

/// The kind of a statement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    VariableAssignment,
    ListDeclaration,
    VariableReassignment,
    IndexReassignment,
    Conditional,
    While,
    ForComp,
    FunctionDeclaration,
    FunctionCall,
    ClassDeclaration,
    Embed,
    Include,
    AdvancedWrite,
    Bitstart,
    Bitdata,
}

/// Where a node's generated code ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// Ordinary statement, goes to the program body.
    Statement,
    /// Function definition, goes to the function stream.
    Definition,
    /// Compile-time directive, produces no code.
    Directive,
}

impl NodeKind {
    const ALL: [NodeKind; 15] = [
        NodeKind::VariableAssignment,
        NodeKind::ListDeclaration,
        NodeKind::VariableReassignment,
        NodeKind::IndexReassignment,
        NodeKind::Conditional,
        NodeKind::While,
        NodeKind::ForComp,
        NodeKind::FunctionDeclaration,
        NodeKind::FunctionCall,
        NodeKind::ClassDeclaration,
        NodeKind::Embed,
        NodeKind::Include,
        NodeKind::AdvancedWrite,
        NodeKind::Bitstart,
        NodeKind::Bitdata,
    ];

    /// The tag string of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::VariableAssignment => "VARIABLE_ASSIGNMENT",
            NodeKind::ListDeclaration => "LIST_DECLARATION",
            NodeKind::VariableReassignment => "VARIABLE_REASSIGNMENT",
            NodeKind::IndexReassignment => "VARIABLE_REASSIGNMENT_AT_INDEX",
            NodeKind::Conditional => "CONDITIONAL",
            NodeKind::While => "WHILE",
            NodeKind::ForComp => "FOR_COMP",
            NodeKind::FunctionDeclaration => "FUNCTION_DECLARATION",
            NodeKind::FunctionCall => "FUNCTION_CALL",
            NodeKind::ClassDeclaration => "CLASS_DECLARATION",
            NodeKind::Embed => "EMBED",
            NodeKind::Include => "INCLUDE",
            NodeKind::AdvancedWrite => "ADVANCED_WRITE",
            NodeKind::Bitstart => "BITSTART",
            NodeKind::Bitdata => "BITDATA",
        }
    }

    /// Resolve a tag string.
    ///
    /// # Errors
    ///
    /// `UnknownAction` if no kind has this tag.
    pub fn from_tag(tag: &str, span: Span) -> Result<Self, CompilationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| CompilationError::UnknownAction {
                kind: tag.to_string(),
                span,
            })
    }

    /// Which output stream this kind writes to.
    pub fn class(self) -> NodeClass {
        match self {
            NodeKind::FunctionDeclaration => NodeClass::Definition,
            NodeKind::Bitstart | NodeKind::Bitdata => NodeClass::Directive,
            _ => NodeClass::Statement,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
