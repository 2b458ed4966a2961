//! Assembly text reader.
//!
//! One instruction or label per line. A label line starts with `.`;
//! everything after a `;` is a comment. Operands are separated by commas
//! and/or whitespace.

use chonky_core::AssemblyError;

use crate::Result;
use crate::isa::Mnemonic;

/// What a non-empty line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'src> {
    /// `.name`, stored without the sigil.
    Label(&'src str),
    /// A mnemonic and its operands as written.
    Instruction {
        mnemonic: Mnemonic,
        operands: Vec<&'src str>,
    },
}

/// A meaningful line of assembly text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'src> {
    /// 1-based line number in the text.
    pub number: usize,
    pub kind: LineKind<'src>,
}

/// Split assembly text into labels and instructions, dropping blank and
/// comment-only lines.
///
/// # Errors
///
/// `UnboundInstruction` for a mnemonic outside the instruction set, and
/// `InvalidOperand` for a label line with no name.
pub fn read_lines(source: &str) -> Result<Vec<SourceLine<'_>>> {
    let mut lines = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = match raw.find(';') {
            Some(comment) => &raw[..comment],
            None => raw,
        }
        .trim();

        if text.is_empty() {
            continue;
        }

        if let Some(label) = text.strip_prefix('.') {
            let Some(name) = label.split_whitespace().next() else {
                return Err(AssemblyError::InvalidOperand {
                    operand: text.to_string(),
                    reason: "label has no name",
                    line: number,
                });
            };
            lines.push(SourceLine {
                number,
                kind: LineKind::Label(name),
            });
            continue;
        }

        let mut tokens = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty());
        let Some(name) = tokens.next() else {
            continue;
        };
        let Some(mnemonic) = Mnemonic::from_name(name) else {
            return Err(AssemblyError::UnboundInstruction {
                mnemonic: name.to_string(),
                line: number,
            });
        };

        lines.push(SourceLine {
            number,
            kind: LineKind::Instruction {
                mnemonic,
                operands: tokens.collect(),
            },
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_labels_and_instructions() {
        let source = "; header\n.main\n    ldr r11, 0x10000000 ; address\n\njpr r0\n";
        let lines = read_lines(source).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[0].kind, LineKind::Label("main"));
        assert_eq!(
            lines[1].kind,
            LineKind::Instruction {
                mnemonic: Mnemonic::Ldr,
                operands: vec!["r11", "0x10000000"],
            }
        );
        assert_eq!(lines[2].number, 5);
    }

    #[test]
    fn operands_split_on_commas_and_spaces() {
        let lines = read_lines("add r12,r12 ,  r13").unwrap();
        assert_eq!(
            lines[0].kind,
            LineKind::Instruction {
                mnemonic: Mnemonic::Add,
                operands: vec!["r12", "r12", "r13"],
            }
        );
    }

    #[test]
    fn unknown_mnemonic_is_unbound() {
        let err = read_lines("ldr r1, 5\nhalt\n").unwrap_err();
        assert_eq!(
            err,
            AssemblyError::UnboundInstruction {
                mnemonic: "halt".into(),
                line: 2,
            }
        );
    }

    #[test]
    fn namespaced_labels_are_kept_whole() {
        let lines = read_lines(".Math::square").unwrap();
        assert_eq!(lines[0].kind, LineKind::Label("Math::square"));
    }
}
