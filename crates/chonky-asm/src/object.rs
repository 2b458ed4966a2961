//! Assembled output.
//!
//! An [`ObjectCode`] is the flat byte stream of a program, one array slot
//! per encoded field, plus the source line each byte came from and the
//! label table the assembler resolved against.

use crate::isa::Opcode;
use crate::labels::LabelTable;

/// Encoded program.
#[derive(Debug, Clone, Default)]
pub struct ObjectCode {
    /// The encoded bytes.
    code: Vec<u8>,
    /// Assembly line of each byte (parallel to `code`).
    lines: Vec<usize>,
    /// Label offsets from the first pass.
    labels: LabelTable,
}

impl ObjectCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty object with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
            labels: LabelTable::new(),
        }
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: Opcode, line: usize) {
        self.write_byte(op.into(), line);
    }

    /// Write one operand field.
    pub fn write_byte(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, line: usize) {
        let [hi, lo] = value.to_be_bytes();
        self.write_byte(hi, line);
        self.write_byte(lo, line);
    }

    pub(crate) fn set_labels(&mut self, labels: LabelTable) {
        self.labels = labels;
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Line info for each byte.
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    /// Assembly line the byte at `offset` came from.
    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The 4-byte word starting at `offset`.
    pub fn word_at(&self, offset: usize) -> Option<[u8; 4]> {
        let slice = self.code.get(offset..offset + 4)?;
        <[u8; 4]>::try_from(slice).ok()
    }

    /// Decode the opcode of every word, in order.
    ///
    /// Stops at the first byte that is not an opcode.
    pub fn opcodes(&self) -> Vec<Opcode> {
        self.code
            .chunks_exact(4)
            .map_while(|word| Opcode::try_from(word[0]).ok())
            .collect()
    }

    /// Consume the object, keeping only the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_word() {
        let mut object = ObjectCode::new();
        object.write_op(Opcode::Iadd, 1);
        object.write_byte(26, 1);
        object.write_u16(0x0102, 1);

        assert_eq!(object.code(), &[0x30, 26, 0x01, 0x02]);
        assert_eq!(object.word_at(0), Some([0x30, 26, 1, 2]));
        assert_eq!(object.line_at(3), Some(1));
        assert_eq!(object.opcodes(), vec![Opcode::Iadd]);
    }

    #[test]
    fn word_past_end() {
        let object = ObjectCode::with_capacity(8);
        assert!(object.is_empty());
        assert_eq!(object.word_at(0), None);
    }
}
