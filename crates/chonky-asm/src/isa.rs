//! Instruction Set Table.
//!
//! Every mnemonic maps to an opcode, an operand count and an encoding rule.
//! All real instructions are one 4-byte word `[opcode, a, b, c]`; the `ldr`
//! pseudo-instruction is two words (`ldru` then `ldrl`) carrying the high and
//! low halves of a 32-bit value.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Machine opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    // =========================================================================
    // Register arithmetic: [op, ra, rb, rc]
    // =========================================================================
    Add = 0x00,
    Sub = 0x01,
    Mult = 0x02,
    Div = 0x03,
    And = 0x04,
    Or = 0x05,
    Xor = 0x06,
    Not = 0x07,

    // =========================================================================
    // Shifts and half-word loads: [op, ra, hi, lo]
    // =========================================================================
    /// Shift `ra` left by an immediate.
    Lsh = 0x08,
    /// Shift `ra` right by an immediate.
    Rsh = 0x09,
    /// Load the upper 16 bits of `ra`.
    Ldru = 0x10,
    /// Load the lower 16 bits of `ra`.
    Ldrl = 0x11,

    // =========================================================================
    // Memory: [op, ra, 0, rb], rb holds the address
    // =========================================================================
    Ldw = 0x12,
    Ldh = 0x13,
    Ldb = 0x14,
    Stw = 0x15,
    Sth = 0x16,
    Stb = 0x17,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Jump to the address in `ra`: [op, ra, 0, 0]
    Jpr = 0x18,
    /// Jump to `ra` if `rb == rc`.
    Jpre = 0x19,
    /// Jump to `ra` if `rb != rc`.
    Jprne = 0x20,
    /// Jump to `ra` if `rb > rc`.
    Jprgt = 0x21,
    /// Jump to `ra` if `rb < rc`.
    Jprlt = 0x22,
    /// Copy `rb` into `ra`: [op, ra, rb, 0]
    Mov = 0x23,

    // =========================================================================
    // Immediate arithmetic: [op, ra, hi, lo]
    // =========================================================================
    Iadd = 0x30,
    Isub = 0x31,
    Imult = 0x32,
    Idiv = 0x33,
    Iand = 0x34,
    Ior = 0x35,
    Ixor = 0x36,
    Inot = 0x37,
}

/// How an instruction's operands are laid out in its word(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// `op ra, rb, rc` → `[op, ra, rb, rc]`
    ThreeReg,
    /// `op ra, value` → `[op, ra, value >> 8, value & 0xff]`
    RegImm16,
    /// `op ra, rb` → `[op, ra, 0, rb]`
    RegMem,
    /// `jpr ra` → `[op, ra, 0, 0]`
    Jump,
    /// `mov ra, rb` → `[op, ra, rb, 0]`
    Move,
    /// `ldr ra, value` → `ldru` and `ldrl` words for the two halves of `value`.
    LoadWord,
}

impl Encoding {
    /// Number of operands.
    pub const fn arity(self) -> usize {
        match self {
            Encoding::ThreeReg => 3,
            Encoding::RegImm16 | Encoding::RegMem | Encoding::Move | Encoding::LoadWord => 2,
            Encoding::Jump => 1,
        }
    }

    /// Encoded length in bytes.
    pub const fn len(self) -> u32 {
        match self {
            Encoding::LoadWord => 8,
            _ => 4,
        }
    }
}

/// Assembly mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Add,
    Sub,
    Mult,
    Div,
    And,
    Or,
    Xor,
    Not,
    Lsh,
    Rsh,
    Ldru,
    Ldrl,
    Ldw,
    Ldh,
    Ldb,
    Stw,
    Sth,
    Stb,
    Jpr,
    Jpre,
    Jprne,
    Jprgt,
    Jprlt,
    Mov,
    Iadd,
    Isub,
    Imult,
    Idiv,
    Iand,
    Ior,
    Ixor,
    Inot,
    /// Pseudo-instruction loading a full 32-bit value.
    Ldr,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 33] = [
        Mnemonic::Add,
        Mnemonic::Sub,
        Mnemonic::Mult,
        Mnemonic::Div,
        Mnemonic::And,
        Mnemonic::Or,
        Mnemonic::Xor,
        Mnemonic::Not,
        Mnemonic::Lsh,
        Mnemonic::Rsh,
        Mnemonic::Ldru,
        Mnemonic::Ldrl,
        Mnemonic::Ldw,
        Mnemonic::Ldh,
        Mnemonic::Ldb,
        Mnemonic::Stw,
        Mnemonic::Sth,
        Mnemonic::Stb,
        Mnemonic::Jpr,
        Mnemonic::Jpre,
        Mnemonic::Jprne,
        Mnemonic::Jprgt,
        Mnemonic::Jprlt,
        Mnemonic::Mov,
        Mnemonic::Iadd,
        Mnemonic::Isub,
        Mnemonic::Imult,
        Mnemonic::Idiv,
        Mnemonic::Iand,
        Mnemonic::Ior,
        Mnemonic::Ixor,
        Mnemonic::Inot,
        Mnemonic::Ldr,
    ];

    /// The mnemonic as written in assembly text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Sub => "sub",
            Mnemonic::Mult => "mult",
            Mnemonic::Div => "div",
            Mnemonic::And => "and",
            Mnemonic::Or => "or",
            Mnemonic::Xor => "xor",
            Mnemonic::Not => "not",
            Mnemonic::Lsh => "lsh",
            Mnemonic::Rsh => "rsh",
            Mnemonic::Ldru => "ldru",
            Mnemonic::Ldrl => "ldrl",
            Mnemonic::Ldw => "ldw",
            Mnemonic::Ldh => "ldh",
            Mnemonic::Ldb => "ldb",
            Mnemonic::Stw => "stw",
            Mnemonic::Sth => "sth",
            Mnemonic::Stb => "stb",
            Mnemonic::Jpr => "jpr",
            Mnemonic::Jpre => "jpre",
            Mnemonic::Jprne => "jprne",
            Mnemonic::Jprgt => "jprgt",
            Mnemonic::Jprlt => "jprlt",
            Mnemonic::Mov => "mov",
            Mnemonic::Iadd => "iadd",
            Mnemonic::Isub => "isub",
            Mnemonic::Imult => "imult",
            Mnemonic::Idiv => "idiv",
            Mnemonic::Iand => "iand",
            Mnemonic::Ior => "ior",
            Mnemonic::Ixor => "ixor",
            Mnemonic::Inot => "inot",
            Mnemonic::Ldr => "ldr",
        }
    }

    /// Look up a mnemonic by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }

    /// The opcode of the (first) word this mnemonic encodes to.
    ///
    /// `ldr` reports `Ldru`; its second word is always `Ldrl`.
    pub const fn opcode(self) -> Opcode {
        match self {
            Mnemonic::Add => Opcode::Add,
            Mnemonic::Sub => Opcode::Sub,
            Mnemonic::Mult => Opcode::Mult,
            Mnemonic::Div => Opcode::Div,
            Mnemonic::And => Opcode::And,
            Mnemonic::Or => Opcode::Or,
            Mnemonic::Xor => Opcode::Xor,
            Mnemonic::Not => Opcode::Not,
            Mnemonic::Lsh => Opcode::Lsh,
            Mnemonic::Rsh => Opcode::Rsh,
            Mnemonic::Ldru | Mnemonic::Ldr => Opcode::Ldru,
            Mnemonic::Ldrl => Opcode::Ldrl,
            Mnemonic::Ldw => Opcode::Ldw,
            Mnemonic::Ldh => Opcode::Ldh,
            Mnemonic::Ldb => Opcode::Ldb,
            Mnemonic::Stw => Opcode::Stw,
            Mnemonic::Sth => Opcode::Sth,
            Mnemonic::Stb => Opcode::Stb,
            Mnemonic::Jpr => Opcode::Jpr,
            Mnemonic::Jpre => Opcode::Jpre,
            Mnemonic::Jprne => Opcode::Jprne,
            Mnemonic::Jprgt => Opcode::Jprgt,
            Mnemonic::Jprlt => Opcode::Jprlt,
            Mnemonic::Mov => Opcode::Mov,
            Mnemonic::Iadd => Opcode::Iadd,
            Mnemonic::Isub => Opcode::Isub,
            Mnemonic::Imult => Opcode::Imult,
            Mnemonic::Idiv => Opcode::Idiv,
            Mnemonic::Iand => Opcode::Iand,
            Mnemonic::Ior => Opcode::Ior,
            Mnemonic::Ixor => Opcode::Ixor,
            Mnemonic::Inot => Opcode::Inot,
        }
    }

    /// The operand encoding rule.
    pub const fn encoding(self) -> Encoding {
        match self {
            Mnemonic::Add
            | Mnemonic::Sub
            | Mnemonic::Mult
            | Mnemonic::Div
            | Mnemonic::And
            | Mnemonic::Or
            | Mnemonic::Xor
            | Mnemonic::Not
            | Mnemonic::Jpre
            | Mnemonic::Jprne
            | Mnemonic::Jprgt
            | Mnemonic::Jprlt => Encoding::ThreeReg,
            Mnemonic::Lsh
            | Mnemonic::Rsh
            | Mnemonic::Ldru
            | Mnemonic::Ldrl
            | Mnemonic::Iadd
            | Mnemonic::Isub
            | Mnemonic::Imult
            | Mnemonic::Idiv
            | Mnemonic::Iand
            | Mnemonic::Ior
            | Mnemonic::Ixor
            | Mnemonic::Inot => Encoding::RegImm16,
            Mnemonic::Ldw
            | Mnemonic::Ldh
            | Mnemonic::Ldb
            | Mnemonic::Stw
            | Mnemonic::Sth
            | Mnemonic::Stb => Encoding::RegMem,
            Mnemonic::Jpr => Encoding::Jump,
            Mnemonic::Mov => Encoding::Move,
            Mnemonic::Ldr => Encoding::LoadWord,
        }
    }

    /// Number of operands.
    #[inline]
    pub const fn arity(self) -> usize {
        self.encoding().arity()
    }

    /// Encoded length in bytes.
    #[inline]
    pub const fn len(self) -> u32 {
        self.encoding().len()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for m in Mnemonic::ALL {
            assert_eq!(Mnemonic::from_name(m.as_str()), Some(m));
        }
        assert_eq!(Mnemonic::from_name("halt"), None);
        assert_eq!(Mnemonic::from_name("LDR"), None);
    }

    #[test]
    fn opcode_values() {
        assert_eq!(u8::from(Opcode::Add), 0x00);
        assert_eq!(u8::from(Opcode::Jpr), 0x18);
        assert_eq!(u8::from(Opcode::Jprne), 0x20);
        assert_eq!(u8::from(Opcode::Mov), 0x23);
        assert_eq!(u8::from(Opcode::Inot), 0x37);
        assert_eq!(Opcode::try_from(0x32u8).ok(), Some(Opcode::Imult));
        assert!(Opcode::try_from(0x0au8).is_err());
    }

    #[test]
    fn arities() {
        assert_eq!(Mnemonic::Add.arity(), 3);
        assert_eq!(Mnemonic::Jprlt.arity(), 3);
        assert_eq!(Mnemonic::Iadd.arity(), 2);
        assert_eq!(Mnemonic::Stb.arity(), 2);
        assert_eq!(Mnemonic::Jpr.arity(), 1);
        assert_eq!(Mnemonic::Ldr.arity(), 2);
    }

    #[test]
    fn only_ldr_is_two_words() {
        for m in Mnemonic::ALL {
            let expected = if m == Mnemonic::Ldr { 8 } else { 4 };
            assert_eq!(m.len(), expected, "{m}");
        }
    }
}
