//! Typed intermediate representation.
//!
//! Handlers build [`Item`]s instead of strings. Text is produced only when a
//! fragment is rendered for the assembler, in exactly the mnemonic and
//! operand order the instruction set expects.

use std::fmt;

use chonky_asm::Mnemonic;
use chonky_core::ScalarType;

/// A machine register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub u8);

impl Reg {
    /// Return address for routine calls and function calls.
    pub const RET: Reg = Reg(0);
    /// Address of the memory routine being called.
    pub const ROUTINE: Reg = Reg(1);
    /// Output port address for `putchar`.
    pub const PORT: Reg = Reg(5);
    /// Memory address operand of the memory routines.
    pub const ADDR: Reg = Reg(11);
    /// Arithmetic scratch, left operand and result.
    pub const LHS: Reg = Reg(12);
    /// Arithmetic scratch, right operand.
    pub const RHS: Reg = Reg(13);
    /// Jump target past an `if` body.
    pub const ELSE: Reg = Reg(16);
    /// Target of the conditional branch.
    pub const BRANCH: Reg = Reg(17);
    /// Value operand of the memory routines.
    pub const VALUE: Reg = Reg(20);
    /// List base address during element addressing.
    pub const BASE: Reg = Reg(21);
    /// Call target.
    pub const CALL: Reg = Reg(23);
    /// First compared operand.
    pub const CMP_LHS: Reg = Reg(26);
    /// Second compared operand.
    pub const CMP_RHS: Reg = Reg(30);
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A value operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Decimal literal, `#n`.
    Imm(i64),
    /// Hexadecimal value or address, `0x...`.
    Hex(u32),
    /// A label, `.name`.
    Label(String),
    /// Address past the next `n - 1` instructions, `$n`.
    Forward(u32),
}

impl Operand {
    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(value) => write!(f, "#{value}"),
            Operand::Hex(value) => write!(f, "{value:#x}"),
            Operand::Label(name) => write!(f, ".{name}"),
            Operand::Forward(distance) => write!(f, "${distance}"),
        }
    }
}

/// Three-register arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mult,
    Div,
    And,
    Or,
    Xor,
}

impl AluOp {
    pub fn mnemonic(self) -> Mnemonic {
        match self {
            AluOp::Add => Mnemonic::Add,
            AluOp::Sub => Mnemonic::Sub,
            AluOp::Mult => Mnemonic::Mult,
            AluOp::Div => Mnemonic::Div,
            AluOp::And => Mnemonic::And,
            AluOp::Or => Mnemonic::Or,
            AluOp::Xor => Mnemonic::Xor,
        }
    }

    /// Immediate-operand form of this operation.
    pub fn immediate(self) -> Mnemonic {
        match self {
            AluOp::Add => Mnemonic::Iadd,
            AluOp::Sub => Mnemonic::Isub,
            AluOp::Mult => Mnemonic::Imult,
            AluOp::Div => Mnemonic::Idiv,
            AluOp::And => Mnemonic::Iand,
            AluOp::Or => Mnemonic::Ior,
            AluOp::Xor => Mnemonic::Ixor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    Left,
    Right,
}

impl ShiftOp {
    pub fn mnemonic(self) -> Mnemonic {
        match self {
            ShiftOp::Left => Mnemonic::Lsh,
            ShiftOp::Right => Mnemonic::Rsh,
        }
    }
}

/// Conditional jump conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchCond {
    Equal,
    NotEqual,
    Greater,
    Less,
}

impl BranchCond {
    pub fn mnemonic(self) -> Mnemonic {
        match self {
            BranchCond::Equal => Mnemonic::Jpre,
            BranchCond::NotEqual => Mnemonic::Jprne,
            BranchCond::Greater => Mnemonic::Jprgt,
            BranchCond::Less => Mnemonic::Jprlt,
        }
    }
}

/// Width of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Half,
    Word,
}

impl Width {
    /// Width for a value of `size` bytes.
    pub fn for_size(size: u32) -> Self {
        match size {
            1 => Width::Byte,
            2 => Width::Half,
            _ => Width::Word,
        }
    }

    /// Width of a scalar type.
    pub fn of(scalar: ScalarType) -> Self {
        Self::for_size(scalar.size())
    }

    fn suffix(self) -> char {
        match self {
            Width::Byte => 'b',
            Width::Half => 'h',
            Width::Word => 'w',
        }
    }

    /// Store instruction of this width.
    pub fn store(self) -> Mnemonic {
        match self {
            Width::Byte => Mnemonic::Stb,
            Width::Half => Mnemonic::Sth,
            Width::Word => Mnemonic::Stw,
        }
    }
}

/// Runtime memory routines, called with the address in r11 and the value in
/// r20, returning through r0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routine {
    /// Write r20 to the address in r11.
    Store(Width),
    /// Read the address in r11 into r20.
    Load(Width),
}

impl Routine {
    /// Label of the routine.
    pub fn label(self) -> String {
        match self {
            Routine::Store(width) => format!("lmem{}", width.suffix()),
            Routine::Load(width) => format!("cmem{}", width.suffix()),
        }
    }
}

/// One machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instr {
    /// `ldr rd, src`
    Ldr { rd: Reg, src: Operand },
    /// `mov rd, rs`
    Mov { rd: Reg, rs: Reg },
    /// `jpr target`
    Jpr { target: Reg },
    /// `jpre|jprne|jprgt|jprlt target, lhs, rhs`
    Branch {
        cond: BranchCond,
        target: Reg,
        lhs: Reg,
        rhs: Reg,
    },
    /// `add|sub|... rd, ra, rb`
    Alu {
        op: AluOp,
        rd: Reg,
        ra: Reg,
        rb: Reg,
    },
    /// `iadd|isub|... rd, imm` with a hexadecimal immediate.
    AluImm { op: AluOp, rd: Reg, imm: u16 },
    /// `lsh|rsh rd, #amount`
    Shift { op: ShiftOp, rd: Reg, amount: i64 },
    /// `stb|sth|stw rs, addr`
    Store { width: Width, rs: Reg, addr: Reg },
}

impl Instr {
    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            Instr::Ldr { .. } => Mnemonic::Ldr,
            Instr::Mov { .. } => Mnemonic::Mov,
            Instr::Jpr { .. } => Mnemonic::Jpr,
            Instr::Branch { cond, .. } => cond.mnemonic(),
            Instr::Alu { op, .. } => op.mnemonic(),
            Instr::AluImm { op, .. } => op.immediate(),
            Instr::Shift { op, .. } => op.mnemonic(),
            Instr::Store { width, .. } => width.store(),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Instr::Ldr { rd, src } => write!(f, "{m} {rd}, {src}"),
            Instr::Mov { rd, rs } => write!(f, "{m} {rd}, {rs}"),
            Instr::Jpr { target } => write!(f, "{m} {target}"),
            Instr::Branch {
                target, lhs, rhs, ..
            } => write!(f, "{m} {target}, {lhs}, {rhs}"),
            Instr::Alu { rd, ra, rb, .. } => write!(f, "{m} {rd}, {ra}, {rb}"),
            Instr::AluImm { rd, imm, .. } => write!(f, "{m} {rd}, {imm:x}"),
            Instr::Shift { rd, amount, .. } => write!(f, "{m} {rd}, #{amount}"),
            Instr::Store { rs, addr, .. } => write!(f, "{m} {rs}, {addr}"),
        }
    }
}

/// One line of generated assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Instr(Instr),
    /// `.name`
    Label(String),
    /// `; text`
    Comment(String),
    /// Verbatim text from an embedded assembly block.
    Raw(String),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Instr(instr) => write!(f, "{instr}"),
            Item::Label(name) => write!(f, ".{name}"),
            Item::Comment(text) => write!(f, "; {text}"),
            Item::Raw(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_text() {
        assert_eq!(Operand::Imm(-4).to_string(), "#-4");
        assert_eq!(Operand::Hex(0x1000_0000).to_string(), "0x10000000");
        assert_eq!(Operand::label("if_end_0").to_string(), ".if_end_0");
        assert_eq!(Operand::Forward(2).to_string(), "$2");
    }

    #[test]
    fn instruction_text() {
        let ldr = Instr::Ldr {
            rd: Reg::ADDR,
            src: Operand::Hex(0x1000_0004),
        };
        assert_eq!(ldr.to_string(), "ldr r11, 0x10000004");

        let branch = Instr::Branch {
            cond: BranchCond::NotEqual,
            target: Reg::BRANCH,
            lhs: Reg::CMP_LHS,
            rhs: Reg::CMP_RHS,
        };
        assert_eq!(branch.to_string(), "jprne r17, r26, r30");

        let mult = Instr::AluImm {
            op: AluOp::Mult,
            rd: Reg::VALUE,
            imm: 16,
        };
        assert_eq!(mult.to_string(), "imult r20, 10");

        let store = Instr::Store {
            width: Width::Byte,
            rs: Reg::VALUE,
            addr: Reg::PORT,
        };
        assert_eq!(store.to_string(), "stb r20, r5");
    }

    #[test]
    fn routine_labels_follow_width() {
        assert_eq!(Routine::Store(Width::of(ScalarType::Char)).label(), "lmemb");
        assert_eq!(Routine::Load(Width::of(ScalarType::Int)).label(), "cmemw");
        assert_eq!(Routine::Load(Width::for_size(2)).label(), "cmemh");
    }
}
