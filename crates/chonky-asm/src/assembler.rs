//! Two-pass assembler.
//!
//! Pass 1 walks the program once, recording the byte offset of every label
//! and the offset and length of every instruction. Pass 2 encodes each
//! instruction, resolving operands against the pass-1 tables.
//!
//! # Forward references
//!
//! An operand `$N` means "the address just after the next `N - 1`
//! instructions", computed as
//!
//! ```text
//! offset + 8 + sum(length of the next N - 1 instructions)
//! ```
//!
//! The calling convention uses it to load a return address pointing past
//! the upcoming call sequence (`ldr r0, $2` then `jpr r1`). Lengths come
//! from the pass-1 length table, so a reference never has to encode the
//! instructions it skips over. `$0` behaves like `$1`.

use chonky_core::AssemblyError;
use tracing::trace;

use crate::Result;
use crate::isa::{Encoding, Mnemonic, Opcode};
use crate::labels::LabelTable;
use crate::object::ObjectCode;
use crate::source::{LineKind, SourceLine, read_lines};

/// Offsets and lengths computed by the first pass.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    labels: LabelTable,
    /// Byte offset of each instruction.
    offsets: Vec<u32>,
    /// Encoded length of each instruction.
    lengths: Vec<u32>,
    /// Total program size.
    size: u32,
}

impl Layout {
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Byte offset of the `index`th instruction.
    pub fn offset(&self, index: usize) -> Option<u32> {
        self.offsets.get(index).copied()
    }

    /// Encoded length of the `index`th instruction.
    pub fn length(&self, index: usize) -> Option<u32> {
        self.lengths.get(index).copied()
    }

    /// Number of instructions.
    pub fn instruction_count(&self) -> usize {
        self.offsets.len()
    }

    /// Total size of the program in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resolve `$distance` for the instruction at `index`.
    pub fn forward_target(&self, index: usize, distance: usize, line: usize) -> Result<u32> {
        let skipped = distance.max(1) - 1;
        let past_end = || AssemblyError::ForwardReferencePastEnd { distance, line };
        let following = self
            .lengths
            .get(index + 1..index + 1 + skipped)
            .ok_or_else(past_end)?;
        let offset = self.offset(index).ok_or_else(past_end)?;
        Ok(offset + 8 + following.iter().sum::<u32>())
    }
}

/// The assembler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler;

impl Assembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble a program.
    ///
    /// # Errors
    ///
    /// Any [`AssemblyError`]; the first one aborts assembly.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn assemble(&self, source: &str) -> Result<ObjectCode> {
        let lines = read_lines(source)?;
        let layout = Self::layout_lines(&lines)?;
        let mut object = ObjectCode::with_capacity(layout.size as usize);

        let instructions = lines.iter().filter_map(|line| match &line.kind {
            LineKind::Instruction { mnemonic, operands } => {
                Some((line.number, *mnemonic, operands))
            }
            LineKind::Label(_) => None,
        });
        for (index, (number, mnemonic, operands)) in instructions.enumerate() {
            let ctx = OperandContext {
                layout: &layout,
                index,
                line: number,
            };
            encode(&ctx, mnemonic, operands, &mut object)?;
        }

        object.set_labels(layout.labels);
        Ok(object)
    }

    /// Run only the first pass.
    ///
    /// # Errors
    ///
    /// `UnboundInstruction` and `DuplicateLabel`.
    pub fn layout(&self, source: &str) -> Result<Layout> {
        Self::layout_lines(&read_lines(source)?)
    }

    fn layout_lines(lines: &[SourceLine<'_>]) -> Result<Layout> {
        let mut layout = Layout::default();
        let mut offset = 0u32;

        for line in lines {
            match &line.kind {
                LineKind::Label(name) => {
                    trace!(label = *name, offset, "define label");
                    layout.labels.define(name, offset, line.number)?;
                }
                LineKind::Instruction { mnemonic, .. } => {
                    let len = mnemonic.len();
                    layout.offsets.push(offset);
                    layout.lengths.push(len);
                    offset += len;
                }
            }
        }

        layout.size = offset;
        trace!(
            size = layout.size,
            labels = layout.labels.len(),
            "layout complete"
        );
        Ok(layout)
    }
}

// ============================================================================
// Pass 2
// ============================================================================

/// Where an operand is being resolved.
struct OperandContext<'a> {
    layout: &'a Layout,
    /// Index of the instruction being encoded.
    index: usize,
    /// Its assembly line.
    line: usize,
}

impl OperandContext<'_> {
    /// A register field: `rN` or a bare decimal.
    fn register(&self, operand: &str) -> Result<u8> {
        let digits = operand.strip_prefix('r').unwrap_or(operand);
        let value: u32 = digits.parse().map_err(|_| AssemblyError::InvalidOperand {
            operand: operand.to_string(),
            reason: "expected a register",
            line: self.line,
        })?;
        u8::try_from(value).map_err(|_| AssemblyError::OperandRange {
            operand: operand.to_string(),
            line: self.line,
        })
    }

    /// A value field: `$N`, `#N`, `.label`, hexadecimal, or a bare label.
    fn value(&self, operand: &str) -> Result<i64> {
        if let Some(distance) = operand.strip_prefix('$') {
            let distance: usize = distance
                .parse()
                .map_err(|_| self.invalid(operand, "bad forward reference"))?;
            return self
                .layout
                .forward_target(self.index, distance, self.line)
                .map(i64::from);
        }
        if let Some(decimal) = operand.strip_prefix('#') {
            return decimal
                .parse()
                .map_err(|_| self.invalid(operand, "bad decimal literal"));
        }
        if let Some(label) = operand.strip_prefix('.') {
            return self.layout.labels.resolve(label, self.line).map(i64::from);
        }
        if let Some(value) = parse_hex(operand) {
            return Ok(value);
        }
        self.layout
            .labels
            .resolve(operand, self.line)
            .map(i64::from)
    }

    fn invalid(&self, operand: &str, reason: &'static str) -> AssemblyError {
        AssemblyError::InvalidOperand {
            operand: operand.to_string(),
            reason,
            line: self.line,
        }
    }
}

/// Parse `[-][0x]digits` as hexadecimal.
fn parse_hex(text: &str) -> Option<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
    if digits.is_empty() {
        return None;
    }
    let value = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -value } else { value })
}

/// Low 16 bits of a value.
#[inline]
fn low16(value: i64) -> u16 {
    (value & 0xffff) as u16
}

/// Bits 16..32 of a value.
#[inline]
fn high16(value: i64) -> u16 {
    ((value >> 16) & 0xffff) as u16
}

fn encode(
    ctx: &OperandContext<'_>,
    mnemonic: Mnemonic,
    operands: &[&str],
    out: &mut ObjectCode,
) -> Result<()> {
    let expected = mnemonic.arity();
    if operands.len() != expected {
        return Err(AssemblyError::ArityMismatch {
            mnemonic: mnemonic.as_str().to_string(),
            expected,
            found: operands.len(),
            line: ctx.line,
        });
    }

    let op = mnemonic.opcode();
    let line = ctx.line;
    match mnemonic.encoding() {
        Encoding::ThreeReg => {
            out.write_op(op, line);
            for operand in operands {
                out.write_byte(ctx.register(operand)?, line);
            }
        }
        Encoding::RegImm16 => {
            let ra = ctx.register(operands[0])?;
            let value = ctx.value(operands[1])?;
            out.write_op(op, line);
            out.write_byte(ra, line);
            out.write_u16(low16(value), line);
        }
        Encoding::RegMem => {
            let ra = ctx.register(operands[0])?;
            let rb = ctx.register(operands[1])?;
            out.write_op(op, line);
            out.write_byte(ra, line);
            out.write_byte(0, line);
            out.write_byte(rb, line);
        }
        Encoding::Jump => {
            let target = operands[0];
            if !target.starts_with('r') {
                return Err(ctx.invalid(target, "jump target must be a register"));
            }
            let ra = ctx.register(target)?;
            out.write_op(op, line);
            out.write_byte(ra, line);
            out.write_u16(0, line);
        }
        Encoding::Move => {
            let ra = ctx.register(operands[0])?;
            let rb = ctx.register(operands[1])?;
            out.write_op(op, line);
            out.write_byte(ra, line);
            out.write_byte(rb, line);
            out.write_byte(0, line);
        }
        Encoding::LoadWord => {
            let ra = ctx.register(operands[0])?;
            let value = ctx.value(operands[1])?;
            out.write_op(Opcode::Ldru, line);
            out.write_byte(ra, line);
            out.write_u16(high16(value), line);
            out.write_op(Opcode::Ldrl, line);
            out.write_byte(ra, line);
            out.write_u16(low16(value), line);
        }
    }

    trace!(line, %mnemonic, offset = ?ctx.layout.offset(ctx.index), "encoded");
    Ok(())
}
