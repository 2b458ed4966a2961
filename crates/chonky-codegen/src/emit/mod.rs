//! Fragment emitter.
//!
//! A [`Fragment`] is the ordered output of one handler. Handlers append to
//! fragments through the helpers here, which encode the register
//! conventions of the runtime memory routines:
//!
//! ```text
//! ldr r11, <address>     ; operand address
//! ldr r1, .<routine>     ; lmemb/lmemh/lmemw store r20, cmemb/cmemh/cmemw load r20
//! ldr r0, $2             ; return past the jpr
//! jpr r1
//! ```

mod labels;

pub use labels::{IfLabels, WhileLabels};

use crate::ir::{AluOp, BranchCond, Instr, Item, Operand, Reg, Routine, ShiftOp, Width};

/// An ordered run of generated assembly items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    items: Vec<Item>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The instructions, skipping labels, comments and raw lines.
    pub fn instructions(&self) -> impl Iterator<Item = &Instr> {
        self.items.iter().filter_map(|item| match item {
            Item::Instr(instr) => Some(instr),
            _ => None,
        })
    }

    /// Names of the labels defined in this fragment, in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Label(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn extend(&mut self, other: Fragment) {
        self.items.extend(other.items);
    }

    /// Take every item, leaving the fragment empty.
    pub fn take(&mut self) -> Fragment {
        std::mem::take(self)
    }

    pub fn instr(&mut self, instr: Instr) {
        self.items.push(Item::Instr(instr));
    }

    pub fn label(&mut self, name: impl Into<String>) {
        self.items.push(Item::Label(name.into()));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.items.push(Item::Comment(text.into()));
    }

    pub fn raw(&mut self, text: impl Into<String>) {
        self.items.push(Item::Raw(text.into()));
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    pub fn ldr(&mut self, rd: Reg, src: Operand) {
        self.instr(Instr::Ldr { rd, src });
    }

    pub fn mov(&mut self, rd: Reg, rs: Reg) {
        self.instr(Instr::Mov { rd, rs });
    }

    pub fn jpr(&mut self, target: Reg) {
        self.instr(Instr::Jpr { target });
    }

    pub fn branch(&mut self, cond: BranchCond, target: Reg, lhs: Reg, rhs: Reg) {
        self.instr(Instr::Branch {
            cond,
            target,
            lhs,
            rhs,
        });
    }

    pub fn alu(&mut self, op: AluOp, rd: Reg, ra: Reg, rb: Reg) {
        self.instr(Instr::Alu { op, rd, ra, rb });
    }

    pub fn alu_imm(&mut self, op: AluOp, rd: Reg, imm: u16) {
        self.instr(Instr::AluImm { op, rd, imm });
    }

    pub fn shift(&mut self, op: ShiftOp, rd: Reg, amount: i64) {
        self.instr(Instr::Shift { op, rd, amount });
    }

    /// Load a literal into `rd`. Hex literals keep their notation.
    pub fn load_literal(&mut self, rd: Reg, value: i64, hex: bool) {
        let src = match u32::try_from(value) {
            Ok(value) if hex => Operand::Hex(value),
            _ => Operand::Imm(value),
        };
        self.ldr(rd, src);
    }

    // ========================================================================
    // Memory routine sequences
    // ========================================================================

    /// Call a memory routine with whatever is already in r11 and r20.
    pub fn call_routine(&mut self, routine: Routine) {
        self.ldr(Reg::ROUTINE, Operand::label(routine.label()));
        self.ldr(Reg::RET, Operand::Forward(2));
        self.jpr(Reg::ROUTINE);
    }

    /// Store r20 to a fixed address.
    pub fn store_to(&mut self, address: u32, width: Width) {
        self.ldr(Reg::ADDR, Operand::Hex(address));
        self.call_routine(Routine::Store(width));
    }

    /// Load a fixed address into r20.
    pub fn load_from(&mut self, address: u32, width: Width) {
        self.ldr(Reg::ADDR, Operand::Hex(address));
        self.call_routine(Routine::Load(width));
    }

    /// Store zero to a fixed address.
    pub fn store_zero(&mut self, address: u32, width: Width) {
        self.ldr(Reg::VALUE, Operand::Imm(0));
        self.store_to(address, width);
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render as assembly text, one item per line.
    pub fn render(&self, comments: bool) -> String {
        let mut text = String::new();
        for item in &self.items {
            if !comments && matches!(item, Item::Comment(_)) {
                continue;
            }
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&item.to_string());
        }
        text
    }
}

impl FromIterator<Item> for Fragment {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_sequence() {
        let mut frag = Fragment::new();
        frag.load_literal(Reg::VALUE, 5, false);
        frag.store_to(0x1000_0000, Width::Word);
        assert_eq!(
            frag.render(true),
            "ldr r20, #5\nldr r11, 0x10000000\nldr r1, .lmemw\nldr r0, $2\njpr r1"
        );
    }

    #[test]
    fn load_sequence_uses_cmem() {
        let mut frag = Fragment::new();
        frag.load_from(0x1000_0004, Width::Byte);
        let text = frag.render(false);
        assert!(text.contains("ldr r1, .cmemb"));
        assert_eq!(frag.instructions().count(), 4);
    }

    #[test]
    fn hex_literals_keep_notation() {
        let mut frag = Fragment::new();
        frag.load_literal(Reg::VALUE, 0xff, true);
        frag.load_literal(Reg::VALUE, -1, true);
        assert_eq!(frag.render(true), "ldr r20, 0xff\nldr r20, #-1");
    }

    #[test]
    fn comments_can_be_dropped() {
        let mut frag = Fragment::new();
        frag.comment("x = 1");
        frag.label("here");
        frag.jpr(Reg::RET);
        assert_eq!(frag.render(false), ".here\njpr r0");
        assert_eq!(frag.render(true), "; x = 1\n.here\njpr r0");
        assert_eq!(frag.labels().collect::<Vec<_>>(), vec!["here"]);
    }
}
