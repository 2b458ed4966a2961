//! Binary arithmetic.
//!
//! Both operands are loaded into the scratch registers and combined in
//! place, leaving the result in r20:
//!
//! ```text
//! <lhs into r12>
//! <rhs into r13>
//! op r12, r12, r13
//! mov r20, r12
//! ```
//!
//! Shifts take their amount as an immediate: `lsh r12, #n`.

use chonky_ast::{BinaryExpr, BinaryOp, Expr};
use chonky_core::{CompilationError, ScalarType, ValueType};

use super::{ExprCompiler, Loaded};
use crate::Result;
use crate::emit::Fragment;
use crate::ir::{AluOp, Reg, ShiftOp};
use crate::symbols::StoredValue;

impl ExprCompiler<'_> {
    /// Compile `lhs op rhs` for a destination of type `expected`.
    ///
    /// # Errors
    ///
    /// `VariableShift` if a shift amount is not a literal,
    /// `UnsupportedExpression` if an operand is itself compound.
    pub(super) fn arithmetic(
        &self,
        name: &str,
        expected: ValueType,
        binary: &BinaryExpr<'_>,
    ) -> Result<Loaded> {
        if expected.is_list() {
            return Err(self.mismatch(name, self.operand_type(&binary.lhs)?, expected));
        }

        let mut code = Fragment::new();
        code.extend(self.load_into(name, expected.cell(), &binary.lhs, Reg::LHS)?);

        match lower(binary.op) {
            Lowered::Shift(shift) => {
                let amount = binary
                    .rhs
                    .literal_value()
                    .ok_or_else(|| CompilationError::VariableShift {
                        name: name.to_string(),
                        span: self.span,
                    })?;
                code.shift(shift, Reg::LHS, amount);
            }
            Lowered::Alu(op) => {
                code.extend(self.load_into(name, expected.cell(), &binary.rhs, Reg::RHS)?);
                code.alu(op, Reg::LHS, Reg::LHS, Reg::RHS);
            }
        }
        code.mov(Reg::VALUE, Reg::LHS);

        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Computed,
        })
    }

    /// Load an atomic operand into `rd`.
    ///
    /// Literals go straight into `rd` after a range check against `cell`;
    /// anything else is loaded through r20 at its own type.
    pub(crate) fn load_into(
        &self,
        name: &str,
        cell: ScalarType,
        expr: &Expr<'_>,
        rd: Reg,
    ) -> Result<Fragment> {
        let mut code = Fragment::new();
        match *expr {
            Expr::Binary(_) | Expr::List(_) => {
                return Err(CompilationError::UnsupportedExpression {
                    message: format!("nested {} operand in arithmetic for '{name}'", expr.tag()),
                    span: self.span,
                });
            }
            Expr::Int(_) | Expr::Hex(_) | Expr::Char(_) => {
                if let Some(value) = expr.literal_value() {
                    self.check_fits(name, cell, value)?;
                    code.load_literal(rd, value, matches!(expr, Expr::Hex(_)));
                }
            }
            _ => {
                let ty = self.operand_type(expr)?;
                if ty.is_list() {
                    return Err(self.mismatch(name, ty, ValueType::Scalar(cell)));
                }
                code.extend(self.load(name, ty, expr)?.code);
                code.mov(rd, Reg::VALUE);
            }
        }
        Ok(code)
    }
}

enum Lowered {
    Alu(AluOp),
    Shift(ShiftOp),
}

fn lower(op: BinaryOp) -> Lowered {
    match op {
        BinaryOp::Add => Lowered::Alu(AluOp::Add),
        BinaryOp::Sub => Lowered::Alu(AluOp::Sub),
        BinaryOp::Mul => Lowered::Alu(AluOp::Mult),
        BinaryOp::Div => Lowered::Alu(AluOp::Div),
        BinaryOp::Or => Lowered::Alu(AluOp::Or),
        BinaryOp::Xor => Lowered::Alu(AluOp::Xor),
        BinaryOp::And => Lowered::Alu(AluOp::And),
        BinaryOp::LeftShift => Lowered::Shift(ShiftOp::Left),
        BinaryOp::RightShift => Lowered::Shift(ShiftOp::Right),
    }
}
