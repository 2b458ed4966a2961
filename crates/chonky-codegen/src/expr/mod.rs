//! Expression compiler.
//!
//! The [`ExprCompiler`] turns a right-hand side into code that leaves its
//! value in r20, ready for a store routine. It handles:
//! - Literals, with an overflow check against the destination type
//! - Variable reads, including list elements and pointer dereferences
//! - Address-of, producing a pointer value
//! - Arithmetic on two atomic operands (see `arith`)
//!
//! Expressions never allocate and never declare; they only read the scope.

mod arith;

use chonky_ast::Expr;
use chonky_core::{CompilationError, ScalarType, Span, ValueType};

use crate::Result;
use crate::emit::Fragment;
use crate::ir::{AluOp, Operand, Reg, Routine, Width};
use crate::scope::Scope;
use crate::symbols::{StoredValue, Variable};

/// A compiled right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// Code leaving the value in r20.
    pub code: Fragment,
    /// Type of the loaded value.
    pub ty: ValueType,
    /// What the destination will hold afterwards.
    pub value: StoredValue,
}

/// Compiles expressions against a scope.
pub struct ExprCompiler<'s> {
    scope: &'s Scope,
    span: Span,
}

impl<'s> ExprCompiler<'s> {
    pub fn new(scope: &'s Scope, span: Span) -> Self {
        Self { scope, span }
    }

    /// Load `expr` into r20 for a destination called `name` of type `expected`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the expression's type differs from `expected`,
    /// `Overflow` if a literal does not fit, plus any lookup failure.
    pub fn load(&self, name: &str, expected: ValueType, expr: &Expr<'_>) -> Result<Loaded> {
        match *expr {
            Expr::Int(value) => self.literal(name, expected, ScalarType::Int, value),
            Expr::Hex(value) => self.literal(name, expected, ScalarType::Hex, i64::from(value)),
            Expr::Char(code) => self.literal(name, expected, ScalarType::Char, i64::from(code)),
            Expr::Str(text) => match text.as_bytes() {
                [code] => self.literal(name, expected, ScalarType::Char, i64::from(*code)),
                _ => Err(self.mismatch(name, self.operand_type(expr)?, expected)),
            },
            Expr::Ident(source) => self.load_variable(name, expected, source),
            Expr::Index(index) => self.load_element(name, expected, index.list, &index.index),
            Expr::AddressOf(target) => self.address_of(name, expected, target),
            Expr::Deref(pointer) => self.deref(name, expected, pointer),
            Expr::Binary(binary) => self.arithmetic(name, expected, binary),
            Expr::List(_) => Err(self.mismatch(name, self.operand_type(expr)?, expected)),
        }
    }

    /// Load `expr` for a raw write of width `ty`.
    ///
    /// Any integer-like literal is accepted as long as it fits; other
    /// expressions keep their own type and are truncated by the store.
    pub fn load_raw(&self, ty: ScalarType, expr: &Expr<'_>) -> Result<Loaded> {
        let name = format!("[{}]", ty.name());
        match expr.literal_value() {
            Some(value) => {
                self.check_fits(&name, ty, value)?;
                let mut code = Fragment::new();
                code.load_literal(Reg::VALUE, value, matches!(expr, Expr::Hex(_)));
                Ok(Loaded {
                    code,
                    ty: ValueType::Scalar(ty),
                    value: StoredValue::Literal(value),
                })
            }
            None => {
                let own = self.operand_type(expr)?;
                self.load(&name, own, expr)
            }
        }
    }

    /// The type `expr` evaluates to.
    pub fn operand_type(&self, expr: &Expr<'_>) -> Result<ValueType> {
        let ty = match *expr {
            Expr::Int(_) => ValueType::Scalar(ScalarType::Int),
            Expr::Hex(_) => ValueType::Scalar(ScalarType::Hex),
            Expr::Char(_) => ValueType::Scalar(ScalarType::Char),
            Expr::Str(text) if text.len() == 1 => ValueType::Scalar(ScalarType::Char),
            Expr::Str(text) => ValueType::List {
                element: ScalarType::Char,
                len: list_len(text.len()),
            },
            Expr::Ident(name) => self.variable(name)?.ty,
            Expr::List(items) => {
                let element = match items.first() {
                    Some(first) => self.operand_type(first)?.cell(),
                    None => ScalarType::Int,
                };
                ValueType::List {
                    element,
                    len: list_len(items.len()),
                }
            }
            Expr::Index(index) => ValueType::Scalar(self.variable(index.list)?.ty.cell()),
            Expr::AddressOf(name) => ValueType::Pointer(self.variable(name)?.ty.cell()),
            Expr::Deref(name) => match self.variable(name)?.ty {
                ValueType::Pointer(target) => ValueType::Scalar(target),
                other => return Err(self.mismatch(name, other, ValueType::Pointer(other.cell()))),
            },
            Expr::Binary(binary) => self.operand_type(&binary.lhs)?,
        };
        Ok(ty)
    }

    pub(crate) fn variable(&self, name: &str) -> Result<&'s Variable> {
        self.scope.lookup_variable(name, self.span)
    }

    // ========================================================================
    // Loads
    // ========================================================================

    fn literal(
        &self,
        name: &str,
        expected: ValueType,
        found: ScalarType,
        value: i64,
    ) -> Result<Loaded> {
        if expected != ValueType::Scalar(found) {
            return Err(self.mismatch(name, ValueType::Scalar(found), expected));
        }
        self.check_fits(name, found, value)?;

        let mut code = Fragment::new();
        code.load_literal(Reg::VALUE, value, found == ScalarType::Hex);
        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Literal(value),
        })
    }

    fn load_variable(&self, name: &str, expected: ValueType, source: &str) -> Result<Loaded> {
        let variable = self.variable(source)?;
        if variable.ty != expected || variable.ty.is_list() {
            return Err(self.mismatch(name, variable.ty, expected));
        }

        let mut code = Fragment::new();
        code.load_from(variable.address, Width::for_size(variable.ty.size()));
        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Copied(source.to_string()),
        })
    }

    fn load_element(
        &self,
        name: &str,
        expected: ValueType,
        list: &str,
        index: &Expr<'_>,
    ) -> Result<Loaded> {
        let variable = self.variable(list)?;
        let ValueType::List { element, len } = variable.ty else {
            return Err(self.mismatch(
                list,
                variable.ty,
                ValueType::List {
                    element: variable.ty.cell(),
                    len: 0,
                },
            ));
        };
        if expected != ValueType::Scalar(element) {
            return Err(self.mismatch(name, ValueType::Scalar(element), expected));
        }

        let mut code = Fragment::new();
        match index.literal_value() {
            Some(i) => {
                let address = self.element_address(list, variable.address, element, len, i)?;
                code.load_from(address, Width::of(element));
            }
            None => {
                code.extend(self.element_pointer(list, variable.address, element, index)?);
                code.mov(Reg::ADDR, Reg::VALUE);
                code.call_routine(Routine::Load(Width::of(element)));
            }
        }
        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Computed,
        })
    }

    fn address_of(&self, name: &str, expected: ValueType, target: &str) -> Result<Loaded> {
        let variable = self.variable(target)?;
        let found = ValueType::Pointer(variable.ty.cell());
        if expected != found {
            return Err(self.mismatch(name, found, expected));
        }

        let mut code = Fragment::new();
        code.ldr(Reg::VALUE, Operand::Hex(variable.address));
        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Address(variable.address),
        })
    }

    fn deref(&self, name: &str, expected: ValueType, pointer: &str) -> Result<Loaded> {
        let variable = self.variable(pointer)?;
        let ValueType::Pointer(target) = variable.ty else {
            return Err(self.mismatch(pointer, variable.ty, ValueType::Pointer(variable.ty.cell())));
        };
        if expected != ValueType::Scalar(target) {
            return Err(self.mismatch(name, ValueType::Scalar(target), expected));
        }

        // Load the pointer cell, then read through it.
        let mut code = Fragment::new();
        code.load_from(variable.address, Width::Word);
        code.mov(Reg::ADDR, Reg::VALUE);
        code.call_routine(Routine::Load(Width::of(target)));
        Ok(Loaded {
            code,
            ty: expected,
            value: StoredValue::Computed,
        })
    }

    // ========================================================================
    // Element addressing
    // ========================================================================

    /// Static address of element `index` of a list, bounds-checked.
    pub(crate) fn element_address(
        &self,
        list: &str,
        base: u32,
        element: ScalarType,
        len: u32,
        index: i64,
    ) -> Result<u32> {
        let offset = u32::try_from(index)
            .ok()
            .filter(|&i| i < len)
            .ok_or_else(|| CompilationError::OutOfBounds {
                name: list.to_string(),
                index,
                len,
                span: self.span,
            })?;
        Ok(base + offset * element.size())
    }

    /// Code leaving `base + index * size` in r20, for a variable index.
    pub(crate) fn element_pointer(
        &self,
        list: &str,
        base: u32,
        element: ScalarType,
        index: &Expr<'_>,
    ) -> Result<Fragment> {
        let Expr::Ident(index_name) = *index else {
            return Err(CompilationError::UnsupportedExpression {
                message: format!("index of '{list}' must be a literal or a variable"),
                span: self.span,
            });
        };
        let index_var = self.variable(index_name)?;
        if index_var.ty.is_list() {
            return Err(self.mismatch(index_name, index_var.ty, ValueType::Scalar(ScalarType::Int)));
        }

        let mut code = Fragment::new();
        code.load_from(index_var.address, Width::for_size(index_var.ty.size()));
        // Element sizes are 1 or 4, always within the 16-bit immediate.
        code.alu_imm(AluOp::Mult, Reg::VALUE, element.size() as u16);
        code.ldr(Reg::BASE, Operand::Hex(base));
        code.alu(AluOp::Add, Reg::VALUE, Reg::BASE, Reg::VALUE);
        Ok(code)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn check_fits(&self, name: &str, ty: ScalarType, value: i64) -> Result<()> {
        if ty.fits(value) {
            Ok(())
        } else {
            Err(CompilationError::Overflow {
                name: name.to_string(),
                value,
                ty: ty.name().to_string(),
                span: self.span,
            })
        }
    }

    fn mismatch(&self, name: &str, found: ValueType, expected: ValueType) -> CompilationError {
        CompilationError::TypeMismatch {
            name: name.to_string(),
            found: found.to_string(),
            expected: expected.to_string(),
            span: self.span,
        }
    }
}

/// Length of a list literal as stored in its type.
fn list_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::ir::{Instr, Item};
    use chonky_ast::IndexExpr;

    fn scope_with(vars: &[(&str, u32, ValueType)]) -> Scope {
        let mut scope = Scope::new(CompilerConfig::default());
        for &(name, address, ty) in vars {
            let variable = Variable {
                address,
                ty,
                value: StoredValue::Zeroed,
            };
            scope
                .declare_variable(name, variable, false, Span::new(1))
                .unwrap();
        }
        scope
    }

    const INT: ValueType = ValueType::Scalar(ScalarType::Int);
    const CHAR: ValueType = ValueType::Scalar(ScalarType::Char);

    #[test]
    fn int_literal_loads_immediate() {
        let scope = scope_with(&[]);
        let loaded = ExprCompiler::new(&scope, Span::new(1))
            .load("x", INT, &Expr::Int(5))
            .unwrap();
        assert_eq!(loaded.code.render(false), "ldr r20, #5");
        assert_eq!(loaded.value, StoredValue::Literal(5));
    }

    #[test]
    fn literal_type_must_match() {
        let scope = scope_with(&[]);
        let err = ExprCompiler::new(&scope, Span::new(3))
            .load("c", CHAR, &Expr::Int(1))
            .unwrap_err();
        assert_eq!(
            err,
            CompilationError::TypeMismatch {
                name: "c".into(),
                found: "int".into(),
                expected: "char".into(),
                span: Span::new(3),
            }
        );
    }

    #[test]
    fn literal_overflow() {
        let scope = scope_with(&[]);
        let compiler = ExprCompiler::new(&scope, Span::new(1));
        assert!(matches!(
            compiler.load("x", INT, &Expr::Int(1 << 40)),
            Err(CompilationError::Overflow { value, .. }) if value == 1 << 40
        ));
        assert!(compiler.load("x", INT, &Expr::Int(-5)).is_ok());
    }

    #[test]
    fn single_char_string_is_char() {
        let scope = scope_with(&[]);
        let loaded = ExprCompiler::new(&scope, Span::new(1))
            .load("c", CHAR, &Expr::Str("A"))
            .unwrap();
        assert_eq!(loaded.code.render(false), "ldr r20, #65");
    }

    #[test]
    fn variable_read_uses_width_of_source() {
        let scope = scope_with(&[("c", 0x100, CHAR)]);
        let loaded = ExprCompiler::new(&scope, Span::new(1))
            .load("d", CHAR, &Expr::Ident("c"))
            .unwrap();
        assert_eq!(
            loaded.code.render(false),
            "ldr r11, 0x100\nldr r1, .cmemb\nldr r0, $2\njpr r1"
        );
    }

    #[test]
    fn literal_index_is_bounds_checked() {
        let list = ValueType::List {
            element: ScalarType::Int,
            len: 3,
        };
        let scope = scope_with(&[("xs", 0x200, list)]);
        let compiler = ExprCompiler::new(&scope, Span::new(1));

        let ok = IndexExpr {
            list: "xs",
            index: Expr::Int(2),
        };
        let loaded = compiler.load("y", INT, &Expr::Index(&ok)).unwrap();
        assert_eq!(
            loaded.code.items()[0],
            Item::Instr(Instr::Ldr {
                rd: Reg::ADDR,
                src: Operand::Hex(0x208),
            })
        );

        let bad = IndexExpr {
            list: "xs",
            index: Expr::Int(3),
        };
        assert!(matches!(
            compiler.load("y", INT, &Expr::Index(&bad)),
            Err(CompilationError::OutOfBounds { index: 3, len: 3, .. })
        ));
    }

    #[test]
    fn variable_index_computes_address() {
        let list = ValueType::List {
            element: ScalarType::Int,
            len: 3,
        };
        let scope = scope_with(&[("xs", 0x200, list), ("i", 0x20c, INT)]);
        let index = IndexExpr {
            list: "xs",
            index: Expr::Ident("i"),
        };
        let loaded = ExprCompiler::new(&scope, Span::new(1))
            .load("y", INT, &Expr::Index(&index))
            .unwrap();
        assert_eq!(
            loaded.code.render(false),
            "ldr r11, 0x20c\nldr r1, .cmemw\nldr r0, $2\njpr r1\n\
             imult r20, 4\nldr r21, 0x200\nadd r20, r21, r20\n\
             mov r11, r20\nldr r1, .cmemw\nldr r0, $2\njpr r1"
        );
    }

    #[test]
    fn pointer_and_deref() {
        let pointer = ValueType::Pointer(ScalarType::Int);
        let scope = scope_with(&[("x", 0x100, INT), ("p", 0x104, pointer)]);
        let compiler = ExprCompiler::new(&scope, Span::new(1));

        let ptr = compiler.load("p", pointer, &Expr::AddressOf("x")).unwrap();
        assert_eq!(ptr.code.render(false), "ldr r20, 0x100");
        assert_eq!(ptr.value, StoredValue::Address(0x100));

        let value = compiler.load("y", INT, &Expr::Deref("p")).unwrap();
        assert_eq!(
            value.code.render(false),
            "ldr r11, 0x104\nldr r1, .cmemw\nldr r0, $2\njpr r1\n\
             mov r11, r20\nldr r1, .cmemw\nldr r0, $2\njpr r1"
        );
    }

    #[test]
    fn raw_load_accepts_any_literal_that_fits() {
        let scope = scope_with(&[]);
        let compiler = ExprCompiler::new(&scope, Span::new(1));
        assert!(compiler.load_raw(ScalarType::Char, &Expr::Int(65)).is_ok());
        assert!(matches!(
            compiler.load_raw(ScalarType::Char, &Expr::Int(300)),
            Err(CompilationError::Overflow { .. })
        ));
    }
}
