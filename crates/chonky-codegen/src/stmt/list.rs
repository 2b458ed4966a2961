//! List declarations and element writes.
//!
//! A list is a run of element variables at consecutive addresses, one per
//! element, named `name[i]`. The list variable itself takes no storage and
//! records the base address, element type and length.

use chonky_ast::{Expr, IndexAssign, ListDecl};
use chonky_core::{CompilationError, ScalarType, ValueType};
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::ir::{Reg, Routine, Width};
use crate::symbols::{StoredValue, Variable};

/// Length of a list declared with neither items nor a length.
const DEFAULT_LEN: u32 = 10;

/// Name of the element variable at `index`.
pub(crate) fn element_name(list: &str, index: u32) -> String {
    format!("{list}[{index}]")
}

impl StmtCompiler<'_> {
    pub fn compile_list_decl(&mut self, decl: &ListDecl<'_>) -> Result<Fragment> {
        self.declare_list(decl.name, decl.element, decl.len, decl.value)
    }

    /// Declare a list.
    ///
    /// Elements come from a list literal, a string, or another list. The
    /// element type is inferred from the first element when not given, with
    /// a warning. Every element must have the element type; this is checked
    /// before anything is allocated or emitted.
    pub(super) fn declare_list(
        &mut self,
        name: &str,
        element: Option<ScalarType>,
        len: Option<u32>,
        value: Option<Expr<'_>>,
    ) -> Result<Fragment> {
        self.scope.ensure_undeclared(name, self.span)?;

        if let Some(Expr::Ident(source)) = value {
            return self.declare_list_copy(name, element, len, source);
        }

        let items = match value {
            None => Vec::new(),
            Some(value) => match literal_elements(&value) {
                Some(items) => items,
                None => {
                    return Err(CompilationError::UnsupportedExpression {
                        message: format!("cannot initialise list '{name}' from {}", value.tag()),
                        span: self.span,
                    });
                }
            },
        };

        let element = match (element, items.first()) {
            (Some(element), _) => element,
            (None, Some(first)) => {
                let inferred = self.expr().operand_type(first)?.cell();
                self.scope.warn(
                    &format!("element type of '{name}' inferred as {inferred}"),
                    self.span,
                );
                inferred
            }
            (None, None) => ScalarType::Int,
        };

        let expr = self.expr();
        for (i, item) in items.iter().enumerate() {
            let found = expr.operand_type(item)?;
            if found != ValueType::Scalar(element) {
                return Err(CompilationError::TypeMismatch {
                    name: format!("{name}[{i}]"),
                    found: found.to_string(),
                    expected: element.to_string(),
                    span: self.span,
                });
            }
        }

        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let len = match len {
            Some(len) if count > len => {
                return Err(CompilationError::OutOfBounds {
                    name: name.to_string(),
                    index: i64::from(count) - 1,
                    len,
                    span: self.span,
                });
            }
            Some(len) => len,
            None if count > 0 => count,
            None => DEFAULT_LEN,
        };

        // Load every element before allocating so a bad element leaves the
        // scope untouched.
        let mut loads = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            loads.push(expr.load(&format!("{name}[{i}]"), ValueType::Scalar(element), item)?);
        }

        let ty = ValueType::List { element, len };
        let base = self.scope.next_address();
        debug!(name, %ty, base, "declaring list");

        let mut code = Fragment::new();
        code.comment(format!("{ty} {name} @ {base:#x}"));
        let mut loads = loads.into_iter();
        for i in 0..len {
            let address = self.scope.allocate(element.size(), self.span)?;
            let value = match loads.next() {
                Some(loaded) => {
                    code.extend(loaded.code);
                    code.store_to(address, Width::of(element));
                    loaded.value
                }
                None => {
                    code.store_zero(address, Width::of(element));
                    StoredValue::Zeroed
                }
            };
            self.declare_element(name, i, address, element, value)?;
        }

        let list = Variable {
            address: base,
            ty,
            value: StoredValue::Elements(count.min(len)),
        };
        self.scope.declare_variable(name, list, false, self.span)?;
        Ok(code)
    }

    /// Declare a list initialised from another list.
    fn declare_list_copy(
        &mut self,
        name: &str,
        element: Option<ScalarType>,
        len: Option<u32>,
        source: &str,
    ) -> Result<Fragment> {
        let variable = self.scope.lookup_variable(source, self.span)?;
        let ValueType::List {
            element: source_element,
            len: source_len,
        } = variable.ty
        else {
            return Err(CompilationError::TypeMismatch {
                name: name.to_string(),
                found: variable.ty.to_string(),
                expected: "list".to_string(),
                span: self.span,
            });
        };
        let element = element.unwrap_or(source_element);
        let len = len.unwrap_or(source_len);
        if element != source_element || len < source_len {
            return Err(CompilationError::TypeMismatch {
                name: name.to_string(),
                found: variable.ty.to_string(),
                expected: ValueType::List { element, len }.to_string(),
                span: self.span,
            });
        }

        let base = self.scope.next_address();
        debug!(name, source, base, "copying list");
        let mut code = Fragment::new();
        code.comment(format!("list<{element}>[{len}] {name} = {source} @ {base:#x}"));
        for i in 0..len {
            let address = self.scope.allocate(element.size(), self.span)?;
            self.declare_element(name, i, address, element, StoredValue::Zeroed)?;
        }
        code.extend(self.copy_list(name, base, element, len, &Expr::Ident(source))?);

        let list = Variable {
            address: base,
            ty: ValueType::List { element, len },
            value: StoredValue::Copied(source.to_string()),
        };
        self.scope.declare_variable(name, list, false, self.span)?;
        Ok(code)
    }

    fn declare_element(
        &mut self,
        list: &str,
        index: u32,
        address: u32,
        element: ScalarType,
        value: StoredValue,
    ) -> Result<()> {
        let variable = Variable {
            address,
            ty: ValueType::Scalar(element),
            value,
        };
        self.scope
            .declare_variable(&element_name(list, index), variable, true, self.span)
    }

    /// Copy `value` element by element into the list at `base`.
    ///
    /// `value` is a list literal, a string, or a list variable no longer
    /// than the destination.
    pub(super) fn copy_list(
        &self,
        name: &str,
        base: u32,
        element: ScalarType,
        len: u32,
        value: &Expr<'_>,
    ) -> Result<Fragment> {
        let expected = ValueType::List { element, len };
        let width = Width::of(element);
        let mut code = Fragment::new();

        if let Expr::Ident(source) = *value {
            let variable = self.scope.lookup_variable(source, self.span)?;
            match variable.ty {
                ValueType::List {
                    element: source_element,
                    len: source_len,
                } if source_element == element && source_len <= len => {
                    for i in 0..source_len {
                        let offset = i * element.size();
                        code.load_from(variable.address + offset, width);
                        code.store_to(base + offset, width);
                    }
                    return Ok(code);
                }
                other => {
                    return Err(CompilationError::TypeMismatch {
                        name: name.to_string(),
                        found: other.to_string(),
                        expected: expected.to_string(),
                        span: self.span,
                    });
                }
            }
        }

        let items = literal_elements(value).ok_or_else(|| CompilationError::TypeMismatch {
            name: name.to_string(),
            found: value.tag().to_lowercase(),
            expected: expected.to_string(),
            span: self.span,
        })?;
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        if count > len {
            return Err(CompilationError::OutOfBounds {
                name: name.to_string(),
                index: i64::from(count) - 1,
                len,
                span: self.span,
            });
        }

        let expr = self.expr();
        for (i, item) in (0..count).zip(items.iter()) {
            let loaded = expr.load(&element_name(name, i), ValueType::Scalar(element), item)?;
            code.extend(loaded.code);
            code.store_to(base + i * element.size(), width);
        }
        Ok(code)
    }

    /// Compile `name[index] = value;`.
    ///
    /// A literal index writes straight to the element's address. A variable
    /// index computes `base + index * size` at run time into r12, loads the
    /// value, then stores through r11.
    pub fn compile_index_assign(&mut self, assign: &IndexAssign<'_>) -> Result<Fragment> {
        let variable = self.scope.lookup_variable(assign.name, self.span)?.clone();
        let ValueType::List { element, len } = variable.ty else {
            return Err(CompilationError::TypeMismatch {
                name: assign.name.to_string(),
                found: variable.ty.to_string(),
                expected: "list".to_string(),
                span: self.span,
            });
        };
        debug!(name = assign.name, base = variable.address, "assigning element");

        if let Some(index) = assign.index.literal_value() {
            let address =
                self.expr()
                    .element_address(assign.name, variable.address, element, len, index)?;
            // In bounds, so the index fits.
            let slot = element_name(assign.name, u32::try_from(index).unwrap_or(0));
            let (code, value) =
                self.assign(&slot, ValueType::Scalar(element), &assign.value, address)?;
            self.scope.set_value(&slot, value, self.span)?;
            return Ok(code);
        }

        if let Expr::Binary(_) = assign.value {
            return Err(CompilationError::UnsupportedExpression {
                message: format!("arithmetic into '{}' with a variable index", assign.name),
                span: self.span,
            });
        }

        let expr = self.expr();
        let mut code = Fragment::new();
        let (index, value) = (assign.index.tag(), assign.value.tag());
        code.comment(format!("{}[{index}] = {value}", assign.name));
        code.extend(expr.element_pointer(assign.name, variable.address, element, &assign.index)?);
        code.mov(Reg::LHS, Reg::VALUE);
        let name = format!("{}[]", assign.name);
        code.extend(expr.load(&name, ValueType::Scalar(element), &assign.value)?.code);
        code.mov(Reg::ADDR, Reg::LHS);
        code.call_routine(Routine::Store(Width::of(element)));
        Ok(code)
    }
}

/// The elements of a list literal or a string.
fn literal_elements<'ast>(value: &Expr<'ast>) -> Option<Vec<Expr<'ast>>> {
    match *value {
        Expr::List(items) => Some(items.to_vec()),
        Expr::Str(text) => Some(text.bytes().map(Expr::Char).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::AstBuilder;
    use chonky_core::{CompilationError, ScalarType, Span, ValueType};

    #[test]
    fn list_elements_are_consecutive() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = ast.list(&[ast.int(1), ast.int(2), ast.int(3)]);
        let decl = ast.list_decl(1, "xs", Some(ScalarType::Int), None, Some(items));
        let program = ast.program(&[decl]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let address = |name: &str| scope.lookup_variable(name, Span::new(2)).unwrap().address;
        assert_eq!(address("xs"), 0x1000_0000);
        assert_eq!(address("xs[1]"), 0x1000_0004);
        assert_eq!(address("xs[2]"), 0x1000_0008);
        assert_eq!(scope.next_address(), 0x1000_000c);
        assert_eq!(scope.warnings(), 0);
    }

    #[test]
    fn mixed_element_types_fail_before_emitting() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = ast.list(&[ast.char(b'a'), ast.int(2), ast.char(b'c')]);
        let decl = ast.list_decl(4, "xs", Some(ScalarType::Char), Some(3), Some(items));
        let program = ast.program(&[decl]);

        let mut scope = Scope::new(CompilerConfig::default());
        let err = scope.run(program).unwrap_err();
        assert_eq!(
            err,
            CompilationError::TypeMismatch {
                name: "xs[1]".into(),
                found: "int".into(),
                expected: "char".into(),
                span: Span::new(4),
            }
        );
        assert!(scope.body().is_empty());
        assert_eq!(scope.next_address(), 0x1000_0000);
    }

    #[test]
    fn inferred_element_type_warns() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = ast.list(&[ast.char(b'h'), ast.char(b'i')]);
        let program = ast.program(&[ast.list_decl(1, "s", None, None, Some(items))]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        assert_eq!(scope.warnings(), 1);
        assert_eq!(
            scope.lookup_variable("s", Span::new(2)).unwrap().ty,
            ValueType::List {
                element: ScalarType::Char,
                len: 2,
            }
        );
    }

    #[test]
    fn bare_list_defaults_to_ten_ints() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[ast.list_decl(1, "xs", None, None, None)]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        assert_eq!(scope.next_address(), 0x1000_0028);
        assert_eq!(scope.body().instructions().count(), 10 * 5);
    }

    #[test]
    fn too_many_items() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let items = ast.list(&[ast.int(1), ast.int(2), ast.int(3)]);
        let decl = ast.list_decl(1, "xs", Some(ScalarType::Int), Some(2), Some(items));
        let program = ast.program(&[decl]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert!(matches!(
            scope.run(program),
            Err(CompilationError::OutOfBounds { len: 2, .. })
        ));
    }

    #[test]
    fn element_write_with_variable_index() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.list_decl(1, "xs", Some(ScalarType::Int), Some(2), None),
            ast.var_decl(2, ScalarType::Int, "i", ast.int(1)),
            ast.index_assign(3, "xs", ast.ident("i"), ast.int(9)),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let expected = "ldr r11, 0x10000008\nldr r1, .cmemw\nldr r0, $2\njpr r1\n\
             imult r20, 4\nldr r21, 0x10000000\nadd r20, r21, r20\nmov r12, r20\n\
             ldr r20, #9\nmov r11, r12\nldr r1, .lmemw\nldr r0, $2\njpr r1";
        assert!(scope.body().render(false).ends_with(expected));
    }

    #[test]
    fn element_write_with_literal_index() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.list_decl(1, "xs", Some(ScalarType::Char), Some(4), None),
            ast.index_assign(2, "xs", ast.int(3), ast.char(b'z')),
            ast.index_assign(3, "xs", ast.int(4), ast.char(b'z')),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        let err = scope.run(program).unwrap_err();
        assert_eq!(
            err,
            CompilationError::OutOfBounds {
                name: "xs".into(),
                index: 4,
                len: 4,
                span: Span::new(3),
            }
        );
        assert!(scope.body().render(false).contains("ldr r20, #122\nldr r11, 0x10000003"));
    }
}
