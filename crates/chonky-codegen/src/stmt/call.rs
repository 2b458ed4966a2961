//! Function calls.

use std::rc::Rc;

use chonky_ast::CallStmt;
use chonky_core::{CompilationError, ScalarType, ValueType};
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::ir::{Instr, Operand, Reg, Width};
use crate::symbols::Function;

/// Builtin that writes one character to the output port.
const PUTCHAR: &str = "putchar";

impl StmtCompiler<'_> {
    /// Compile a call.
    ///
    /// Each argument is stored into the callee's parameter cell from the
    /// caller's side, element by element for list parameters. The return
    /// address handed over in r0 points just past the final jump:
    ///
    /// ```text
    /// [argument stores]
    /// ldr r0, $3
    /// ldr r23, .label
    /// jpr r23
    /// ```
    pub fn compile_call(&mut self, call: &CallStmt<'_>) -> Result<Fragment> {
        if call.namespace.is_none()
            && call.name == PUTCHAR
            && self.scope.lookup_function(PUTCHAR).is_none()
        {
            return self.compile_putchar(call);
        }

        let function = self.resolve_function(call)?;
        if function.params.len() != call.args.len() {
            return Err(CompilationError::ArgumentCount {
                function: function.label.clone(),
                expected: function.params.len(),
                found: call.args.len(),
                span: self.span,
            });
        }
        debug!(function = %function.label, args = call.args.len(), "calling function");

        let mut code = Fragment::new();
        code.comment(format!("call {}", function.label));
        for (param, arg) in function.params.iter().zip(call.args) {
            match param.ty {
                ValueType::List { element, len } => {
                    let copy = self.copy_list(&param.name, param.address, element, len, arg)?;
                    code.extend(copy);
                }
                ty => {
                    let (store, _) = self.assign(&param.name, ty, arg, param.address)?;
                    code.extend(store);
                }
            }
        }
        code.ldr(Reg::RET, Operand::Forward(3));
        code.ldr(Reg::CALL, Operand::label(&function.label));
        code.jpr(Reg::CALL);
        Ok(code)
    }

    fn resolve_function(&self, call: &CallStmt<'_>) -> Result<Rc<Function>> {
        match call.namespace {
            Some(namespace) => {
                let found = self.scope.lookup_namespace(namespace, self.span)?;
                found
                    .symbols
                    .function(call.name)
                    .cloned()
                    .ok_or_else(|| CompilationError::UnknownFunction {
                        name: format!("{namespace}::{}", call.name),
                        span: self.span,
                    })
            }
            None => self
                .scope
                .lookup_function(call.name)
                .ok_or_else(|| CompilationError::UnknownFunction {
                    name: call.name.to_string(),
                    span: self.span,
                }),
        }
    }

    /// `putchar(c)`: load the character and store it to the output port.
    fn compile_putchar(&mut self, call: &CallStmt<'_>) -> Result<Fragment> {
        let [arg] = call.args else {
            return Err(CompilationError::ArgumentCount {
                function: PUTCHAR.to_string(),
                expected: 1,
                found: call.args.len(),
                span: self.span,
            });
        };
        let loaded = self.expr().load_raw(ScalarType::Char, arg)?;
        let port = self.scope.config().output_port;

        let mut code = Fragment::new();
        code.comment(format!("putchar {}", arg.tag()));
        code.extend(loaded.code);
        code.ldr(Reg::PORT, Operand::Hex(port));
        code.instr(Instr::Store {
            width: Width::Byte,
            rs: Reg::VALUE,
            addr: Reg::PORT,
        });
        Ok(code)
    }
}
