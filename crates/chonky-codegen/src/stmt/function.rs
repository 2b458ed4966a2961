//! Function declarations.

use chonky_ast::FunctionDecl;
use chonky_core::ValueType;
use tracing::debug;

use super::list::element_name;
use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::ir::{Reg, Width};
use crate::scope::ScopeLink;
use crate::symbols::{Function, Param, StoredValue, SymbolArena, Variable};

impl StmtCompiler<'_> {
    /// Compile a function declaration into a definition block.
    ///
    /// Parameters get fresh cells in the body's scope; callers copy their
    /// arguments there before jumping in. The caller's return address
    /// arrives in r0 and is parked in a cell allocated after the body's
    /// variables.
    ///
    /// The label is `name` qualified with the enclosing namespaces and must
    /// be unique in the whole program, so a definition inside an unrolled
    /// loop body fails on the second pass.
    ///
    /// Layout:
    /// ```text
    /// .label
    /// mov r20, r0
    /// [store r20 to the return slot]
    /// [body]
    /// [load the return slot into r20]
    /// jpr r20
    /// ```
    pub fn compile_function(&mut self, decl: &FunctionDecl<'_>) -> Result<Fragment> {
        let label = self.scope.qualify(decl.name);
        self.scope.claim_function_label(&label, self.span)?;
        let mut body = self.scope.fork(ScopeLink::Copy);

        let mut params = Vec::with_capacity(decl.params.len());
        for param in decl.params {
            let address = body.next_address();
            match param.ty {
                ValueType::List { element, len } => {
                    for i in 0..len {
                        let element_address = body.allocate(element.size(), self.span)?;
                        let cell = Variable {
                            address: element_address,
                            ty: ValueType::Scalar(element),
                            value: StoredValue::Zeroed,
                        };
                        body.declare_variable(&element_name(param.name, i), cell, true, self.span)?;
                    }
                }
                ty => {
                    body.allocate(ty.size(), self.span)?;
                }
            }
            let variable = Variable {
                address,
                ty: param.ty,
                value: StoredValue::Zeroed,
            };
            body.declare_variable(param.name, variable, true, self.span)?;
            params.push(Param {
                name: param.name.to_string(),
                address,
                ty: param.ty,
            });
        }
        debug!(name = decl.name, %label, params = params.len(), "declaring function");

        // Visible to its own body so it can call itself.
        body.declare_function(Function {
            name: decl.name.to_string(),
            label: label.clone(),
            params: params.clone(),
            return_slot: 0,
            symbols: SymbolArena::default(),
            text: String::new(),
        });

        body.run(decl.body)?;
        let return_slot = body.allocate(4, self.span)?;
        let symbols = body.symbols().clone();
        let inner = self.scope.sync(body);

        let mut code = Fragment::new();
        code.label(&label);
        code.comment(format!("return slot {return_slot:#x}"));
        code.mov(Reg::VALUE, Reg::RET);
        code.store_to(return_slot, Width::Word);
        code.extend(inner);
        code.load_from(return_slot, Width::Word);
        code.jpr(Reg::VALUE);

        let text = code.render(self.scope.config().comments());
        self.scope.declare_function(Function {
            name: decl.name.to_string(),
            label,
            params,
            return_slot,
            symbols,
            text,
        });
        Ok(code)
    }
}
