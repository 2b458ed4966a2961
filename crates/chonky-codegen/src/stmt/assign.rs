//! Scalar declarations, reassignments and raw memory writes.

use chonky_ast::{AdvancedWrite, Expr, Reassign, VarDecl};
use chonky_core::{ScalarType, ValueType};
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::ir::Width;
use crate::symbols::{StoredValue, Variable};

impl StmtCompiler<'_> {
    /// Compile `ty name = value;`.
    ///
    /// Lists and multi-character strings assigned to a `char` take the list
    /// path; everything else gets one fresh cell.
    pub fn compile_var_decl(&mut self, decl: &VarDecl<'_>) -> Result<Fragment> {
        match (decl.ty, decl.value) {
            (ValueType::List { element, len }, value) => {
                return self.declare_list(decl.name, Some(element), Some(len), Some(value));
            }
            (ValueType::Scalar(ScalarType::Char), Expr::Str(text)) if text.len() > 1 => {
                return self.declare_list(decl.name, Some(ScalarType::Char), None, Some(decl.value));
            }
            _ => {}
        }

        self.scope.ensure_undeclared(decl.name, self.span)?;
        let loaded = self.expr().load(decl.name, decl.ty, &decl.value)?;
        let address = self.scope.allocate(decl.ty.size(), self.span)?;
        debug!(name = decl.name, ty = %decl.ty, address, "declaring variable");

        let mut code = Fragment::new();
        code.comment(format!("{} {} @ {address:#x}", decl.ty, decl.name));
        code.extend(loaded.code);
        code.store_to(address, Width::for_size(decl.ty.size()));

        let variable = Variable {
            address,
            ty: decl.ty,
            value: loaded.value,
        };
        self.scope
            .declare_variable(decl.name, variable, false, self.span)?;
        Ok(code)
    }

    /// Compile `name = value;`.
    ///
    /// The variable keeps its address; only the stored value changes.
    pub fn compile_reassign(&mut self, reassign: &Reassign<'_>) -> Result<Fragment> {
        let variable = self
            .scope
            .lookup_variable(reassign.name, self.span)?
            .clone();
        debug!(name = reassign.name, address = variable.address, "reassigning variable");

        if let ValueType::List { element, len } = variable.ty {
            let mut code = Fragment::new();
            code.comment(format!("{} = <list> @ {:#x}", reassign.name, variable.address));
            code.extend(self.copy_list(
                reassign.name,
                variable.address,
                element,
                len,
                &reassign.value,
            )?);
            return Ok(code);
        }

        let (code, value) = self.assign(
            reassign.name,
            variable.ty,
            &reassign.value,
            variable.address,
        )?;
        self.scope.set_value(reassign.name, value, self.span)?;
        Ok(code)
    }

    /// Compile `[address, ty] = value;`. No variable is touched.
    pub fn compile_advanced_write(&mut self, write: &AdvancedWrite<'_>) -> Result<Fragment> {
        debug!(address = write.address, ty = %write.ty, "raw memory write");
        let loaded = self.expr().load_raw(write.ty, &write.value)?;

        let mut code = Fragment::new();
        code.comment(format!("[{:#x}, {}]", write.address, write.ty));
        code.extend(loaded.code);
        code.store_to(write.address, Width::of(write.ty));
        Ok(code)
    }

    /// Load `value` and store it to `address` as a `ty` named `name`.
    pub(super) fn assign(
        &self,
        name: &str,
        ty: ValueType,
        value: &Expr<'_>,
        address: u32,
    ) -> Result<(Fragment, StoredValue)> {
        let loaded = self.expr().load(name, ty, value)?;

        let mut code = Fragment::new();
        code.comment(format!("{name} = {} @ {address:#x}", value.tag()));
        code.extend(loaded.code);
        code.store_to(address, Width::for_size(ty.size()));
        Ok((code, loaded.value))
    }
}
