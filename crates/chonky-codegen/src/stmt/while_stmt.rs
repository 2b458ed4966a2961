//! While loop compilation.

use chonky_ast::WhileStmt;
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::{Fragment, WhileLabels};
use crate::ir::{Operand, Reg};
use crate::scope::ScopeLink;

impl StmtCompiler<'_> {
    /// Compile a while loop.
    ///
    /// Layout:
    /// ```text
    /// .while_start_N
    /// ldr r17, .while_end_N
    /// [lhs into r26]
    /// [rhs into r30]
    /// jprXX r17, r26, r30
    /// [body]
    /// ldr r16, .while_start_N
    /// jpr r16
    /// .while_end_N
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<Fragment> {
        let labels = WhileLabels::new(self.scope.new_label());
        debug!(start = %labels.start, "compiling while loop");

        let mut code = Fragment::new();
        code.label(&labels.start);
        code.ldr(Reg::BRANCH, Operand::label(&labels.end));
        code.extend(self.compile_condition(&while_stmt.condition, Reg::BRANCH)?);

        let mut body = self.scope.fork(ScopeLink::Copy);
        body.run(while_stmt.body)?;
        code.extend(self.scope.sync(body));

        code.ldr(Reg::ELSE, Operand::label(&labels.start));
        code.jpr(Reg::ELSE);
        code.label(&labels.end);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::{AstBuilder, BinaryOp, Comparison};
    use chonky_core::ScalarType;

    #[test]
    fn counting_loop() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let step = ast.binary(BinaryOp::Add, ast.ident("i"), ast.int(1));
        let program = ast.program(&[
            ast.var_decl(1, ScalarType::Int, "i", ast.int(0)),
            ast.while_stmt(
                2,
                ast.cond(Comparison::Less, ast.ident("i"), ast.int(10)),
                &[ast.reassign(3, "i", step)],
            ),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let body = scope.body().render(false);
        let head = ".while_start_0\nldr r17, .while_end_0\n\
             ldr r11, 0x10000000\nldr r1, .cmemw\nldr r0, $2\njpr r1\nmov r26, r20\n\
             ldr r30, #10\njprgt r17, r26, r30";
        let tail = "add r12, r12, r13\nmov r20, r12\n\
             ldr r11, 0x10000000\nldr r1, .lmemw\nldr r0, $2\njpr r1\n\
             ldr r16, .while_start_0\njpr r16\n.while_end_0";
        assert!(body.contains(head));
        assert!(body.ends_with(tail));
    }
}
