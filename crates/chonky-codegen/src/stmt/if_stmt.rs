//! If/else compilation.

use chonky_ast::IfStmt;
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::{Fragment, IfLabels};
use crate::ir::{Operand, Reg};
use crate::scope::ScopeLink;

impl StmtCompiler<'_> {
    /// Compile an if statement with an optional else branch.
    ///
    /// Each branch runs in its own copy of the scope, so declarations in one
    /// branch are invisible to the other and to the code that follows.
    ///
    /// Layout:
    /// ```text
    /// ldr r17, .if_end_N
    /// [lhs into r26]
    /// [rhs into r30]
    /// jprXX r17, r26, r30     ; taken when the condition is false
    /// [then body]
    /// ldr r16, .else_end_N
    /// jpr r16
    /// .if_end_N
    /// [else body]
    /// .else_end_N
    /// ```
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<Fragment> {
        let labels = IfLabels::new(self.scope.new_label());
        debug!(if_end = %labels.if_end, "compiling conditional");

        let mut code = Fragment::new();
        let condition = &if_stmt.condition;
        code.comment(format!(
            "if {} {} {}",
            condition.lhs.tag(),
            condition.op,
            condition.rhs.tag()
        ));
        code.ldr(Reg::BRANCH, Operand::label(&labels.if_end));
        code.extend(self.compile_condition(condition, Reg::BRANCH)?);

        let mut then_scope = self.scope.fork(ScopeLink::Copy);
        then_scope.run(if_stmt.then_body)?;
        code.extend(self.scope.sync(then_scope));

        code.ldr(Reg::ELSE, Operand::label(&labels.else_end));
        code.jpr(Reg::ELSE);
        code.label(&labels.if_end);

        if let Some(else_body) = if_stmt.else_body {
            let mut else_scope = self.scope.fork(ScopeLink::Copy);
            else_scope.run(else_body)?;
            code.extend(self.scope.sync(else_scope));
        }
        code.label(&labels.else_end);
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::{AstBuilder, Comparison};
    use chonky_core::{ScalarType, Span};

    #[test]
    fn if_else_layout() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let then_body = ast.program(&[ast.var_decl(2, ScalarType::Int, "c", ast.int(1))]);
        let else_body = ast.program(&[ast.var_decl(3, ScalarType::Int, "c", ast.int(2))]);
        let branch = ast.if_stmt(
            1,
            ast.cond(Comparison::Greater, ast.int(5), ast.int(2)),
            then_body,
            Some(else_body),
        );
        let program = ast.program(&[branch]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        assert_eq!(
            scope.body().render(false),
            "ldr r17, .if_end_0\nldr r26, #5\nldr r30, #2\njprlt r17, r26, r30\n\
             ldr r20, #1\nldr r11, 0x10000000\nldr r1, .lmemw\nldr r0, $2\njpr r1\n\
             ldr r16, .else_end_0\njpr r16\n.if_end_0\n\
             ldr r20, #2\nldr r11, 0x10000004\nldr r1, .lmemw\nldr r0, $2\njpr r1\n\
             .else_end_0"
        );
        assert!(scope.lookup_variable("c", Span::new(4)).is_err());
        assert_eq!(scope.next_address(), 0x1000_0008);
        assert_eq!(scope.label_counter(), 1);
    }

    #[test]
    fn nested_conditionals_take_fresh_labels() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let always = ast.cond(Comparison::Equal, ast.int(1), ast.int(1));
        let never = ast.cond(Comparison::NotEqual, ast.int(1), ast.int(1));
        let inner = ast.if_stmt(2, always, &[], None);
        let outer = ast.if_stmt(1, always, &[inner], None);
        let after = ast.if_stmt(3, never, &[], None);
        let program = ast.program(&[outer, after]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let labels: Vec<&str> = scope.body().labels().collect();
        assert_eq!(
            labels,
            vec!["if_end_1", "else_end_1", "if_end_0", "else_end_0", "if_end_2", "else_end_2"]
        );
    }
}
