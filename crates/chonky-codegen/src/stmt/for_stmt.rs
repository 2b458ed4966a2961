//! Compile-time for loops.

use chonky_ast::ForStmt;
use chonky_core::{CompilationError, ScalarType, ValueType};
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::ir::{Reg, Width};
use crate::scope::{Scope, ScopeLink, ScopeMode};
use crate::symbols::{StoredValue, Variable};

impl StmtCompiler<'_> {
    /// Unroll `for var in list { body }`.
    ///
    /// The body is emitted once per element of `list`, whose length is known
    /// while compiling. Before each copy the loop variable is set to the
    /// index. Every copy runs against the enclosing scope's own tables, so
    /// declarations accumulate across iterations and stay visible after the
    /// loop; redeclaring a name inside the body rebinds it.
    pub fn compile_for(&mut self, for_stmt: &ForStmt<'_>) -> Result<Fragment> {
        let iterable = self.scope.lookup_variable(for_stmt.iterable, self.span)?;
        let ValueType::List { len, .. } = iterable.ty else {
            return Err(CompilationError::TypeMismatch {
                name: for_stmt.iterable.to_string(),
                found: iterable.ty.to_string(),
                expected: "list".to_string(),
                span: self.span,
            });
        };
        debug!(var = for_stmt.var, iterations = len, "unrolling for loop");

        let mut body = self.scope.fork(ScopeLink::Shared);
        body.set_mode(body.mode() | ScopeMode::UNROLLING);
        let result = self.unroll(&mut body, for_stmt, len);
        // Always hand the tables back, even on failure.
        let code = self.scope.sync(body);
        result.map(|()| code)
    }

    fn unroll(&self, body: &mut Scope, for_stmt: &ForStmt<'_>, len: u32) -> Result<()> {
        let address = body.allocate(ScalarType::Int.size(), self.span)?;
        let counter = Variable {
            address,
            ty: ValueType::Scalar(ScalarType::Int),
            value: StoredValue::Zeroed,
        };
        body.declare_variable(for_stmt.var, counter, true, self.span)?;

        for i in 0..len {
            let mut code = Fragment::new();
            code.comment(format!("{} = {i}", for_stmt.var));
            code.load_literal(Reg::VALUE, i64::from(i), false);
            code.store_to(address, Width::Word);
            body.push_body(code);
            let index = StoredValue::Literal(i64::from(i));
            body.set_value(for_stmt.var, index, self.span)?;

            body.run(for_stmt.body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::{Scope, ScopeMode};
    use bumpalo::Bump;
    use chonky_ast::AstBuilder;
    use chonky_core::{CompilationError, ScalarType, Span};

    #[test]
    fn body_is_repeated_per_element() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.list_decl(1, "xs", Some(ScalarType::Int), Some(3), None),
            ast.for_stmt(
                2,
                "i",
                "xs",
                &[ast.var_decl(3, ScalarType::Int, "tmp", ast.ident("i"))],
            ),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();

        // xs takes 12 bytes, i 4, and tmp is rebound on each of the 3 passes.
        assert_eq!(scope.next_address(), 0x1000_0000 + 12 + 4 + 3 * 4);
        let tmp = scope.lookup_variable("tmp", Span::new(4)).unwrap();
        assert_eq!(tmp.address, 0x1000_0018);
        assert!(scope.lookup_variable("i", Span::new(4)).is_ok());
        assert!(!scope.mode().contains(ScopeMode::UNROLLING));

        let body = scope.body().render(false);
        let stores = body.matches("ldr r11, 0x1000000c\nldr r1, .lmemw").count();
        assert_eq!(stores, 3);
        assert!(body.contains("ldr r20, #2\nldr r11, 0x1000000c"));
    }

    #[test]
    fn iterable_must_be_a_list() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.var_decl(1, ScalarType::Int, "n", ast.int(3)),
            ast.for_stmt(2, "i", "n", &[]),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert!(matches!(
            scope.run(program),
            Err(CompilationError::TypeMismatch { .. })
        ));
    }
}
