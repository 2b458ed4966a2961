//! Namespaces and included units.

use chonky_ast::{IncludeStmt, NamespaceDecl};
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::scope::ScopeLink;
use crate::symbols::Namespace;

impl StmtCompiler<'_> {
    /// Compile a namespace body.
    ///
    /// Functions declared inside are labelled `Ns::name` and are visible
    /// after the block both unqualified and through `Ns::name(...)`.
    /// Qualified calls only reach what the namespace itself declares.
    /// Variables stay inside.
    pub fn compile_namespace(&mut self, decl: &NamespaceDecl<'_>) -> Result<Fragment> {
        debug!(name = decl.name, "entering namespace");
        let mut inner = self.scope.fork(ScopeLink::PassThrough);
        inner.enter_namespace(decl.name);
        inner.run(decl.body)?;

        let symbols = inner.exported_symbols();
        let code = self.scope.sync(inner);
        self.scope.declare_namespace(Namespace {
            name: decl.name.to_string(),
            symbols,
        });
        Ok(code)
    }

    /// Compile an included unit in a fresh scope and adopt its functions
    /// and namespaces.
    pub fn compile_include(&mut self, include: &IncludeStmt<'_>) -> Result<Fragment> {
        debug!(path = include.path, "including unit");
        let mut unit = self.scope.fork(ScopeLink::Isolated);
        unit.run(include.body)?;

        let mut code = Fragment::new();
        code.comment(format!("include {}", include.path));
        code.extend(self.scope.sync(unit));
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::AstBuilder;
    use chonky_core::{CompilationError, ScalarType, Span};

    #[test]
    fn namespaced_function_is_callable_both_ways() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let body = [
            ast.var_decl(2, ScalarType::Int, "hidden", ast.int(1)),
            ast.function(3, "square", &[], &[]),
        ];
        let program = ast.program(&[
            ast.namespace(1, "Math", &body),
            ast.qualified_call(4, "Math", "square", &[]),
            ast.call(5, "square", &[]),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();

        assert!(scope.functions().render(false).starts_with(".Math::square\n"));
        let calls = scope.body().render(false);
        assert_eq!(calls.matches("ldr r23, .Math::square").count(), 2);
        assert!(scope.lookup_variable("hidden", Span::new(6)).is_err());
        assert_eq!(scope.symbols().namespace_names(), vec!["Math"]);
    }

    #[test]
    fn namespaces_may_reuse_function_names() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.namespace(1, "Circle", &[ast.function(2, "area", &[], &[])]),
            ast.namespace(3, "Square", &[ast.function(4, "area", &[], &[])]),
            ast.qualified_call(5, "Circle", "area", &[]),
            ast.qualified_call(6, "Square", "area", &[]),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();

        let functions = scope.functions().render(false);
        assert!(functions.starts_with(".Circle::area\n"));
        assert!(functions.contains("\n.Square::area\n"));
        let body = scope.body().render(false);
        assert!(body.starts_with("ldr r0, $3\nldr r23, .Circle::area\njpr r23\n"));
        assert!(body.ends_with("ldr r0, $3\nldr r23, .Square::area\njpr r23"));
    }

    #[test]
    fn qualified_call_reaches_members_only() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.function(1, "global", &[], &[]),
            ast.namespace(2, "Circle", &[ast.function(3, "area", &[], &[])]),
            ast.qualified_call(4, "Circle", "global", &[]),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert_eq!(
            scope.run(program).unwrap_err(),
            CompilationError::UnknownFunction {
                name: "Circle::global".into(),
                span: Span::new(4),
            }
        );
    }

    #[test]
    fn include_exports_functions_not_variables() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let unit = [
            ast.var_decl(1, ScalarType::Int, "internal", ast.int(3)),
            ast.function(2, "helper", &[], &[]),
        ];
        let program = ast.program(&[
            ast.var_decl(1, ScalarType::Int, "outer", ast.int(1)),
            ast.include(2, "lib.ch", &unit),
            ast.call(3, "helper", &[]),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        assert!(scope.lookup_variable("internal", Span::new(4)).is_err());
        assert!(scope.lookup_function("helper").is_some());
        // The unit allocated after `outer`: `internal` and the return slot of `helper`.
        assert_eq!(scope.next_address(), 0x1000_000c);
    }
}
