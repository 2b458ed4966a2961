//! Base-address directives.

use chonky_ast::{Directive, DirectiveKind};
use chonky_core::CompilationError;
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;
use crate::scope::ScopeMode;

impl StmtCompiler<'_> {
    /// Move an allocation cursor forward. Emits nothing.
    pub fn compile_directive(&mut self, directive: &Directive) -> Result<Fragment> {
        if !self.scope.mode().contains(ScopeMode::BITSET) {
            return Err(CompilationError::UnauthorizedBitSet { span: self.span });
        }
        debug!(kind = ?directive.kind, address = directive.address, "moving cursor");
        match directive.kind {
            DirectiveKind::Bitstart => self.scope.move_cursor(directive.address, self.span)?,
            DirectiveKind::Bitdata => self.scope.move_data_cursor(directive.address, self.span)?,
        }
        Ok(Fragment::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{CompileFlags, CompilerConfig};
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::{AstBuilder, Comparison, DirectiveKind};
    use chonky_core::{CompilationError, ScalarType, Span};

    #[test]
    fn bitstart_moves_allocation() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.directive(1, DirectiveKind::Bitstart, 0x2000_0000),
            ast.var_decl(2, ScalarType::Int, "x", ast.int(1)),
            ast.directive(3, DirectiveKind::Bitdata, 0x3000_0000),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let x = scope.lookup_variable("x", Span::new(4)).unwrap();
        assert_eq!(x.address, 0x2000_0000);
        assert_eq!(scope.next_data_address(), 0x3000_0000);
    }

    #[test]
    fn directive_inside_block_is_rejected() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let body = [ast.directive(2, DirectiveKind::Bitstart, 0x2000_0000)];
        let branch = ast.if_stmt(
            1,
            ast.cond(Comparison::Equal, ast.int(0), ast.int(0)),
            &body,
            None,
        );
        let program = ast.program(&[branch]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert_eq!(
            scope.run(program).unwrap_err(),
            CompilationError::UnauthorizedBitSet { span: Span::new(2) }
        );
    }

    #[test]
    fn directive_disabled_by_config() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[ast.directive(1, DirectiveKind::Bitdata, 0x3000_0000)]);

        let config = CompilerConfig::default().with_flags(CompileFlags::COMMENTS);
        let mut scope = Scope::new(config);
        assert!(matches!(
            scope.run(program),
            Err(CompilationError::UnauthorizedBitSet { .. })
        ));
    }

    #[test]
    fn cursor_regression() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[ast.directive(1, DirectiveKind::Bitstart, 0x0100)]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert_eq!(
            scope.run(program).unwrap_err(),
            CompilationError::AddressRegression {
                requested: 0x0100,
                cursor: 0x1000_0000,
                span: Span::new(1),
            }
        );
    }
}
