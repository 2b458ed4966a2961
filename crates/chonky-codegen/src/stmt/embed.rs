//! Embedded assembly.

use chonky_ast::EmbedStmt;
use tracing::debug;

use super::{Result, StmtCompiler};
use crate::emit::Fragment;

impl StmtCompiler<'_> {
    /// Copy raw assembly into the output.
    ///
    /// `{name}` is replaced with the address of variable `name` in hex.
    /// Blank lines are dropped; everything else is emitted verbatim.
    pub fn compile_embed(&mut self, embed: &EmbedStmt<'_>) -> Result<Fragment> {
        debug!(lines = embed.code.lines().count(), "embedding assembly");
        let mut code = Fragment::new();
        for line in embed.code.lines() {
            let line = line.trim();
            if !line.is_empty() {
                code.raw(self.substitute(line)?);
            }
        }
        Ok(code)
    }

    fn substitute(&self, line: &str) -> Result<String> {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + len];
            let variable = self.scope.lookup_variable(name.trim(), self.span)?;
            out.push_str(&rest[..open]);
            out.push_str(&format!("{:#x}", variable.address));
            rest = &rest[open + len + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::scope::Scope;
    use bumpalo::Bump;
    use chonky_ast::AstBuilder;
    use chonky_core::{CompilationError, ScalarType};

    #[test]
    fn placeholders_become_addresses() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[
            ast.var_decl(1, ScalarType::Int, "a", ast.int(1)),
            ast.var_decl(2, ScalarType::Int, "b", ast.int(2)),
            ast.embed(3, "ldr r11, {b}\n\n    ldw r20, r11 ; read b\nldr r12, {a}"),
        ]);

        let mut scope = Scope::new(CompilerConfig::default());
        scope.run(program).unwrap();
        let expected = "ldr r11, 0x10000004\nldw r20, r11 ; read b\nldr r12, 0x10000000";
        assert!(scope.body().render(false).ends_with(expected));
    }

    #[test]
    fn unknown_placeholder() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = ast.program(&[ast.embed(1, "ldr r11, {ghost}")]);

        let mut scope = Scope::new(CompilerConfig::default());
        assert!(matches!(
            scope.run(program),
            Err(CompilationError::UnknownVariable { .. })
        ));
    }
}
