//! Whole-program compilation.

use chonky_ast::Stmt;

use crate::Result;
use crate::config::CompilerConfig;
use crate::emit::Fragment;
use crate::scope::Scope;
use crate::symbols::SymbolArena;

/// The output of compiling a program.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    body: Fragment,
    functions: Fragment,
    symbols: SymbolArena,
    warnings: u32,
    comments: bool,
}

impl CompiledProgram {
    pub(crate) fn new(
        body: Fragment,
        functions: Fragment,
        symbols: SymbolArena,
        warnings: u32,
        comments: bool,
    ) -> Self {
        Self {
            body,
            functions,
            symbols,
            warnings,
            comments,
        }
    }

    /// Program body instructions.
    pub fn body(&self) -> &Fragment {
        &self.body
    }

    /// Function definition blocks, in declaration order.
    pub fn functions(&self) -> &Fragment {
        &self.functions
    }

    /// Top-level symbols after compilation.
    pub fn symbols(&self) -> &SymbolArena {
        &self.symbols
    }

    pub fn warnings(&self) -> u32 {
        self.warnings
    }

    /// The body stream as assembly text.
    pub fn body_text(&self) -> String {
        self.body.render(self.comments)
    }

    /// The function stream as assembly text.
    pub fn functions_text(&self) -> String {
        self.functions.render(self.comments)
    }
}

/// Compile a program in a fresh top-level scope.
pub fn compile(program: &[Stmt<'_>], config: CompilerConfig) -> Result<CompiledProgram> {
    let mut scope = Scope::new(config);
    scope.run(program)?;
    Ok(scope.finish())
}
