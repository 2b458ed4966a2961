//! Build pipeline.
//!
//! A [`Unit`] takes a parsed program through every stage:
//!
//! ```text
//! AST -> Scope::run -> body + function streams -> base template -> Assembler -> bytes
//! ```
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use chonky::Unit;
//! use chonky_ast::AstBuilder;
//! use chonky_core::ScalarType;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let program = ast.program(&[ast.var_decl(1, ScalarType::Int, "x", ast.int(5))]);
//!
//! let mut unit = Unit::new();
//! let build = unit.build(program)?;
//! assert!(!build.bytes().is_empty());
//! # Ok::<(), chonky_core::ChonkyError>(())
//! ```

use chonky_asm::{Assembler, ObjectCode};
use chonky_ast::Stmt;
use chonky_codegen::{CompiledProgram, CompilerConfig, compile};
use tracing::{debug, info};

use crate::Result;
use crate::template::{self, BASE_TEMPLATE};

/// Settings for a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConfig {
    pub compiler: CompilerConfig,
    /// Assembly template with `{code}` and `{func_code}` placeholders.
    pub template: String,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerConfig::default(),
            template: BASE_TEMPLATE.to_string(),
        }
    }
}

impl UnitConfig {
    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// The result of a successful build.
#[derive(Debug, Clone)]
pub struct Build {
    program: CompiledProgram,
    assembly: String,
    object: ObjectCode,
}

impl Build {
    /// The compiled streams and top-level symbols.
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// The full assembly text that was assembled.
    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn object(&self) -> &ObjectCode {
        &self.object
    }

    /// The encoded program.
    pub fn bytes(&self) -> &[u8] {
        self.object.code()
    }

    /// Warnings raised while compiling.
    pub fn warnings(&self) -> u32 {
        self.program.warnings()
    }
}

/// A compilation unit.
///
/// Holds the configuration and, after [`Unit::build`], the last build.
#[derive(Debug, Default)]
pub struct Unit {
    config: UnitConfig,
    built: Option<Build>,
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UnitConfig) -> Self {
        Self {
            config,
            built: None,
        }
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    /// Compile and assemble `program`.
    ///
    /// The first error from either stage aborts the build and clears any
    /// previous output.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&mut self, program: &[Stmt<'_>]) -> Result<&Build> {
        self.built = None;

        let compiled = compile(program, self.config.compiler.clone())?;
        let assembly = template::render(
            &self.config.template,
            &compiled.body_text(),
            &compiled.functions_text(),
        );
        debug!(lines = assembly.lines().count(), "assembling");

        let object = Assembler.assemble(&assembly)?;
        info!(
            bytes = object.len(),
            warnings = compiled.warnings(),
            "build finished"
        );

        Ok(self.built.insert(Build {
            program: compiled,
            assembly,
            object,
        }))
    }

    /// Whether the last build succeeded.
    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// The last successful build.
    pub fn output(&self) -> Option<&Build> {
        self.built.as_ref()
    }
}
