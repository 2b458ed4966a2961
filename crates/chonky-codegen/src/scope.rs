//! Scope management.
//!
//! A [`Scope`] is the compilation context of one lexical block. It wraps a
//! [`SymbolArena`] together with the label counter, the warning counter and
//! the mode flags, and owns the two output streams of the block: the
//! program body and the function definitions.
//!
//! Scopes form a tree through [`Scope::fork`]. How a child sees its parent's
//! symbols, and what flows back on [`Scope::sync`], is spelled out by its
//! [`ScopeLink`]:
//!
//! | Link          | Child starts with             | Sync hands back                        |
//! |---------------|-------------------------------|----------------------------------------|
//! | `Copy`        | a copy of the parent's tables | cursors and counters                   |
//! | `Shared`      | the parent's own tables       | the tables, with everything declared   |
//! | `PassThrough` | a copy of the parent's tables | cursors, counters, new functions/namespaces |
//! | `Isolated`    | empty tables                  | cursors, counters, new functions/namespaces |
//!
//! Every link starts the child at the parent's cursors, label counter and
//! set of function labels, and hands them back on sync, so addresses and
//! label names stay unique across the program.

use std::rc::Rc;

use bitflags::bitflags;
use chonky_ast::{NodeClass, Stmt};
use chonky_core::{CompilationError, Span};
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::Result;
use crate::config::{CompileFlags, CompilerConfig};
use crate::emit::Fragment;
use crate::program::CompiledProgram;
use crate::stmt::StmtCompiler;
use crate::symbols::{Function, Namespace, StoredValue, SymbolArena, Variable};

bitflags! {
    /// Per-scope switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScopeMode: u8 {
        /// Base-address directives are allowed.
        const BITSET = 1 << 0;
        /// Inside a compile-time loop body: redeclaring a name rebinds it.
        const UNROLLING = 1 << 1;
    }
}

/// How a child scope relates to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLink {
    /// Independent copy of the parent's tables. Used for if/else branches,
    /// loop bodies and function bodies.
    Copy,
    /// The parent's tables, moved into the child for the duration and moved
    /// back on sync. Used for compile-time loop iterations.
    Shared,
    /// Independent copy whose new functions and namespaces are merged back.
    /// Used for namespace bodies.
    PassThrough,
    /// Empty tables whose new functions and namespaces are merged back.
    /// Used for included units.
    Isolated,
}

impl ScopeLink {
    /// Whether sync imports the child's new functions and namespaces.
    pub fn merges_back(self) -> bool {
        matches!(self, ScopeLink::PassThrough | ScopeLink::Isolated)
    }
}

/// A symbol declared in a scope, recorded for merge-back.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Export {
    Function(String),
    Namespace(String),
}

/// Compilation context of one lexical block.
#[derive(Debug)]
pub struct Scope {
    symbols: SymbolArena,
    /// Next label index.
    labels: u32,
    /// Labels of every function defined so far, program-wide.
    function_labels: FxHashSet<String>,
    warnings: u32,
    mode: ScopeMode,
    link: ScopeLink,
    /// Enclosing namespaces, outermost first. Empty at the top level.
    path: Vec<String>,
    config: Rc<CompilerConfig>,
    /// Functions and namespaces declared here, pending merge-back.
    exports: Vec<Export>,
    body: Fragment,
    functions: Fragment,
}

impl Scope {
    /// Create the top-level scope of a program.
    pub fn new(config: CompilerConfig) -> Self {
        let (bitstart, bitdata) = (config.bitstart, config.bitdata);
        Self::starting_at(config, bitstart, bitdata)
    }

    /// Create a top-level scope whose cursors start at caller-supplied addresses.
    pub fn starting_at(config: CompilerConfig, next_address: u32, next_data_address: u32) -> Self {
        let mode = if config.flags.contains(CompileFlags::ALLOW_BITSET) {
            ScopeMode::BITSET
        } else {
            ScopeMode::empty()
        };
        Self {
            symbols: SymbolArena::new(next_address, next_data_address),
            labels: 0,
            function_labels: FxHashSet::default(),
            warnings: 0,
            mode,
            link: ScopeLink::Isolated,
            path: Vec::new(),
            config: Rc::new(config),
            exports: Vec::new(),
            body: Fragment::new(),
            functions: Fragment::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn symbols(&self) -> &SymbolArena {
        &self.symbols
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn link(&self) -> ScopeLink {
        self.link
    }

    /// The next label index that [`Scope::new_label`] will hand out.
    pub fn label_counter(&self) -> u32 {
        self.labels
    }

    pub fn warnings(&self) -> u32 {
        self.warnings
    }

    pub fn next_address(&self) -> u32 {
        self.symbols.next_address()
    }

    pub fn next_data_address(&self) -> u32 {
        self.symbols.next_data_address()
    }

    pub fn body(&self) -> &Fragment {
        &self.body
    }

    pub fn functions(&self) -> &Fragment {
        &self.functions
    }

    /// Qualified name of the current namespace.
    pub fn namespace(&self) -> String {
        if self.path.is_empty() {
            self.config.namespace.clone()
        } else {
            self.path.join("::")
        }
    }

    /// `name` qualified with the enclosing namespaces.
    pub fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.path.join("::"), name)
        }
    }

    pub(crate) fn enter_namespace(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    pub(crate) fn set_mode(&mut self, mode: ScopeMode) {
        self.mode = mode;
    }

    // ========================================================================
    // Allocation and counters
    // ========================================================================

    /// Hand out `size` bytes of the variable region.
    ///
    /// # Errors
    ///
    /// `AddressOverflow` if the cells would run past the end of memory.
    pub fn allocate(&mut self, size: u32, span: Span) -> Result<u32> {
        let cursor = self.symbols.next_address();
        self.symbols
            .allocate(size)
            .ok_or(CompilationError::AddressOverflow { size, cursor, span })
    }

    /// Move the variable cursor forward to `address`.
    pub(crate) fn move_cursor(&mut self, address: u32, span: Span) -> Result<()> {
        let cursor = self.symbols.next_address();
        if address < cursor {
            return Err(CompilationError::AddressRegression {
                requested: address,
                cursor,
                span,
            });
        }
        self.symbols.set_next_address(address);
        Ok(())
    }

    /// Move the data cursor forward to `address`.
    pub(crate) fn move_data_cursor(&mut self, address: u32, span: Span) -> Result<()> {
        let cursor = self.symbols.next_data_address();
        if address < cursor {
            return Err(CompilationError::AddressRegression {
                requested: address,
                cursor,
                span,
            });
        }
        self.symbols.set_next_data_address(address);
        Ok(())
    }

    /// Take a fresh label index.
    pub fn new_label(&mut self) -> u32 {
        let label = self.labels;
        self.labels += 1;
        label
    }

    /// Record a warning.
    pub fn warn(&mut self, message: &str, span: Span) {
        self.warnings += 1;
        warn!(%span, "{message}");
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Fail if `name` is bound and may not be rebound here.
    pub fn ensure_undeclared(&self, name: &str, span: Span) -> Result<()> {
        if self.symbols.contains_variable(name) && !self.mode.contains(ScopeMode::UNROLLING) {
            return Err(CompilationError::VariableExists {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// Bind a variable.
    ///
    /// # Errors
    ///
    /// `VariableExists` if the name is bound, unless `force` is set or the
    /// scope is unrolling a loop.
    pub fn declare_variable(
        &mut self,
        name: &str,
        variable: Variable,
        force: bool,
        span: Span,
    ) -> Result<()> {
        if !force {
            self.ensure_undeclared(name, span)?;
        }
        self.symbols.insert_variable(name, variable);
        Ok(())
    }

    /// Look up a variable.
    ///
    /// # Errors
    ///
    /// `UnknownVariable`, listing every bound name.
    pub fn lookup_variable(&self, name: &str, span: Span) -> Result<&Variable> {
        self.symbols
            .variable(name)
            .ok_or_else(|| self.unknown_variable(name, span))
    }

    /// Record what a variable now holds. Its address does not change.
    pub fn set_value(&mut self, name: &str, value: StoredValue, span: Span) -> Result<()> {
        match self.symbols.variable_mut(name) {
            Some(variable) => {
                variable.value = value;
                Ok(())
            }
            None => Err(self.unknown_variable(name, span)),
        }
    }

    fn unknown_variable(&self, name: &str, span: Span) -> CompilationError {
        CompilationError::UnknownVariable {
            name: name.to_string(),
            bound: self.symbols.variable_names(),
            span,
        }
    }

    // ========================================================================
    // Functions and namespaces
    // ========================================================================

    pub fn lookup_function(&self, name: &str) -> Option<Rc<Function>> {
        self.symbols.function(name).cloned()
    }

    /// Reserve the assembly label of a function definition.
    ///
    /// # Errors
    ///
    /// `FunctionExists` if a definition with this label was already
    /// compiled anywhere in the program.
    pub fn claim_function_label(&mut self, label: &str, span: Span) -> Result<()> {
        if !self.function_labels.insert(label.to_string()) {
            return Err(CompilationError::FunctionExists {
                name: label.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// Register a compiled function under its declared name.
    pub fn declare_function(&mut self, function: Function) -> Rc<Function> {
        let name = function.name.clone();
        let function = Rc::new(function);
        self.symbols
            .insert_function(name.clone(), Rc::clone(&function));
        self.exports.push(Export::Function(name));
        function
    }

    /// Register a namespace under its name.
    pub fn declare_namespace(&mut self, namespace: Namespace) -> Rc<Namespace> {
        let name = namespace.name.clone();
        let namespace = Rc::new(namespace);
        self.symbols
            .insert_namespace(name.clone(), Rc::clone(&namespace));
        self.exports.push(Export::Namespace(name));
        namespace
    }

    /// Look up a namespace.
    ///
    /// # Errors
    ///
    /// `NamespaceNotFound`, listing every visible namespace.
    pub fn lookup_namespace(&self, name: &str, span: Span) -> Result<Rc<Namespace>> {
        self.symbols
            .namespace(name)
            .cloned()
            .ok_or_else(|| CompilationError::NamespaceNotFound {
                name: name.to_string(),
                available: self.symbols.namespace_names(),
                span,
            })
    }

    // ========================================================================
    // Fork / sync
    // ========================================================================

    /// Create a child scope for a nested block.
    ///
    /// A `Shared` child takes the parent's tables; the parent must not be
    /// used again until the child is synced back.
    pub fn fork(&mut self, link: ScopeLink) -> Scope {
        let symbols = match link {
            ScopeLink::Copy | ScopeLink::PassThrough => self.symbols.clone(),
            ScopeLink::Shared => std::mem::take(&mut self.symbols),
            ScopeLink::Isolated => SymbolArena::new(
                self.symbols.next_address(),
                self.symbols.next_data_address(),
            ),
        };
        let mode = match link {
            ScopeLink::Isolated => self.mode,
            _ => self.mode.difference(ScopeMode::BITSET),
        };

        Scope {
            symbols,
            labels: self.labels,
            function_labels: self.function_labels.clone(),
            warnings: self.warnings,
            mode,
            link,
            path: self.path.clone(),
            config: Rc::clone(&self.config),
            exports: Vec::new(),
            body: Fragment::new(),
            functions: Fragment::new(),
        }
    }

    /// Fold a finished child back into this scope.
    ///
    /// The parent adopts the child's cursors, label counter and warning
    /// count, and appends the child's function definitions to its own. What
    /// else comes back depends on the child's link. Returns the child's body
    /// for the caller to place.
    pub fn sync(&mut self, mut child: Scope) -> Fragment {
        self.labels = child.labels;
        self.function_labels = std::mem::take(&mut child.function_labels);
        self.warnings = child.warnings;
        self.functions.extend(child.functions.take());

        match child.link {
            ScopeLink::Shared => {
                self.symbols = std::mem::take(&mut child.symbols);
                self.exports.append(&mut child.exports);
            }
            link if link.merges_back() => {
                self.symbols.adopt_cursors(&child.symbols);
                for export in &child.exports {
                    child.copy_export(export, &mut self.symbols);
                }
                self.exports.append(&mut child.exports);
            }
            _ => self.symbols.adopt_cursors(&child.symbols),
        }

        child.body.take()
    }

    /// The functions and namespaces declared directly in this scope, without
    /// anything it inherited from its parent.
    pub fn exported_symbols(&self) -> SymbolArena {
        let mut symbols = SymbolArena::new(self.next_address(), self.next_data_address());
        for export in &self.exports {
            self.copy_export(export, &mut symbols);
        }
        symbols
    }

    fn copy_export(&self, export: &Export, target: &mut SymbolArena) {
        match export {
            Export::Function(name) => {
                if let Some(function) = self.symbols.function(name) {
                    target.insert_function(name.clone(), Rc::clone(function));
                }
            }
            Export::Namespace(name) => {
                if let Some(namespace) = self.symbols.namespace(name) {
                    target.insert_namespace(name.clone(), Rc::clone(namespace));
                }
            }
        }
    }

    // ========================================================================
    // Running
    // ========================================================================

    /// Compile statements into this scope's streams.
    ///
    /// Function definitions go to the function stream, directives produce
    /// nothing, everything else goes to the body.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&mut self, stmts: &[Stmt<'_>]) -> Result<()> {
        for stmt in stmts {
            let fragment = StmtCompiler::new(self, stmt.span()).compile(stmt)?;
            match stmt.kind().class() {
                NodeClass::Statement => self.body.extend(fragment),
                NodeClass::Definition => self.functions.extend(fragment),
                NodeClass::Directive => {}
            }
        }
        Ok(())
    }

    /// Append to the body stream directly.
    pub(crate) fn push_body(&mut self, fragment: Fragment) {
        self.body.extend(fragment);
    }

    /// Finish compilation, keeping the streams and final symbols.
    pub fn finish(self) -> CompiledProgram {
        CompiledProgram::new(
            self.body,
            self.functions,
            self.symbols,
            self.warnings,
            self.config.comments(),
        )
    }
}
