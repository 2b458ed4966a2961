//! Statement compiler.
//!
//! The [`StmtCompiler`] turns one statement into a [`Fragment`], handling:
//! - Scalar, pointer and list declarations, reassignments, element writes
//! - If/else and while, with branch labels from the scope's counter
//! - Compile-time for loops, unrolled into the enclosing scope
//! - Function declarations and calls, including the `putchar` builtin
//! - Namespaces, included units and embedded assembly
//! - Raw memory writes and base-address directives
//!
//! Nested blocks run in child scopes forked from the active one and synced
//! back before the handler returns.
//!
//! # Example
//!
//! ```ignore
//! let fragment = StmtCompiler::new(&mut scope, stmt.span()).compile(&stmt)?;
//! ```

mod assign;
mod call;
mod directive;
mod embed;
mod for_stmt;
mod function;
mod if_stmt;
mod list;
mod namespace;
mod while_stmt;

use chonky_ast::{Comparison, Condition, Stmt};
use chonky_core::{ScalarType, Span};

use crate::Result;
use crate::emit::Fragment;
use crate::expr::ExprCompiler;
use crate::ir::{BranchCond, Reg};
use crate::scope::Scope;

/// Compiles statements against a scope.
pub struct StmtCompiler<'s> {
    scope: &'s mut Scope,
    /// Span of the statement being compiled.
    span: Span,
}

impl<'s> StmtCompiler<'s> {
    pub fn new(scope: &'s mut Scope, span: Span) -> Self {
        Self { scope, span }
    }

    /// Compile one statement.
    pub fn compile(&mut self, stmt: &Stmt<'_>) -> Result<Fragment> {
        match *stmt {
            Stmt::VarDecl(decl) => self.compile_var_decl(decl),
            Stmt::ListDecl(decl) => self.compile_list_decl(decl),
            Stmt::Reassign(reassign) => self.compile_reassign(reassign),
            Stmt::IndexAssign(assign) => self.compile_index_assign(assign),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
            Stmt::FunctionDecl(decl) => self.compile_function(decl),
            Stmt::Call(call) => self.compile_call(call),
            Stmt::Namespace(decl) => self.compile_namespace(decl),
            Stmt::Embed(embed) => self.compile_embed(embed),
            Stmt::Include(include) => self.compile_include(include),
            Stmt::AdvancedWrite(write) => self.compile_advanced_write(write),
            Stmt::Directive(directive) => self.compile_directive(&directive),
        }
    }

    fn expr(&self) -> ExprCompiler<'_> {
        ExprCompiler::new(&*self.scope, self.span)
    }

    /// Load both operands of a condition into r26 and r30 and branch to
    /// `target` when the condition does not hold.
    fn compile_condition(&self, condition: &Condition<'_>, target: Reg) -> Result<Fragment> {
        let label = format!("condition ({})", condition.op);
        let expr = self.expr();

        let mut code = Fragment::new();
        code.extend(expr.load_into(&label, ScalarType::Int, &condition.lhs, Reg::CMP_LHS)?);
        code.extend(expr.load_into(&label, ScalarType::Int, &condition.rhs, Reg::CMP_RHS)?);
        code.branch(
            branch_unless(condition.op),
            target,
            Reg::CMP_LHS,
            Reg::CMP_RHS,
        );
        Ok(code)
    }
}

/// The branch taken when `op` is false.
///
/// `<` and `>` branch on the strict opposite, so equal operands fall
/// through into the body.
fn branch_unless(op: Comparison) -> BranchCond {
    match op {
        Comparison::Equal => BranchCond::NotEqual,
        Comparison::NotEqual => BranchCond::Equal,
        Comparison::Less => BranchCond::Greater,
        Comparison::Greater => BranchCond::Less,
    }
}
