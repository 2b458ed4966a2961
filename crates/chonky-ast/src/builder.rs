//! Arena-backed construction of AST nodes.
//!
//! The parser front end and the test suites both build trees through
//! [`AstBuilder`], which copies names and child slices into the arena so the
//! resulting nodes share the arena's `'ast` lifetime.

use bumpalo::Bump;
use chonky_core::{ScalarType, Span, ValueType};

use crate::expr::{BinaryExpr, Condition, Expr, IndexExpr};
use crate::ops::{BinaryOp, Comparison};
use crate::stmt::{
    AdvancedWrite, CallStmt, Directive, DirectiveKind, EmbedStmt, ForStmt, FunctionDecl, IfStmt,
    IncludeStmt, IndexAssign, ListDecl, NamespaceDecl, Param, Reassign, Stmt, VarDecl, WhileStmt,
};

/// Builds AST nodes inside a [`Bump`] arena.
#[derive(Clone, Copy)]
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self { arena }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Copy a statement list into the arena.
    pub fn program(&self, stmts: &[Stmt<'ast>]) -> &'ast [Stmt<'ast>] {
        self.arena.alloc_slice_copy(stmts)
    }

    fn name(&self, name: &str) -> &'ast str {
        self.arena.alloc_str(name)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn int(&self, value: i64) -> Expr<'ast> {
        Expr::Int(value)
    }

    pub fn hex(&self, value: u32) -> Expr<'ast> {
        Expr::Hex(value)
    }

    pub fn char(&self, code: u8) -> Expr<'ast> {
        Expr::Char(code)
    }

    pub fn string(&self, text: &str) -> Expr<'ast> {
        Expr::Str(self.name(text))
    }

    pub fn ident(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(self.name(name))
    }

    pub fn list(&self, items: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::List(self.arena.alloc_slice_copy(items))
    }

    pub fn index(&self, list: &str, index: Expr<'ast>) -> Expr<'ast> {
        Expr::Index(self.arena.alloc(IndexExpr {
            list: self.name(list),
            index,
        }))
    }

    pub fn address_of(&self, name: &str) -> Expr<'ast> {
        Expr::AddressOf(self.name(name))
    }

    pub fn deref(&self, name: &str) -> Expr<'ast> {
        Expr::Deref(self.name(name))
    }

    pub fn binary(&self, op: BinaryOp, lhs: Expr<'ast>, rhs: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr { op, lhs, rhs }))
    }

    pub fn cond(&self, op: Comparison, lhs: Expr<'ast>, rhs: Expr<'ast>) -> Condition<'ast> {
        Condition { op, lhs, rhs }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn var_decl(
        &self,
        line: u32,
        ty: impl Into<ValueType>,
        name: &str,
        value: Expr<'ast>,
    ) -> Stmt<'ast> {
        Stmt::VarDecl(self.arena.alloc(VarDecl {
            ty: ty.into(),
            name: self.name(name),
            value,
            span: Span::new(line),
        }))
    }

    pub fn list_decl(
        &self,
        line: u32,
        name: &str,
        element: Option<ScalarType>,
        len: Option<u32>,
        value: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::ListDecl(self.arena.alloc(ListDecl {
            name: self.name(name),
            element,
            len,
            value,
            span: Span::new(line),
        }))
    }

    pub fn reassign(&self, line: u32, name: &str, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Reassign(self.arena.alloc(Reassign {
            name: self.name(name),
            value,
            span: Span::new(line),
        }))
    }

    pub fn index_assign(
        &self,
        line: u32,
        name: &str,
        index: Expr<'ast>,
        value: Expr<'ast>,
    ) -> Stmt<'ast> {
        Stmt::IndexAssign(self.arena.alloc(IndexAssign {
            name: self.name(name),
            index,
            value,
            span: Span::new(line),
        }))
    }

    pub fn if_stmt(
        &self,
        line: u32,
        condition: Condition<'ast>,
        then_body: &[Stmt<'ast>],
        else_body: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_body: self.program(then_body),
            else_body: else_body.map(|body| self.program(body)),
            span: Span::new(line),
        }))
    }

    pub fn while_stmt(
        &self,
        line: u32,
        condition: Condition<'ast>,
        body: &[Stmt<'ast>],
    ) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body: self.program(body),
            span: Span::new(line),
        }))
    }

    pub fn for_stmt(
        &self,
        line: u32,
        var: &str,
        iterable: &str,
        body: &[Stmt<'ast>],
    ) -> Stmt<'ast> {
        Stmt::For(self.arena.alloc(ForStmt {
            var: self.name(var),
            iterable: self.name(iterable),
            body: self.program(body),
            span: Span::new(line),
        }))
    }

    pub fn param(&self, name: &str, ty: impl Into<ValueType>) -> Param<'ast> {
        Param {
            name: self.name(name),
            ty: ty.into(),
        }
    }

    pub fn function(
        &self,
        line: u32,
        name: &str,
        params: &[Param<'ast>],
        body: &[Stmt<'ast>],
    ) -> Stmt<'ast> {
        Stmt::FunctionDecl(self.arena.alloc(FunctionDecl {
            name: self.name(name),
            params: self.arena.alloc_slice_copy(params),
            body: self.program(body),
            span: Span::new(line),
        }))
    }

    pub fn call(&self, line: u32, name: &str, args: &[Expr<'ast>]) -> Stmt<'ast> {
        self.make_call(line, None, name, args)
    }

    /// `namespace::name(args)`
    pub fn qualified_call(
        &self,
        line: u32,
        namespace: &str,
        name: &str,
        args: &[Expr<'ast>],
    ) -> Stmt<'ast> {
        self.make_call(line, Some(namespace), name, args)
    }

    fn make_call(
        &self,
        line: u32,
        namespace: Option<&str>,
        name: &str,
        args: &[Expr<'ast>],
    ) -> Stmt<'ast> {
        Stmt::Call(self.arena.alloc(CallStmt {
            namespace: namespace.map(|ns| self.name(ns)),
            name: self.name(name),
            args: self.arena.alloc_slice_copy(args),
            span: Span::new(line),
        }))
    }

    pub fn namespace(&self, line: u32, name: &str, body: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Namespace(self.arena.alloc(NamespaceDecl {
            name: self.name(name),
            body: self.program(body),
            span: Span::new(line),
        }))
    }

    pub fn embed(&self, line: u32, code: &str) -> Stmt<'ast> {
        Stmt::Embed(self.arena.alloc(EmbedStmt {
            code: self.name(code),
            span: Span::new(line),
        }))
    }

    pub fn include(&self, line: u32, path: &str, body: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Include(self.arena.alloc(IncludeStmt {
            path: self.name(path),
            body: self.program(body),
            span: Span::new(line),
        }))
    }

    pub fn advanced_write(
        &self,
        line: u32,
        address: u32,
        ty: ScalarType,
        value: Expr<'ast>,
    ) -> Stmt<'ast> {
        Stmt::AdvancedWrite(self.arena.alloc(AdvancedWrite {
            address,
            ty,
            value,
            span: Span::new(line),
        }))
    }

    pub fn directive(&self, line: u32, kind: DirectiveKind, address: u32) -> Stmt<'ast> {
        Stmt::Directive(Directive {
            kind,
            address,
            span: Span::new(line),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn builds_nested_statements() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.if_stmt(
            3,
            ast.cond(Comparison::Greater, ast.ident("a"), ast.ident("b")),
            &[ast.var_decl(4, ScalarType::Int, "c", ast.int(1))],
            Some(&[ast.var_decl(6, ScalarType::Int, "c", ast.int(2))]),
        );

        assert_eq!(stmt.kind(), NodeKind::Conditional);
        assert_eq!(stmt.span(), Span::new(3));
        let Stmt::If(if_stmt) = stmt else {
            panic!("expected if statement");
        };
        assert_eq!(if_stmt.then_body.len(), 1);
        assert_eq!(if_stmt.else_body.map(<[_]>::len), Some(1));
    }

    #[test]
    fn directive_kind_maps_to_node_kind() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let stmt = ast.directive(1, DirectiveKind::Bitdata, 0x2000_0000);
        assert_eq!(stmt.kind(), NodeKind::Bitdata);
    }

    #[test]
    fn names_live_in_arena() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let owned = String::from("counter");
        let expr = ast.ident(&owned);
        drop(owned);
        assert_eq!(expr, Expr::Ident("counter"));
    }
}
