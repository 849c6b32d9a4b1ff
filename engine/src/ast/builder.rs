//! Tiny hand-written node constructors for this crate's own unit tests.
//!
//! There is no parser in this crate (see `SPEC_FULL.md` §1/§6): every other
//! `ast` module only defines node *shapes* an external parser is assumed to
//! produce. Tests still need *some* way to build a [`super::Script`], so this
//! module provides the minimum set of constructors exercised by
//! `crate::tests`, interning identifiers/strings through a caller-owned
//! [`Interner`] the same way a real parser would.

use super::{
    ArrayElement, AssignOp, BinaryOp, BindingTarget, Class, ClassElementKind, ClassMethod,
    Expression, Function, FunctionKind, Literal, MemberKey, MethodKind, Parameter, Parameters,
    Script, Statement, VarDeclarator, VarKind,
};
use boa_interner::{Interner, Sym};
use std::rc::Rc;

pub struct Builder<'a> {
    interner: &'a mut Interner,
}

impl<'a> Builder<'a> {
    pub fn new(interner: &'a mut Interner) -> Self {
        Self { interner }
    }

    pub fn sym(&mut self, name: &str) -> Sym {
        self.interner.get_or_intern(name)
    }

    pub fn script(body: Vec<Statement>, is_strict: bool) -> Script {
        Script { body, is_strict }
    }

    // --- expressions ---

    pub fn ident(&mut self, name: &str) -> Expression {
        Expression::Identifier(self.sym(name))
    }

    pub fn num(n: f64) -> Expression {
        Expression::Literal(Literal::Num(n))
    }

    pub fn boolean(b: bool) -> Expression {
        Expression::Literal(Literal::Bool(b))
    }

    pub fn undefined() -> Expression {
        Expression::Literal(Literal::Undefined)
    }

    pub fn null() -> Expression {
        Expression::Literal(Literal::Null)
    }

    pub fn string(&mut self, s: &str) -> Expression {
        Expression::Literal(Literal::Str(self.sym(s)))
    }

    pub fn bin(op: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn unary(op: super::UnaryOp, argument: Expression) -> Expression {
        Expression::Unary(op, Box::new(argument))
    }

    pub fn update(op: super::UpdateOp, prefix: bool, target: Expression) -> Expression {
        Expression::Update { op, prefix, target: Box::new(target) }
    }

    pub fn assign(target: Expression, value: Expression) -> Expression {
        Expression::Assign { op: AssignOp::Assign, target: Box::new(target), value: Box::new(value) }
    }

    pub fn conditional(test: Expression, consequent: Expression, alternate: Expression) -> Expression {
        Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::Call { callee: Box::new(callee), arguments, optional: false }
    }

    pub fn new_expr(callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::New { callee: Box::new(callee), arguments }
    }

    pub fn member(object: Expression, name: Sym) -> Expression {
        Expression::Member { object: Box::new(object), key: MemberKey::Named(name), optional: false }
    }

    pub fn member_computed(object: Expression, key: Expression) -> Expression {
        Expression::Member {
            object: Box::new(object),
            key: MemberKey::Computed(Box::new(key)),
            optional: false,
        }
    }

    pub fn array(elements: Vec<Expression>) -> Expression {
        Expression::ArrayLiteral(elements.into_iter().map(|e| Some(ArrayElement::Item(e))).collect())
    }

    pub fn arrow(parameters: Parameters, body: Vec<Statement>) -> Expression {
        Expression::ArrowFunction(Rc::new(Function {
            name: None,
            parameters,
            body,
            kind: FunctionKind::Normal,
            is_arrow: true,
            is_strict: false,
        }))
    }

    pub fn function_expr(
        name: Option<Sym>,
        parameters: Parameters,
        body: Vec<Statement>,
        kind: FunctionKind,
    ) -> Expression {
        Expression::Function(Rc::new(Function {
            name,
            parameters,
            body,
            kind,
            is_arrow: false,
            is_strict: false,
        }))
    }

    pub fn class_expr(
        name: Option<Sym>,
        super_class: Option<Expression>,
        constructor: Option<Rc<Function>>,
        elements: Vec<ClassElementKind>,
    ) -> Expression {
        Expression::Class(Rc::new(Class { name, super_class, constructor, elements }))
    }

    pub fn method(
        key: Sym,
        kind: MethodKind,
        is_static: bool,
        parameters: Parameters,
        body: Vec<Statement>,
    ) -> ClassElementKind {
        ClassElementKind::Method(ClassMethod {
            key: MemberKey::Named(key),
            kind,
            is_static,
            function: Rc::new(Function {
                name: Some(key),
                parameters,
                body,
                kind: FunctionKind::Normal,
                is_arrow: false,
                is_strict: false,
            }),
        })
    }

    // --- parameters ---

    pub fn param(name: Sym) -> Parameter {
        Parameter { target: BindingTarget::Identifier(name), default: None }
    }

    pub fn params(names: Vec<Sym>) -> Parameters {
        Parameters { bindings: names.into_iter().map(Self::param).collect(), rest: None }
    }

    // --- statements ---

    pub fn expr_stmt(expr: Expression) -> Statement {
        Statement::Expression(expr)
    }

    pub fn var_decl(kind: VarKind, name: Sym, init: Option<Expression>) -> Statement {
        Statement::VarDecl(
            kind,
            vec![VarDeclarator { target: BindingTarget::Identifier(name), init }],
        )
    }

    pub fn block(body: Vec<Statement>) -> Statement {
        Statement::Block(body)
    }

    pub fn if_stmt(test: Expression, consequent: Statement, alternate: Option<Statement>) -> Statement {
        Statement::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    pub fn while_stmt(test: Expression, body: Statement) -> Statement {
        Statement::While { test, body: Box::new(body) }
    }

    pub fn for_stmt(
        init: Option<super::ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Statement,
    ) -> Statement {
        Statement::For { init, test, update, body: Box::new(body) }
    }

    pub fn for_of(left: super::ForTarget, right: Expression, body: Statement) -> Statement {
        Statement::ForOf { left, right, body: Box::new(body), is_await: false }
    }

    pub fn for_in(left: super::ForTarget, right: Expression, body: Statement) -> Statement {
        Statement::ForIn { left, right, body: Box::new(body) }
    }

    pub fn return_stmt(expr: Option<Expression>) -> Statement {
        Statement::Return(expr)
    }

    pub fn throw_stmt(expr: Expression) -> Statement {
        Statement::Throw(expr)
    }

    pub fn try_stmt(
        block: Vec<Statement>,
        handler: Option<(Option<Sym>, Vec<Statement>)>,
        finally: Option<Vec<Statement>>,
    ) -> Statement {
        Statement::Try {
            block,
            handler: handler.map(|(name, body)| (name.map(BindingTarget::Identifier), body)),
            finally,
        }
    }

    pub fn function_decl(
        name: Sym,
        parameters: Parameters,
        body: Vec<Statement>,
        kind: FunctionKind,
    ) -> Statement {
        Statement::FunctionDecl(Rc::new(Function {
            name: Some(name),
            parameters,
            body,
            kind,
            is_arrow: false,
            is_strict: false,
        }))
    }

    pub fn class_decl(
        name: Sym,
        super_class: Option<Expression>,
        constructor: Option<Rc<Function>>,
        elements: Vec<ClassElementKind>,
    ) -> Statement {
        Statement::ClassDecl(Rc::new(Class { name: Some(name), super_class, constructor, elements }))
    }
}
