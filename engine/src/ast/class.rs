use super::{Expression, Function, MemberKey};
use boa_interner::Sym;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Normal,
    Get,
    Set,
    Generator,
    Async,
    AsyncGenerator,
}

#[derive(Debug, Clone)]
pub struct ClassMethod {
    pub key: MemberKey,
    pub kind: MethodKind,
    pub is_static: bool,
    pub function: Rc<Function>,
}

#[derive(Debug, Clone)]
pub enum ClassElementKind {
    Method(ClassMethod),
    /// A class field; out of scope for lowering (no instance-field
    /// initializer opcode exists), parsed for AST completeness only.
    Field {
        key: MemberKey,
        is_static: bool,
        value: Option<Expression>,
    },
}

/// A `class` declaration or expression.
///
/// Mirrors `boa_ast::function::class::Class`
/// (`examples/boa-dev-boa/boa_ast/src/function/class.rs`).
#[derive(Debug, Clone)]
pub struct Class {
    pub name: Option<Sym>,
    pub super_class: Option<Expression>,
    pub constructor: Option<Rc<Function>>,
    pub elements: Vec<ClassElementKind>,
}
