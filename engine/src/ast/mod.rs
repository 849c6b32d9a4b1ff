//! The abstract syntax tree this engine's bytecode compiler consumes.
//!
//! The parser that produces these trees is an external collaborator (see
//! `SPEC_FULL.md` §1/§6): this module only defines the node shapes the
//! compiler is allowed to assume. No lexing or parsing happens in this crate.
//! Identifiers are left unresolved (`Sym` only) — binding resolution, slot
//! assignment, and the temporal-dead-zone analysis described in spec §4.F
//! happen in [`crate::bytecompiler::scope`], the same division of labor
//! `boa_ast`/`boa`'s bytecompiler use.

mod class;
mod expression;
mod function;
mod statement;
pub mod builder;

pub use class::{Class, ClassElementKind, ClassMethod, MethodKind};
pub use expression::{
    ArrayElement, AssignOp, BinaryOp, Expression, Literal, LogicalOp, MemberKey,
    ObjectProperty, PropertyName, TemplateLiteral, UnaryOp, UpdateOp,
};
pub use function::{BindingTarget, Function, FunctionKind, Parameter, Parameters};
pub use statement::{
    ForInit, ForTarget, Statement, SwitchCase, VarDeclarator, VarKind,
};

use boa_interner::Sym;

/// A parsed, but not yet scope-resolved, top-level program.
#[derive(Debug, Clone)]
pub struct Script {
    pub body: Vec<Statement>,
    pub is_strict: bool,
}

/// A single formal/actual label used by `break`/`continue`.
pub type Label = Sym;
