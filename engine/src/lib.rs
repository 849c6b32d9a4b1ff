//! An ECMAScript bytecode compiler, stack-based interpreter, and object
//! model (see `SPEC_FULL.md`).
//!
//! The crate is organized the way `examples/boa-dev-boa/boa_engine` is: a
//! source-independent AST in, a validated bytecode `FunctionInfo` out of
//! [`bytecompiler`], and an [`agent::Agent`] that drives the [`vm`] against
//! a [`realm::Realm`]'s object graph. Unlike `boa_engine`, there is no
//! lexer/parser here at all — [`ast`] is the contract an external parser is
//! expected to produce (see [`ast::builder`] for the tiny constructors this
//! crate's own tests use in place of one).

pub mod agent;
pub mod ast;
pub mod bigint;
pub mod builtins;
pub mod bytecompiler;
pub mod demos;
pub mod environments;
pub mod error;
pub mod ir;
pub mod object;
pub mod property;
pub mod realm;
pub mod string;
pub mod symbol;
pub mod value;
pub mod vm;

#[cfg(test)]
mod tests;

pub use agent::{Agent, RunOutcome};
pub use error::JsResult;
