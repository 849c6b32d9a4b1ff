//! Promise internal state (spec §4.D, minimal microtask-driven surface).
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/promise/mod.rs`'s
//! `PromiseState`/reaction-record split, trimmed to what `resolve`/`reject`/
//! `then` need — no `allSettled`/`race`/`any` (out of scope per SPEC_FULL.md
//! §4.D).

use crate::object::JsObject;
use crate::value::JsValue;
use boa_gc::{Finalize, Trace};

#[derive(Trace, Finalize, Clone)]
pub enum PromiseState {
    Pending,
    Fulfilled(JsValue),
    Rejected(JsValue),
}

/// One `.then()` registration: the handler to run once the promise settles
/// (`None` means "pass the value/reason through unchanged", used when
/// adopting another promise's state) and the promise its outcome settles.
#[derive(Trace, Finalize)]
pub struct Reaction {
    pub handler: Option<JsValue>,
    pub result: JsObject,
}

#[derive(Trace, Finalize)]
pub struct PromiseData {
    pub state: PromiseState,
    pub fulfill_reactions: Vec<Reaction>,
    pub reject_reactions: Vec<Reaction>,
}

impl PromiseData {
    pub fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
        }
    }
}

impl Default for PromiseData {
    fn default() -> Self {
        Self::new()
    }
}
