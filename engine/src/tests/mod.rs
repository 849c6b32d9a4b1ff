//! End-to-end coverage driving the whole pipeline — hand-built [`Script`]
//! ASTs through [`Agent::run`] — plus targeted unit tests for the
//! lower-level invariants spec §8 calls out directly.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/tests/mod.rs`'s
//! `TestAction`/`run_test_actions` harness, adapted to a crate with no
//! parser: `boa`'s actions carry source text compiled fresh by the shared
//! `Context`; this crate's actions carry already-built [`Script`]s, since
//! building one needs `&mut Interner` (via [`crate::ast::builder::Builder`])
//! while `Agent` borrows the same `Interner` immutably for its entire
//! lifetime. Every action's `Script` is therefore built up front, against one
//! `Interner` the caller hands in, before that `Interner` is borrowed to
//! construct the `Agent` that runs them.

use crate::agent::{Agent, RunOutcome};
use crate::ast::Script;
use crate::error::JsNativeErrorKind;
use crate::value::JsValue;
use boa_interner::Interner;

mod invariants;
mod scenarios;

/// One step of a test: run a script and either ignore the result, assert it
/// strictly equals an expected value, or assert it threw a particular kind
/// of native error with a particular message.
pub enum TestAction {
    Run(Script),
    AssertEq(Script, JsValue),
    AssertNativeError(Script, JsNativeErrorKind, &'static str),
    /// Drains the microtask queue (spec §6 `blockUntilEmpty`), for scenarios
    /// that observe a `Promise` reaction from a later action.
    RunJobs,
}

impl TestAction {
    pub fn run(script: Script) -> Self {
        Self::Run(script)
    }

    pub fn assert_eq(script: Script, expected: impl Into<JsValue>) -> Self {
        Self::AssertEq(script, expected.into())
    }

    pub fn assert_native_error(script: Script, kind: JsNativeErrorKind, message: &'static str) -> Self {
        Self::AssertNativeError(script, kind, message)
    }
}

/// Runs every action against one freshly constructed [`Agent`], in order,
/// panicking with a descriptive message on the first mismatch. A single
/// `Agent` is shared across all actions so later actions can observe state
/// (globals, closures over module-level `let`s) earlier ones left behind,
/// the same cross-action hoisting boa's own harness supports.
pub fn run_test_actions(interner: &Interner, actions: impl IntoIterator<Item = TestAction>) {
    let mut agent = Agent::new(interner);
    for (i, action) in actions.into_iter().enumerate() {
        match action {
            TestAction::Run(script) => match agent.run(&script, interner) {
                RunOutcome::Success(_) => {}
                other => panic!("action {i}: expected script to run to completion, got {other:?}"),
            },
            TestAction::AssertEq(script, expected) => match agent.run(&script, interner) {
                RunOutcome::Success(value) => assert!(
                    JsValue::strictly_equals(&value, &expected),
                    "action {i}: expected {expected:?}, got {value:?}"
                ),
                other => panic!("action {i}: expected {expected:?}, got {other:?}"),
            },
            TestAction::AssertNativeError(script, kind, message) => {
                match agent.run(&script, interner) {
                    RunOutcome::RuntimeError(thrown) => {
                        assert_native_error(&mut agent, &thrown, kind, message, i);
                    }
                    other => panic!("action {i}: expected a thrown error, got {other:?}"),
                }
            }
            TestAction::RunJobs => agent.run_jobs(),
        }
    }
}

fn assert_native_error(
    agent: &mut Agent,
    thrown: &JsValue,
    kind: JsNativeErrorKind,
    message: &str,
    action_index: usize,
) {
    let object = thrown
        .as_object()
        .unwrap_or_else(|| panic!("action {action_index}: thrown value {thrown:?} is not an object"));
    let name = object
        .get_v("name", agent)
        .ok()
        .and_then(|v| v.as_string().map(|s| s.to_std_string_lossy()))
        .unwrap_or_default();
    assert_eq!(name, native_error_name(kind), "action {action_index}: wrong error name");
    let actual_message = object
        .get_v("message", agent)
        .ok()
        .and_then(|v| v.as_string().map(|s| s.to_std_string_lossy()))
        .unwrap_or_default();
    assert_eq!(actual_message, message, "action {action_index}: wrong error message");
}

fn native_error_name(kind: JsNativeErrorKind) -> &'static str {
    match kind {
        JsNativeErrorKind::Error => "Error",
        JsNativeErrorKind::Type => "TypeError",
        JsNativeErrorKind::Range => "RangeError",
        JsNativeErrorKind::Reference => "ReferenceError",
        JsNativeErrorKind::Syntax => "SyntaxError",
        JsNativeErrorKind::Eval => "EvalError",
        JsNativeErrorKind::Uri => "URIError",
    }
}
