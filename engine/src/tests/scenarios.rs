//! The end-to-end scenarios `SPEC_FULL.md` §8 calls out by name: a script
//! each, run through the whole compile-then-interpret pipeline.
//!
//! The scripts themselves live in [`crate::demos`] — `cli --demo <name>`
//! runs the exact same ones — since there's no parser to build them from
//! source text (see `super`'s module doc comment). Each ends in an explicit
//! `return <expr>;`: a top-level script always completes with `undefined`
//! otherwise (`compile_script` unconditionally appends `PushUndefined;
//! Return`), so `return` is the only way to surface a value from `Agent::run`.

use super::{run_test_actions, TestAction};
use crate::demos;

#[test]
fn recursive_named_function_expression() {
    let (interner, script) = demos::fibonacci();
    run_test_actions(&interner, [TestAction::assert_eq(script, 55.0)]);
}

#[test]
fn per_iteration_let_binding_captured_by_closure() {
    let (interner, script) = demos::per_iteration_closures();
    run_test_actions(&interner, [TestAction::assert_eq(script, "0,1,2")]);
}

#[test]
fn frozen_object_rejects_new_property() {
    let (interner, script) = demos::frozen_object();
    run_test_actions(&interner, [TestAction::assert_eq(script, false)]);
}

#[test]
fn derived_class_super_method_call() {
    let (interner, script) = demos::derived_class_super();
    run_test_actions(&interner, [TestAction::assert_eq(script, 3.0)]);
}

#[test]
fn promise_reaction_runs_on_microtask_checkpoint() {
    let (interner, before, after) = demos::promise_reaction();
    run_test_actions(
        &interner,
        [
            TestAction::assert_eq(before, 0.0),
            TestAction::RunJobs,
            TestAction::assert_eq(after, 1.0),
        ],
    );
}

#[test]
fn member_access_on_null_throws_type_error_caught_by_instanceof() {
    let (interner, script) = demos::null_deref_type_error();
    run_test_actions(&interner, [TestAction::assert_eq(script, true)]);
}
