//! `%Generator.prototype%` (spec §4.G): `next`, `return`.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/generator.rs`'s
//! `GeneratorState`-driven `next`/`return`/`throw`, trimmed to the two
//! methods `SPEC_FULL.md` names (no `.throw()` — resuming a generator with an
//! exception injected at the suspended `yield` has no surface syntax that
//! reaches it in this engine, see `DESIGN.md`).

use crate::agent::Agent;
use crate::error::{JsNativeError, JsResult};
use crate::object::JsObject;
use crate::value::JsValue;
use crate::vm::{self, FrameOutcome};

pub fn install_prototype_methods(generator_prototype: &JsObject, function_prototype: &JsObject) {
    let proto = Some(function_prototype.clone());
    generator_prototype.create_method("next", "next", 1, next, proto.clone());
    generator_prototype.create_method("return", "return", 1, return_method, proto);
}

/// The iterator-protocol entry point `Opcode::IteratorNext` calls directly
/// for `for-of`/spread over a generator — equivalent to `.next(undefined)`,
/// since neither surface form can supply a resume value.
pub fn next_value(agent: &mut Agent, object: &JsObject) -> JsResult<(JsValue, bool)> {
    resume(agent, object, JsValue::undefined())
}

fn next(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = generator_of(this)?;
    let resume_value = args.first().cloned().unwrap_or(JsValue::undefined());
    let (value, done) = resume(agent, &object, resume_value)?;
    Ok(iter_result(agent, value, done))
}

/// `%Generator.prototype%.return` (spec §4.G): closes the generator without
/// resuming its body — any `try`/`finally` still inside the suspended frame
/// is simply discarded rather than run, a deliberate simplification (see
/// `DESIGN.md`) since driving that would need a second, exception-like
/// unwind path through `vm::run_frame` that nothing else needs.
fn return_method(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = generator_of(this)?;
    let value = args.first().cloned().unwrap_or(JsValue::undefined());
    object.with_generator_data(|data| data.frame = None);
    Ok(iter_result(agent, value, true))
}

fn generator_of(this: &JsValue) -> JsResult<JsObject> {
    this.as_object()
        .filter(|o| o.is_generator())
        .cloned()
        .ok_or_else(|| JsNativeError::typ("not a generator").into())
}

/// Resumes `object`'s suspended frame, or reports `{done: true}` immediately
/// if it already ran to completion or was closed by `.return()`. The very
/// first resume (the frame's `pc` is still `0`) never pushes `resume_value`:
/// there is no suspended `Yield` expression yet to receive it, matching spec
/// §4.G "the argument to the first `next()` call is always ignored".
fn resume(agent: &mut Agent, object: &JsObject, resume_value: JsValue) -> JsResult<(JsValue, bool)> {
    let Some(mut frame) = object.with_generator_data(|data| data.frame.take()).flatten() else {
        return Ok((JsValue::undefined(), true));
    };
    let push = if frame.pc == 0 { None } else { Some(resume_value) };
    match vm::run_frame(&mut frame, agent, push) {
        Ok(FrameOutcome::Return(value)) => {
            object.with_generator_data(|data| data.frame = None);
            Ok((value, true))
        }
        Ok(FrameOutcome::Yield(value)) => {
            object.with_generator_data(|data| data.frame = Some(frame));
            Ok((value, false))
        }
        Err(err) => {
            object.with_generator_data(|data| data.frame = None);
            Err(err)
        }
    }
}

fn iter_result(agent: &mut Agent, value: JsValue, done: bool) -> JsValue {
    let result = agent.realm().new_object();
    result.create_data_property("value", value);
    result.create_data_property("done", done);
    JsValue::Object(result)
}
