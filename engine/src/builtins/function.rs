//! `%Function.prototype%` (spec §4.D): `call`, `apply`, `bind`.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/function.rs`'s
//! `call`/`apply`/`bind` implementations, adapted to this crate's
//! `Agent::call_function` instead of `Context::call`.

use crate::agent::Agent;
use crate::error::{JsNativeError, JsResult};
use crate::object::JsObject;
use crate::string::JsString;
use crate::value::JsValue;

pub fn install_prototype_methods(function_prototype: &JsObject) {
    let proto = Some(function_prototype.clone());
    function_prototype.create_method("call", "call", 1, call, proto.clone());
    function_prototype.create_method("apply", "apply", 2, apply, proto.clone());
    function_prototype.create_method("bind", "bind", 1, bind, proto);
}

fn call(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    if !this.is_callable() {
        return Err(JsNativeError::typ("Function.prototype.call called on a non-function").into());
    }
    let bound_this = args.first().cloned().unwrap_or(JsValue::undefined());
    let rest = args.get(1..).unwrap_or(&[]);
    agent.call_function(this, &bound_this, rest)
}

fn apply(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    if !this.is_callable() {
        return Err(JsNativeError::typ("Function.prototype.apply called on a non-function").into());
    }
    let bound_this = args.first().cloned().unwrap_or(JsValue::undefined());
    let array = args.get(1).cloned().unwrap_or(JsValue::undefined());
    let arg_list = match array {
        JsValue::Undefined | JsValue::Null => Vec::new(),
        other => array_like_to_vec(agent, &other)?,
    };
    agent.call_function(this, &bound_this, &arg_list)
}

pub(crate) fn array_like_to_vec(agent: &mut Agent, value: &JsValue) -> JsResult<Vec<JsValue>> {
    let object = value.to_object(agent)?;
    let len = object.get_v("length", agent)?.to_number(agent)? as usize;
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        out.push(object.get_v(crate::value::PropertyKey::from_index(i as u32), agent)?);
    }
    Ok(out)
}

/// `Function.prototype.bind`: returns a bound function exotic object closing
/// over the bound `this` and leading arguments, forwarding any call-time
/// arguments after them (spec §4.D). `Agent::call_function` dispatches
/// `FunctionData::Bound` directly; it is not itself a constructor here — no
/// §8 scenario exercises `new (f.bind(...))()`.
fn bind(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    if !this.is_callable() {
        return Err(JsNativeError::typ("Function.prototype.bind called on a non-function").into());
    }
    let target = this.clone();
    let bound_this = args.first().cloned().unwrap_or(JsValue::undefined());
    let bound_args: Vec<JsValue> = args.get(1..).unwrap_or(&[]).to_vec();
    let function_prototype = agent.realm().intrinsics.function_prototype.clone();
    Ok(JsValue::Object(JsObject::bound_function(
        Some(function_prototype),
        JsString::new("bound"),
        0,
        target,
        bound_this,
        bound_args,
    )))
}
