//! `%Promise%` and `%Promise.prototype%` (spec §4.D, §4.H microtasks),
//! trimmed to `resolve`/`reject`/`prototype.then` — exactly what spec §8
//! scenario 5 (`Promise.resolve().then(()=>t=1)`) exercises.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/promise/mod.rs`
//! for the fulfill/reject/reaction-job split, adapted to this crate's own
//! `Agent::enqueue_microtask` instead of `boa`'s job queue abstraction. The
//! executor's `resolve`/`reject` callbacks reuse the bound-function
//! mechanism (`JsObject::bound_function`) to close over the target promise,
//! rather than adding a dedicated `FunctionData` variant just for this.

use crate::agent::Agent;
use crate::error::{JsNativeError, JsResult};
use crate::object::{JsObject, NativeFunctionData, PromiseState, Reaction};
use crate::string::JsString;
use crate::value::JsValue;

pub fn create_constructor(promise_prototype: &JsObject, function_prototype: &JsObject) -> JsObject {
    let constructor = JsObject::native_function(
        Some(function_prototype.clone()),
        JsString::new("Promise"),
        1,
        NativeFunctionData { call: promise_call, construct: Some(promise_construct) },
    );
    constructor.define_own_property(
        &crate::value::PropertyKey::String(JsString::new("prototype")),
        crate::property::PropertyDescriptor::data(
            promise_prototype.clone(),
            crate::property::Attribute::empty(),
        ),
    );
    promise_prototype.define_own_property(
        &crate::value::PropertyKey::String(JsString::new("constructor")),
        crate::property::PropertyDescriptor::data(
            constructor.clone(),
            crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE,
        ),
    );
    let proto = Some(function_prototype.clone());
    constructor.create_method("resolve", "resolve", 1, resolve_static, proto.clone());
    constructor.create_method("reject", "reject", 1, reject_static, proto);
    constructor
}

fn promise_call(_agent: &mut Agent, _this: &JsValue, _args: &[JsValue]) -> JsResult<JsValue> {
    Err(JsNativeError::typ("Promise constructor cannot be invoked without 'new'").into())
}

fn promise_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> JsResult<JsValue> {
    let executor = args.first().cloned().unwrap_or(JsValue::undefined());
    if !executor.is_callable() {
        return Err(JsNativeError::typ("Promise executor must be a function").into());
    }
    let promise_prototype = agent.realm().intrinsics.promise_prototype.clone();
    let promise = JsObject::promise(Some(promise_prototype.clone()));
    let resolve_fn = resolving_function(&promise, &promise_prototype, resolve_executor);
    let reject_fn = resolving_function(&promise, &promise_prototype, reject_executor);
    if let Err(err) = agent.call_function(&executor, &JsValue::undefined(), &[resolve_fn, reject_fn]) {
        let reason = err.to_opaque(agent);
        reject_promise(agent, &promise, reason);
    }
    Ok(JsValue::Object(promise))
}

/// Builds a partially-applied native function that, when called, invokes
/// `target` with the captured `promise` prepended to the call arguments —
/// the executor's `resolve`/`reject` parameters (spec §4.D `CreateResolvingFunctions`).
fn resolving_function(
    promise: &JsObject,
    function_prototype: &JsObject,
    target: crate::object::NativeCall,
) -> JsValue {
    let target_fn = JsObject::native_function(
        Some(function_prototype.clone()),
        JsString::new(""),
        2,
        NativeFunctionData { call: target, construct: None },
    );
    JsValue::Object(JsObject::bound_function(
        Some(function_prototype.clone()),
        JsString::new(""),
        1,
        JsValue::Object(target_fn),
        JsValue::undefined(),
        vec![JsValue::Object(promise.clone())],
    ))
}

fn resolve_executor(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let promise = args[0].as_object().expect("bound promise argument").clone();
    let value = args.get(1).cloned().unwrap_or(JsValue::undefined());
    resolve_promise(agent, &promise, value);
    Ok(JsValue::undefined())
}

fn reject_executor(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let promise = args[0].as_object().expect("bound promise argument").clone();
    let reason = args.get(1).cloned().unwrap_or(JsValue::undefined());
    reject_promise(agent, &promise, reason);
    Ok(JsValue::undefined())
}

fn resolve_static(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let value = args.first().cloned().unwrap_or(JsValue::undefined());
    if let JsValue::Object(o) = &value {
        if o.is_promise() {
            return Ok(value);
        }
    }
    let promise_prototype = agent.realm().intrinsics.promise_prototype.clone();
    let promise = JsObject::promise(Some(promise_prototype));
    resolve_promise(agent, &promise, value);
    Ok(JsValue::Object(promise))
}

fn reject_static(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let reason = args.first().cloned().unwrap_or(JsValue::undefined());
    let promise_prototype = agent.realm().intrinsics.promise_prototype.clone();
    let promise = JsObject::promise(Some(promise_prototype));
    reject_promise(agent, &promise, reason);
    Ok(JsValue::Object(promise))
}

pub fn install_prototype_methods(promise_prototype: &JsObject, function_prototype: &JsObject) {
    promise_prototype.create_method("then", "then", 2, then, Some(function_prototype.clone()));
}

fn then(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let Some(promise) = this.as_object().filter(|o| o.is_promise()).cloned() else {
        return Err(JsNativeError::typ("Promise.prototype.then called on a non-promise").into());
    };
    let on_fulfilled = args.first().cloned().filter(JsValue::is_callable);
    let on_rejected = args.get(1).cloned().filter(JsValue::is_callable);
    let promise_prototype = agent.realm().intrinsics.promise_prototype.clone();
    let result = JsObject::promise(Some(promise_prototype));

    let snapshot = promise.with_promise_data(|data| data.state.clone()).expect("is_promise checked above");
    match snapshot {
        PromiseState::Pending => {
            promise.with_promise_data(|data| {
                data.fulfill_reactions.push(Reaction { handler: on_fulfilled, result: result.clone() });
                data.reject_reactions.push(Reaction { handler: on_rejected, result: result.clone() });
            });
        }
        PromiseState::Fulfilled(value) => {
            let result = result.clone();
            agent.enqueue_microtask(Box::new(move |agent| {
                run_reaction(agent, on_fulfilled, value, result, false);
            }));
        }
        PromiseState::Rejected(reason) => {
            let result = result.clone();
            agent.enqueue_microtask(Box::new(move |agent| {
                run_reaction(agent, on_rejected, reason, result, true);
            }));
        }
    }
    Ok(JsValue::Object(result))
}

/// `FulfillPromise`/`RejectPromise` common `Resolve` step (spec §4.D): a
/// non-promise value fulfills directly; resolving with another (distinct)
/// promise adopts its eventual outcome instead.
fn resolve_promise(agent: &mut Agent, promise: &JsObject, value: JsValue) {
    let pending = promise
        .with_promise_data(|data| matches!(data.state, PromiseState::Pending))
        .unwrap_or(false);
    if !pending {
        return;
    }
    if let JsValue::Object(other) = &value {
        if other.is_promise() && !JsObject::identical(other, promise) {
            let target = promise.clone();
            let snapshot = other.with_promise_data(|data| data.state.clone());
            match snapshot {
                Some(PromiseState::Pending) => {
                    other.with_promise_data(|data| {
                        data.fulfill_reactions.push(Reaction { handler: None, result: target.clone() });
                        data.reject_reactions.push(Reaction { handler: None, result: target });
                    });
                }
                Some(PromiseState::Fulfilled(v)) => fulfill_promise(agent, &target, v),
                Some(PromiseState::Rejected(r)) => reject_promise(agent, &target, r),
                None => {}
            }
            return;
        }
    }
    fulfill_promise(agent, promise, value);
}

fn fulfill_promise(agent: &mut Agent, promise: &JsObject, value: JsValue) {
    let reactions = promise.with_promise_data(|data| {
        data.state = PromiseState::Fulfilled(value.clone());
        data.reject_reactions.clear();
        std::mem::take(&mut data.fulfill_reactions)
    });
    for reaction in reactions.into_iter().flatten() {
        let value = value.clone();
        agent.enqueue_microtask(Box::new(move |agent| {
            run_reaction(agent, reaction.handler, value, reaction.result, false);
        }));
    }
}

fn reject_promise(agent: &mut Agent, promise: &JsObject, reason: JsValue) {
    let reactions = promise.with_promise_data(|data| {
        data.state = PromiseState::Rejected(reason.clone());
        data.fulfill_reactions.clear();
        std::mem::take(&mut data.reject_reactions)
    });
    for reaction in reactions.into_iter().flatten() {
        let reason = reason.clone();
        agent.enqueue_microtask(Box::new(move |agent| {
            run_reaction(agent, reaction.handler, reason, reaction.result, true);
        }));
    }
}

fn run_reaction(
    agent: &mut Agent,
    handler: Option<JsValue>,
    input: JsValue,
    result: JsObject,
    is_reject: bool,
) {
    match handler {
        None => {
            if is_reject {
                reject_promise(agent, &result, input);
            } else {
                resolve_promise(agent, &result, input);
            }
        }
        Some(handler) => match agent.call_function(&handler, &JsValue::undefined(), &[input]) {
            Ok(value) => resolve_promise(agent, &result, value),
            Err(err) => {
                let reason = err.to_opaque(agent);
                reject_promise(agent, &result, reason);
            }
        },
    }
}
