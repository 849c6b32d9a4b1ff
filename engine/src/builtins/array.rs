//! `%Array%` and `%Array.prototype%` (spec §4.D), trimmed to `isArray` plus
//! `push`/`pop`/`map`/`join`/`forEach` on the prototype.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/array/mod.rs`
//! for method selection and the `ToObject`-then-`length` access pattern,
//! built directly against this crate's own `JsObject`.

use crate::agent::Agent;
use crate::error::{JsNativeError, JsResult};
use crate::object::{JsObject, NativeFunctionData};
use crate::property::{Attribute, PropertyDescriptor};
use crate::string::JsString;
use crate::value::{JsValue, PropertyKey};

pub fn create_constructor(array_prototype: &JsObject, function_prototype: &JsObject) -> JsObject {
    let constructor = JsObject::native_function(
        Some(function_prototype.clone()),
        JsString::new("Array"),
        1,
        NativeFunctionData { call: array_call, construct: Some(array_construct) },
    );
    constructor.define_own_property(
        &PropertyKey::String(JsString::new("prototype")),
        PropertyDescriptor::data(array_prototype.clone(), Attribute::empty()),
    );
    array_prototype.define_own_property(
        &PropertyKey::String(JsString::new("constructor")),
        PropertyDescriptor::data(constructor.clone(), Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );
    constructor.create_method("isArray", "isArray", 1, is_array, Some(function_prototype.clone()));
    constructor
}

/// `Array(...)`/`new Array(...)`: a single numeric argument is a length, any
/// other argument list becomes the initial elements (spec §4.D).
fn array_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let array = agent.realm().new_array();
    if let [JsValue::Number(n)] = args {
        set_length(&array, *n as u32);
    } else {
        for (index, value) in args.iter().enumerate() {
            array.create_data_property(PropertyKey::from_index(index as u32), value.clone());
        }
        set_length(&array, args.len() as u32);
    }
    Ok(JsValue::Object(array))
}

fn array_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> JsResult<JsValue> {
    array_call(agent, &JsValue::undefined(), args)
}

fn is_array(_agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    Ok(JsValue::Boolean(matches!(args.first(), Some(JsValue::Object(o)) if o.is_array())))
}

pub fn install_prototype_methods(array_prototype: &JsObject, function_prototype: &JsObject) {
    let proto = Some(function_prototype.clone());
    array_prototype.create_method("push", "push", 1, push, proto.clone());
    array_prototype.create_method("pop", "pop", 0, pop, proto.clone());
    array_prototype.create_method("map", "map", 1, map, proto.clone());
    array_prototype.create_method("join", "join", 1, join, proto.clone());
    array_prototype.create_method("forEach", "forEach", 1, for_each, proto);
}

pub(crate) fn length_of(object: &JsObject, agent: &mut Agent) -> JsResult<u32> {
    Ok(object.get_v("length", agent)?.to_number(agent)? as u32)
}

pub(crate) fn set_length(object: &JsObject, length: u32) {
    object.define_own_property(
        &PropertyKey::String(JsString::new("length")),
        PropertyDescriptor::data(length as f64, Attribute::WRITABLE),
    );
}

fn push(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let mut len = length_of(&object, agent)?;
    for value in args {
        object.create_data_property(PropertyKey::from_index(len), value.clone());
        len += 1;
    }
    set_length(&object, len);
    Ok(JsValue::Number(len as f64))
}

fn pop(agent: &mut Agent, this: &JsValue, _args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let len = length_of(&object, agent)?;
    if len == 0 {
        set_length(&object, 0);
        return Ok(JsValue::undefined());
    }
    let last_index = len - 1;
    let key = PropertyKey::from_index(last_index);
    let value = object.get_v(key.clone(), agent)?;
    object.delete(&key);
    set_length(&object, last_index);
    Ok(value)
}

fn map(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let callback = args.first().cloned().unwrap_or(JsValue::undefined());
    if !callback.is_callable() {
        return Err(JsNativeError::typ("Array.prototype.map callback is not a function").into());
    }
    let this_arg = args.get(1).cloned().unwrap_or(JsValue::undefined());
    let len = length_of(&object, agent)?;
    let result = agent.realm().new_array();
    for index in 0..len {
        let key = PropertyKey::from_index(index);
        let value = object.get_v(key, agent)?;
        let mapped = agent.call_function(
            &callback,
            &this_arg,
            &[value, JsValue::Number(index as f64), JsValue::Object(object.clone())],
        )?;
        result.create_data_property(PropertyKey::from_index(index), mapped);
    }
    set_length(&result, len);
    Ok(JsValue::Object(result))
}

fn join(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let separator = match args.first() {
        Some(JsValue::Undefined) | None => ",".to_string(),
        Some(other) => other.to_string(agent)?.to_string(),
    };
    let len = length_of(&object, agent)?;
    let mut out = String::new();
    for index in 0..len {
        if index > 0 {
            out.push_str(&separator);
        }
        let value = object.get_v(PropertyKey::from_index(index), agent)?;
        if !value.is_null_or_undefined() {
            out.push_str(&value.to_string(agent)?.to_string());
        }
    }
    Ok(JsValue::String(JsString::new(out)))
}

fn for_each(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let callback = args.first().cloned().unwrap_or(JsValue::undefined());
    if !callback.is_callable() {
        return Err(JsNativeError::typ("Array.prototype.forEach callback is not a function").into());
    }
    let this_arg = args.get(1).cloned().unwrap_or(JsValue::undefined());
    let len = length_of(&object, agent)?;
    for index in 0..len {
        let value = object.get_v(PropertyKey::from_index(index), agent)?;
        agent.call_function(
            &callback,
            &this_arg,
            &[value, JsValue::Number(index as f64), JsValue::Object(object.clone())],
        )?;
    }
    Ok(JsValue::undefined())
}
