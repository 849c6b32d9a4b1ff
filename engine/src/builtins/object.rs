//! `%Object%` and `%Object.prototype%` (spec §4.D), trimmed to the methods
//! SPEC_FULL.md §4.D names plus the `toString`/`valueOf` pair every object's
//! default `OrdinaryToPrimitive` walk depends on.
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/object/mod.rs`
//! for method selection, built directly against this crate's own
//! `JsObject`/`PropertyDescriptor` rather than the teacher's `Intrinsics`/
//! `IntrinsicObject` machinery.

use crate::agent::Agent;
use crate::error::{JsNativeError, JsResult};
use crate::object::{JsObject, NativeFunctionData};
use crate::property::{Attribute, PropertyDescriptor};
use crate::string::JsString;
use crate::value::{JsValue, PropertyKey};

pub fn create_constructor(object_prototype: &JsObject, function_prototype: &JsObject) -> JsObject {
    let constructor = JsObject::native_function(
        Some(function_prototype.clone()),
        JsString::new("Object"),
        1,
        NativeFunctionData { call: object_call, construct: Some(object_construct) },
    );
    constructor.define_own_property(
        &PropertyKey::String(JsString::new("prototype")),
        PropertyDescriptor::data(object_prototype.clone(), Attribute::empty()),
    );
    object_prototype.define_own_property(
        &PropertyKey::String(JsString::new("constructor")),
        PropertyDescriptor::data(constructor.clone(), Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );
    attach_statics(&constructor, function_prototype);
    constructor
}

fn object_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    match args.first() {
        None | Some(JsValue::Undefined | JsValue::Null) => Ok(JsValue::Object(agent.realm().new_object())),
        Some(value) => Ok(JsValue::Object(value.to_object(agent)?)),
    }
}

fn object_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> JsResult<JsValue> {
    object_call(agent, &JsValue::undefined(), args)
}

pub fn install_prototype_methods(object_prototype: &JsObject, function_prototype: &JsObject) {
    let proto = Some(function_prototype.clone());
    object_prototype.create_method("hasOwnProperty", "hasOwnProperty", 1, has_own_property, proto.clone());
    object_prototype.create_method("isPrototypeOf", "isPrototypeOf", 1, is_prototype_of, proto.clone());
    object_prototype.create_method("toString", "toString", 0, to_string, proto.clone());
    object_prototype.create_method("valueOf", "valueOf", 0, value_of, proto);
}

/// Attaches the static `Object.*` methods SPEC_FULL.md §4.D names. Split
/// from `create_constructor` only for readability; called immediately after
/// the constructor object exists.
fn attach_statics(constructor: &JsObject, function_prototype: &JsObject) {
    let proto = Some(function_prototype.clone());
    constructor.create_method("freeze", "freeze", 1, freeze, proto.clone());
    constructor.create_method("isFrozen", "isFrozen", 1, is_frozen, proto.clone());
    constructor.create_method("keys", "keys", 1, keys, proto.clone());
    constructor.create_method("defineProperty", "defineProperty", 3, define_property, proto.clone());
    constructor.create_method("getPrototypeOf", "getPrototypeOf", 1, get_prototype_of, proto.clone());
    constructor.create_method("setPrototypeOf", "setPrototypeOf", 2, set_prototype_of, proto.clone());
    constructor.create_method("create", "create", 2, create, proto);
}

fn has_own_property(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = this.to_object(agent)?;
    let key = args.first().cloned().unwrap_or(JsValue::undefined()).to_property_key(agent)?;
    Ok(JsValue::Boolean(object.get_own_property(&key).is_some()))
}

fn is_prototype_of(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let this_object = this.to_object(agent)?;
    let Some(candidate) = args.first().and_then(JsValue::as_object) else {
        return Ok(JsValue::Boolean(false));
    };
    let mut cursor = candidate.get_prototype_of();
    while let Some(proto) = cursor {
        if JsObject::identical(&proto, &this_object) {
            return Ok(JsValue::Boolean(true));
        }
        cursor = proto.get_prototype_of();
    }
    Ok(JsValue::Boolean(false))
}

fn to_string(_agent: &mut Agent, this: &JsValue, _args: &[JsValue]) -> JsResult<JsValue> {
    let tag = match this {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Object(o) if o.is_array() => "Array",
        JsValue::Object(o) if o.is_callable() => "Function",
        JsValue::Object(o) if o.is_error() => "Error",
        _ => "Object",
    };
    Ok(JsValue::String(JsString::new(format!("[object {tag}]"))))
}

fn value_of(agent: &mut Agent, this: &JsValue, _args: &[JsValue]) -> JsResult<JsValue> {
    Ok(JsValue::Object(this.to_object(agent)?))
}

fn freeze(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    match args.first() {
        Some(JsValue::Object(o)) => {
            o.freeze();
            Ok(JsValue::Object(o.clone()))
        }
        Some(other) => Ok(other.clone()),
        None => {
            let _ = agent;
            Ok(JsValue::undefined())
        }
    }
}

fn is_frozen(_agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    match args.first() {
        Some(JsValue::Object(o)) => Ok(JsValue::Boolean(o.is_frozen())),
        _ => Ok(JsValue::Boolean(true)),
    }
}

fn keys(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = args.first().cloned().unwrap_or(JsValue::undefined()).to_object(agent)?;
    let array = agent.realm().new_array();
    for key in object.own_property_keys() {
        if object.get_own_property(&key).is_some_and(|d| d.enumerable().unwrap_or(false)) {
            if let PropertyKey::String(s) = &key {
                append(&array, JsValue::String(s.clone()));
            }
        }
    }
    Ok(JsValue::Object(array))
}

fn append(array: &JsObject, value: JsValue) {
    let index = array
        .get_own_property(&PropertyKey::String(JsString::new("length")))
        .and_then(|d| d.value().and_then(JsValue::as_number))
        .unwrap_or(0.0) as u32;
    array.create_data_property(PropertyKey::from_index(index), value);
    array.define_own_property(
        &PropertyKey::String(JsString::new("length")),
        PropertyDescriptor::data((index + 1) as f64, Attribute::WRITABLE),
    );
}

fn define_property(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let Some(JsValue::Object(object)) = args.first() else {
        return Err(JsNativeError::typ("Object.defineProperty called on non-object").into());
    };
    let key = args.get(1).cloned().unwrap_or(JsValue::undefined()).to_property_key(agent)?;
    let Some(JsValue::Object(descriptor_obj)) = args.get(2) else {
        return Err(JsNativeError::typ("property description must be an object").into());
    };
    let mut builder = PropertyDescriptor::builder();
    if let Ok(value) = descriptor_obj.get_v("value", agent) {
        if descriptor_obj.has_property(&PropertyKey::String(JsString::new("value"))) {
            builder = builder.value(value);
        }
    }
    if descriptor_obj.has_property(&PropertyKey::String(JsString::new("writable"))) {
        builder = builder.writable(descriptor_obj.get_v("writable", agent)?.to_boolean());
    }
    if descriptor_obj.has_property(&PropertyKey::String(JsString::new("enumerable"))) {
        builder = builder.enumerable(descriptor_obj.get_v("enumerable", agent)?.to_boolean());
    }
    if descriptor_obj.has_property(&PropertyKey::String(JsString::new("configurable"))) {
        builder = builder.configurable(descriptor_obj.get_v("configurable", agent)?.to_boolean());
    }
    if descriptor_obj.has_property(&PropertyKey::String(JsString::new("get"))) {
        let get = descriptor_obj.get_v("get", agent)?;
        builder = builder.get(get);
    }
    if descriptor_obj.has_property(&PropertyKey::String(JsString::new("set"))) {
        let set = descriptor_obj.get_v("set", agent)?;
        builder = builder.set(set);
    }
    if !object.define_own_property(&key, builder.build()) {
        return Err(JsNativeError::typ("cannot define property").into());
    }
    Ok(JsValue::Object(object.clone()))
}

fn get_prototype_of(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let object = args.first().cloned().unwrap_or(JsValue::undefined()).to_object(agent)?;
    Ok(object.get_prototype_of().map_or(JsValue::null(), JsValue::Object))
}

fn set_prototype_of(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let Some(JsValue::Object(object)) = args.first() else {
        return Err(JsNativeError::typ("Object.setPrototypeOf called on non-object").into());
    };
    let prototype = match args.get(1) {
        Some(JsValue::Object(o)) => Some(o.clone()),
        Some(JsValue::Null) | None => None,
        Some(_) => return Err(JsNativeError::typ("prototype must be an object or null").into()),
    };
    if !object.set_prototype_of(prototype) {
        return Err(JsNativeError::typ("cyclic or non-extensible prototype chain").into());
    }
    let _ = agent;
    Ok(JsValue::Object(object.clone()))
}

fn create(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
    let prototype = match args.first() {
        Some(JsValue::Object(o)) => Some(o.clone()),
        Some(JsValue::Null) | None => None,
        Some(_) => return Err(JsNativeError::typ("prototype must be an object or null").into()),
    };
    let _ = agent;
    Ok(JsValue::Object(JsObject::ordinary(prototype)))
}
