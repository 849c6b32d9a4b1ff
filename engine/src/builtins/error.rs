//! `%Error%` and the six `%NativeError%` subclass constructors (spec §4.D,
//! §7 taxonomy 1).
//!
//! Grounded on `examples/boa-dev-boa/boa_engine/src/builtins/error/mod.rs`'s
//! `Error`/`NativeError` split, collapsed to one monomorphic constructor per
//! kind since `NativeConstruct` is a bare `fn` pointer with no room to close
//! over which `JsNativeErrorKind`/prototype it targets.

use crate::agent::Agent;
use crate::error::JsNativeErrorKind;
use crate::object::{JsObject, NativeFunctionData};
use crate::property::{Attribute, PropertyDescriptor};
use crate::realm::NativeErrorPrototypes;
use crate::string::JsString;
use crate::value::{JsValue, PropertyKey};

/// The seven global error constructors, installed onto the global object by
/// `Realm::create` under the names SPEC_FULL.md §4.D lists.
pub struct ErrorConstructors {
    pub error: JsObject,
    pub type_error: JsObject,
    pub range_error: JsObject,
    pub reference_error: JsObject,
    pub syntax_error: JsObject,
    pub eval_error: JsObject,
    pub uri_error: JsObject,
}

pub fn install(
    prototypes: &NativeErrorPrototypes,
    function_prototype: &JsObject,
) -> ErrorConstructors {
    ErrorConstructors {
        error: constructor("Error", &prototypes.error, function_prototype, error_construct),
        type_error: constructor(
            "TypeError",
            &prototypes.type_error,
            function_prototype,
            type_error_construct,
        ),
        range_error: constructor(
            "RangeError",
            &prototypes.range_error,
            function_prototype,
            range_error_construct,
        ),
        reference_error: constructor(
            "ReferenceError",
            &prototypes.reference_error,
            function_prototype,
            reference_error_construct,
        ),
        syntax_error: constructor(
            "SyntaxError",
            &prototypes.syntax_error,
            function_prototype,
            syntax_error_construct,
        ),
        eval_error: constructor(
            "EvalError",
            &prototypes.eval_error,
            function_prototype,
            eval_error_construct,
        ),
        uri_error: constructor(
            "URIError",
            &prototypes.uri_error,
            function_prototype,
            uri_error_construct,
        ),
    }
}

fn constructor(
    name: &str,
    prototype: &JsObject,
    function_prototype: &JsObject,
    construct: crate::object::NativeConstruct,
) -> JsObject {
    let call: crate::object::NativeCall = match name {
        "TypeError" => type_error_call,
        "RangeError" => range_error_call,
        "ReferenceError" => reference_error_call,
        "SyntaxError" => syntax_error_call,
        "EvalError" => eval_error_call,
        "URIError" => uri_error_call,
        _ => error_call,
    };
    let ctor = JsObject::native_function(
        Some(function_prototype.clone()),
        JsString::new(name),
        1,
        NativeFunctionData { call, construct: Some(construct) },
    );
    ctor.define_own_property(
        &PropertyKey::String(JsString::new("prototype")),
        PropertyDescriptor::data(prototype.clone(), Attribute::empty()),
    );
    prototype.define_own_property(
        &PropertyKey::String(JsString::new("constructor")),
        PropertyDescriptor::data(ctor.clone(), Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );
    ctor
}

fn build(agent: &mut Agent, kind: JsNativeErrorKind, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    let prototype = agent.realm().intrinsics.native_error_prototypes.get(kind).clone();
    let object = JsObject::error(Some(prototype));
    if let Some(message) = args.first() {
        if !message.is_undefined() {
            let message = message.to_string(agent)?;
            object.define_own_property(
                &PropertyKey::String(JsString::new("message")),
                PropertyDescriptor::data(message, Attribute::WRITABLE | Attribute::CONFIGURABLE),
            );
        }
    }
    Ok(JsValue::Object(object))
}

/// Calling any error constructor without `new` behaves the same as
/// constructing one (spec §4.D).
fn error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Error, args)
}

fn type_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Type, args)
}

fn range_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Range, args)
}

fn reference_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Reference, args)
}

fn syntax_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Syntax, args)
}

fn eval_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Eval, args)
}

fn uri_error_call(agent: &mut Agent, _this: &JsValue, args: &[JsValue]) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Uri, args)
}

fn error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Error, args)
}

fn type_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Type, args)
}

fn range_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Range, args)
}

fn reference_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Reference, args)
}

fn syntax_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Syntax, args)
}

fn eval_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Eval, args)
}

fn uri_error_construct(agent: &mut Agent, args: &[JsValue], _new_target: &JsObject) -> crate::error::JsResult<JsValue> {
    build(agent, JsNativeErrorKind::Uri, args)
}
