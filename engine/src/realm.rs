//! Per-realm state: the global object, intrinsic prototypes/constructors,
//! and the well-known symbol registry (spec §3 Realm, §4.D, component D).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/realm.rs` for the record shape
//! (a realm owns its global object and nothing else reaches across realms);
//! the declarative `(name, arity, implementation, attributes)` installation
//! style the `engine::builtins` submodules use to populate it is grounded on
//! `examples/boa-dev-boa/boa_engine/src/builtins/mod.rs`, simplified to this
//! engine's own `JsObject::create_method` rather than the teacher's
//! `Intrinsics`/`StandardConstructors`/`IntrinsicObject`-trait machinery,
//! which exists to support far more intrinsics than spec §4.D names.

use crate::bigint::JsBigInt;
use crate::error::{JsNativeError, JsNativeErrorKind};
use crate::object::JsObject;
use crate::property::{Attribute, PropertyDescriptor};
use crate::string::JsString;
use crate::symbol::{JsSymbol, WellKnownSymbols};
use crate::value::JsValue;

/// The six `NativeError` subclass prototypes plus the base `Error.prototype`
/// (spec §4.D), named explicitly rather than keyed by a map — there are only
/// seven and each is reached by name from `builtins::error`.
#[derive(Clone)]
pub struct NativeErrorPrototypes {
    pub error: JsObject,
    pub type_error: JsObject,
    pub range_error: JsObject,
    pub reference_error: JsObject,
    pub syntax_error: JsObject,
    pub eval_error: JsObject,
    pub uri_error: JsObject,
}

impl NativeErrorPrototypes {
    pub fn get(&self, kind: JsNativeErrorKind) -> &JsObject {
        match kind {
            JsNativeErrorKind::Error => &self.error,
            JsNativeErrorKind::Type => &self.type_error,
            JsNativeErrorKind::Range => &self.range_error,
            JsNativeErrorKind::Reference => &self.reference_error,
            JsNativeErrorKind::Syntax => &self.syntax_error,
            JsNativeErrorKind::Eval => &self.eval_error,
            JsNativeErrorKind::Uri => &self.uri_error,
        }
    }
}

/// The realm-specific intrinsic objects spec §4.D names as the minimal
/// surface this engine supports (Object, Function, Array, the Error family,
/// Promise, plus the primitive-wrapper prototypes every `ToObject` needs).
#[derive(Clone)]
pub struct Intrinsics {
    pub object_prototype: JsObject,
    pub function_prototype: JsObject,
    pub array_prototype: JsObject,
    pub boolean_prototype: JsObject,
    pub number_prototype: JsObject,
    pub string_prototype: JsObject,
    pub symbol_prototype: JsObject,
    pub bigint_prototype: JsObject,
    pub promise_prototype: JsObject,
    pub generator_prototype: JsObject,
    pub native_error_prototypes: NativeErrorPrototypes,
    pub object_constructor: JsObject,
    pub array_constructor: JsObject,
    pub promise_constructor: JsObject,
}

/// A single realm: its global object and the intrinsics spec §4.D
/// enumerates, plus the well-known symbol registry every realm carries
/// (spec §3). One `Agent` drives exactly one realm at a time in this engine
/// — there is no cross-realm object graph to keep straight (out of scope
/// per `SPEC_FULL.md`).
#[derive(Clone)]
pub struct Realm {
    pub global_object: JsObject,
    pub intrinsics: Intrinsics,
    pub symbols: WellKnownSymbols,
}

impl Realm {
    /// `InitializeHostDefinedRealm` (spec §4.D), trimmed to the intrinsics
    /// this engine implements. Registering native methods needs no `Agent`
    /// — a `NativeCall` is a bare function pointer, resolved only when
    /// actually invoked — so the whole intrinsic graph builds eagerly here.
    pub fn create() -> Self {
        let object_prototype = JsObject::ordinary(None);
        let function_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let array_prototype = JsObject::array(Some(object_prototype.clone()));
        let boolean_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let number_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let string_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let symbol_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let bigint_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let promise_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        let generator_prototype = JsObject::ordinary(Some(object_prototype.clone()));

        let error_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        error_prototype.create_data_property("name", "Error");
        error_prototype.create_data_property("message", "");
        let native_error_prototypes = NativeErrorPrototypes {
            error: error_prototype.clone(),
            type_error: native_error_prototype(&error_prototype, "TypeError"),
            range_error: native_error_prototype(&error_prototype, "RangeError"),
            reference_error: native_error_prototype(&error_prototype, "ReferenceError"),
            syntax_error: native_error_prototype(&error_prototype, "SyntaxError"),
            eval_error: native_error_prototype(&error_prototype, "EvalError"),
            uri_error: native_error_prototype(&error_prototype, "URIError"),
        };

        let object_constructor = crate::builtins::object::create_constructor(
            &object_prototype,
            &function_prototype,
        );
        let array_constructor =
            crate::builtins::array::create_constructor(&array_prototype, &function_prototype);
        let promise_constructor = crate::builtins::promise::create_constructor(
            &promise_prototype,
            &function_prototype,
        );

        crate::builtins::function::install_prototype_methods(&function_prototype);
        crate::builtins::array::install_prototype_methods(&array_prototype, &function_prototype);
        crate::builtins::object::install_prototype_methods(&object_prototype, &function_prototype);
        crate::builtins::promise::install_prototype_methods(&promise_prototype, &function_prototype);
        crate::builtins::generator::install_prototype_methods(&generator_prototype, &function_prototype);
        let error_constructors = crate::builtins::error::install(
            &native_error_prototypes,
            &function_prototype,
        );

        let global_object = JsObject::ordinary(Some(object_prototype.clone()));
        global_object.create_data_property("Object", object_constructor.clone());
        global_object.create_data_property("Array", array_constructor.clone());
        global_object.create_data_property("Promise", promise_constructor.clone());
        global_object.create_data_property("Error", error_constructors.error);
        global_object.create_data_property("TypeError", error_constructors.type_error);
        global_object.create_data_property("RangeError", error_constructors.range_error);
        global_object.create_data_property("ReferenceError", error_constructors.reference_error);
        global_object.create_data_property("SyntaxError", error_constructors.syntax_error);
        global_object.create_data_property("EvalError", error_constructors.eval_error);
        global_object.create_data_property("URIError", error_constructors.uri_error);
        global_object.create_data_property("undefined", JsValue::undefined());
        global_object.create_data_property("NaN", f64::NAN);
        global_object.create_data_property("Infinity", f64::INFINITY);

        Self {
            global_object,
            intrinsics: Intrinsics {
                object_prototype,
                function_prototype,
                array_prototype,
                boolean_prototype,
                number_prototype,
                string_prototype,
                symbol_prototype,
                bigint_prototype,
                promise_prototype,
                generator_prototype,
                native_error_prototypes,
                object_constructor,
                array_constructor,
                promise_constructor,
            },
            symbols: WellKnownSymbols::new(),
        }
    }

    /// Constructs (but does not throw) the `Error`-subclass object backing a
    /// [`JsNativeError`] the first time it crosses from engine code into JS
    /// (spec §7: "native functions convert host exceptions into JS throws at
    /// the boundary").
    pub fn construct_native_error(&self, native: &JsNativeError) -> JsValue {
        let prototype = self.intrinsics.native_error_prototypes.get(native.kind).clone();
        let object = JsObject::error(Some(prototype));
        object.create_data_property("message", JsString::new(native.message.clone()));
        JsValue::Object(object)
    }

    pub fn wrap_boolean(&self, value: bool) -> JsObject {
        JsObject::wrap_boolean(Some(self.intrinsics.boolean_prototype.clone()), value)
    }

    pub fn wrap_number(&self, value: f64) -> JsObject {
        JsObject::wrap_number(Some(self.intrinsics.number_prototype.clone()), value)
    }

    pub fn wrap_string(&self, value: JsString) -> JsObject {
        JsObject::wrap_string(Some(self.intrinsics.string_prototype.clone()), value)
    }

    pub fn wrap_symbol(&self, value: JsSymbol) -> JsObject {
        JsObject::wrap_symbol(Some(self.intrinsics.symbol_prototype.clone()), value)
    }

    pub fn wrap_bigint(&self, value: JsBigInt) -> JsObject {
        JsObject::wrap_bigint(Some(self.intrinsics.bigint_prototype.clone()), value)
    }

    pub fn new_array(&self) -> JsObject {
        JsObject::array(Some(self.intrinsics.array_prototype.clone()))
    }

    pub fn new_object(&self) -> JsObject {
        JsObject::ordinary(Some(self.intrinsics.object_prototype.clone()))
    }
}

fn native_error_prototype(error_prototype: &JsObject, name: &str) -> JsObject {
    let prototype = JsObject::ordinary(Some(error_prototype.clone()));
    prototype.create_data_property("name", name);
    prototype.define_own_property(
        &crate::value::PropertyKey::String(JsString::new("message")),
        PropertyDescriptor::data("", Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );
    prototype
}
