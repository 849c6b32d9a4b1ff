//! Ordinary objects and the nine internal methods (spec §3 object, §4.B,
//! component B).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/object/{mod.rs,internal_methods.rs,
//! operations.rs}`: a `Gc<GcRefCell<..>>`-backed handle type with the
//! internal methods as inherent functions, and a `kind` tag distinguishing
//! ordinary objects from the handful of exotic shapes this engine needs
//! (arrays, primitive wrappers, function objects). There is no `Proxy`
//! support (out of scope per `SPEC_FULL.md`), so every internal method below
//! is the *ordinary* algorithm — no trait indirection is needed the way
//! `boa`'s `NativeObject`/exotic-method-table machinery provides for hosts
//! that do need `Proxy`.

mod function;
mod property_map;
mod promise;

pub use function::{
    BoundFunctionData, ConstructorKind, FunctionData, NativeCall, NativeConstruct,
    NativeFunctionData, OrdinaryFunction, ThisMode,
};
pub use promise::{PromiseData, PromiseState, Reaction};

use crate::agent::Agent;
use crate::bigint::JsBigInt;
use crate::environments::DeclarativeEnvironmentStack;
use crate::error::{JsNativeError, JsResult};
use crate::ir::FunctionInfo;
use crate::property::{Attribute, PropertyDescriptor};
use crate::string::JsString;
use crate::symbol::JsSymbol;
use crate::value::{JsValue, PreferredType, PropertyKey};
use crate::vm::GeneratorData;
use boa_gc::{Finalize, Gc, GcRefCell, Trace};
use property_map::PropertyMap;
use std::collections::VecDeque;
use std::rc::Rc;

/// The exotic "kind" of an object, beyond the ordinary internal methods
/// every object shares (spec §3: ordinary vs. exotic objects).
#[derive(Trace, Finalize)]
pub enum ObjectKind {
    Ordinary,
    Array,
    /// `Error` and the `NativeError` subclasses (spec §4.D); carries no
    /// extra state beyond its own properties (`message`, `name`, ...).
    Error,
    BooleanData(bool),
    NumberData(f64),
    StringData(JsString),
    SymbolData(JsSymbol),
    BigIntData(JsBigInt),
    Function(FunctionData),
    /// A `Promise` exotic object (spec §4.D), carrying its resolution state
    /// and pending reactions in a separate `GcRefCell` since both settle and
    /// `.then()` mutate it independently of ordinary property storage.
    Promise(Gc<GcRefCell<PromiseData>>),
    /// A generator object (spec §4.G): the suspended call frame it resumes
    /// from `next()`, or `None` once the generator has run to completion.
    Generator(GcRefCell<GeneratorData>),
    /// The iterator `for-in` drives (spec §5 `ForInStart`/`ForInNext`): the
    /// already-enumerated key list, computed once up front rather than
    /// lazily walking the prototype chain on every step.
    ForInIterator(GcRefCell<VecDeque<JsString>>),
    /// The iterator a plain array produces for `for-of`/spread (spec §5
    /// `GetIterator`/`IteratorNext`): the target array plus the next index.
    ArrayIterator(GcRefCell<ArrayIteratorState>),
}

/// State for [`ObjectKind::ArrayIterator`]; a named struct rather than a bare
/// tuple so it unambiguously derives `Trace`/`Finalize`.
#[derive(Trace, Finalize)]
pub struct ArrayIteratorState {
    pub target: JsObject,
    pub index: u32,
}

impl ObjectKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Ordinary => "Object",
            Self::Array => "Array",
            Self::Error => "Error",
            Self::BooleanData(_) => "Boolean",
            Self::NumberData(_) => "Number",
            Self::StringData(_) => "String",
            Self::SymbolData(_) => "Symbol",
            Self::BigIntData(_) => "BigInt",
            Self::Function(_) => "Function",
            Self::Promise(_) => "Promise",
            Self::Generator(_) => "Generator",
            Self::ForInIterator(_) => "ForInIterator",
            Self::ArrayIterator(_) => "ArrayIterator",
        }
    }
}

#[derive(Trace, Finalize)]
struct ObjectInner {
    prototype: Option<JsObject>,
    extensible: bool,
    properties: PropertyMap,
    kind: ObjectKind,
}

/// A handle to a JS object: a cheap `Gc` clone, compared for identity with
/// [`JsObject::identical`] (spec §3: objects are compared by reference).
#[derive(Clone, Trace, Finalize)]
pub struct JsObject {
    inner: Gc<GcRefCell<ObjectInner>>,
}

impl std::fmt::Debug for JsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[object {}]", self.inner.borrow().kind.type_name())
    }
}

impl JsObject {
    fn from_kind(prototype: Option<JsObject>, kind: ObjectKind) -> Self {
        Self {
            inner: Gc::new(GcRefCell::new(ObjectInner {
                prototype,
                extensible: true,
                properties: PropertyMap::new(),
                kind,
            })),
        }
    }

    pub fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::from_kind(prototype, ObjectKind::Ordinary)
    }

    pub fn array(prototype: Option<JsObject>) -> Self {
        let object = Self::from_kind(prototype, ObjectKind::Array);
        object.define_own_property(
            &PropertyKey::String(JsString::new("length")),
            PropertyDescriptor::data(0.0, Attribute::WRITABLE),
        );
        object
    }

    pub fn error(prototype: Option<JsObject>) -> Self {
        Self::from_kind(prototype, ObjectKind::Error)
    }

    pub fn wrap_boolean(prototype: Option<JsObject>, value: bool) -> Self {
        Self::from_kind(prototype, ObjectKind::BooleanData(value))
    }

    pub fn wrap_number(prototype: Option<JsObject>, value: f64) -> Self {
        Self::from_kind(prototype, ObjectKind::NumberData(value))
    }

    pub fn wrap_string(prototype: Option<JsObject>, value: JsString) -> Self {
        let object = Self::from_kind(prototype, ObjectKind::StringData(value.clone()));
        object.define_own_property(
            &PropertyKey::String(JsString::new("length")),
            PropertyDescriptor::data(value.len() as f64, Attribute::empty()),
        );
        object
    }

    pub fn wrap_symbol(prototype: Option<JsObject>, value: JsSymbol) -> Self {
        Self::from_kind(prototype, ObjectKind::SymbolData(value))
    }

    pub fn wrap_bigint(prototype: Option<JsObject>, value: JsBigInt) -> Self {
        Self::from_kind(prototype, ObjectKind::BigIntData(value))
    }

    pub fn native_function(
        prototype: Option<JsObject>,
        name: JsString,
        length: usize,
        data: NativeFunctionData,
    ) -> Self {
        let object = Self::from_kind(
            prototype,
            ObjectKind::Function(FunctionData::Native { name: name.clone(), length, data }),
        );
        object.define_own_property(
            &PropertyKey::String(JsString::new("name")),
            PropertyDescriptor::data(name, Attribute::CONFIGURABLE),
        );
        object.define_own_property(
            &PropertyKey::String(JsString::new("length")),
            PropertyDescriptor::data(length as f64, Attribute::CONFIGURABLE),
        );
        object
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ordinary_function(
        prototype: Option<JsObject>,
        code: Rc<FunctionInfo>,
        environment: DeclarativeEnvironmentStack,
        home_object: Option<JsObject>,
        this_mode: ThisMode,
        is_constructor: bool,
        constructor_kind: ConstructorKind,
    ) -> Self {
        let name = JsString::new(code.name.as_deref().unwrap_or(""));
        let length = code.expected_argument_count;
        let function = Gc::new(OrdinaryFunction {
            code,
            environment,
            home_object: GcRefCell::new(home_object),
            this_mode,
            is_constructor,
            constructor_kind,
            fields_source: None,
        });
        let object = Self::from_kind(prototype, ObjectKind::Function(FunctionData::Ordinary(function)));
        object.define_own_property(
            &PropertyKey::String(JsString::new("name")),
            PropertyDescriptor::data(name, Attribute::CONFIGURABLE),
        );
        object.define_own_property(
            &PropertyKey::String(JsString::new("length")),
            PropertyDescriptor::data(length as f64, Attribute::CONFIGURABLE),
        );
        object
    }

    /// `Function.prototype.bind`'s bound function exotic object (spec §4.D):
    /// carries no code of its own, just the `target`/`bound_this`/
    /// `bound_args` `Agent::call_function` dispatches through.
    pub fn bound_function(
        prototype: Option<JsObject>,
        name: JsString,
        length: usize,
        target: JsValue,
        bound_this: JsValue,
        bound_args: Vec<JsValue>,
    ) -> Self {
        let data = Gc::new(BoundFunctionData { target, bound_this, bound_args });
        let object = Self::from_kind(prototype, ObjectKind::Function(FunctionData::Bound(data)));
        object.define_own_property(
            &PropertyKey::String(JsString::new("name")),
            PropertyDescriptor::data(name, Attribute::CONFIGURABLE),
        );
        object.define_own_property(
            &PropertyKey::String(JsString::new("length")),
            PropertyDescriptor::data(length as f64, Attribute::CONFIGURABLE),
        );
        object
    }

    pub fn promise(prototype: Option<JsObject>) -> Self {
        Self::from_kind(prototype, ObjectKind::Promise(Gc::new(GcRefCell::new(PromiseData::new()))))
    }

    pub fn is_promise(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::Promise(_))
    }

    /// Runs `f` against this promise's internal state. Returns `None` if
    /// this object isn't a promise. The inner `Gc` is cloned out before
    /// calling `f` so `f` can itself call back into other `JsObject` methods
    /// without re-entering this object's outer borrow.
    pub fn with_promise_data<R>(&self, f: impl FnOnce(&mut PromiseData) -> R) -> Option<R> {
        let data = match &self.inner.borrow().kind {
            ObjectKind::Promise(data) => data.clone(),
            _ => return None,
        };
        Some(f(&mut data.borrow_mut()))
    }

    pub fn generator(prototype: Option<JsObject>, data: GeneratorData) -> Self {
        Self::from_kind(prototype, ObjectKind::Generator(GcRefCell::new(data)))
    }

    pub fn is_generator(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::Generator(_))
    }

    /// Same `Gc`-cloned-out-first pattern as [`Self::with_promise_data`]: `f`
    /// may itself drive the suspended frame back into the VM, which must not
    /// re-enter this object's own borrow.
    pub fn with_generator_data<R>(&self, f: impl FnOnce(&mut GeneratorData) -> R) -> Option<R> {
        let data = match &self.inner.borrow().kind {
            ObjectKind::Generator(data) => data.clone(),
            _ => return None,
        };
        Some(f(&mut data.borrow_mut()))
    }

    pub fn for_in_iterator(keys: VecDeque<JsString>) -> Self {
        Self::from_kind(None, ObjectKind::ForInIterator(GcRefCell::new(keys)))
    }

    pub fn is_for_in_iterator(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::ForInIterator(_))
    }

    /// Pops the next key, or `None` once the for-in enumeration is exhausted.
    pub fn for_in_next(&self) -> Option<JsString> {
        match &self.inner.borrow().kind {
            ObjectKind::ForInIterator(keys) => keys.borrow_mut().pop_front(),
            _ => None,
        }
    }

    pub fn array_iterator(target: JsObject) -> Self {
        Self::from_kind(None, ObjectKind::ArrayIterator(GcRefCell::new(ArrayIteratorState { target, index: 0 })))
    }

    pub fn is_array_iterator(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::ArrayIterator(_))
    }

    pub fn with_array_iterator_state<R>(&self, f: impl FnOnce(&mut ArrayIteratorState) -> R) -> Option<R> {
        match &self.inner.borrow().kind {
            ObjectKind::ArrayIterator(state) => Some(f(&mut state.borrow_mut())),
            _ => None,
        }
    }

    /// Patches a closure's home object in after the fact (spec §4.F): class
    /// methods only learn their home object once `CreateClass` builds the
    /// prototype, which runs after the method's own `CreateClosure`. No-op on
    /// anything but an ordinary function.
    pub fn set_function_home_object(&self, home: JsObject) {
        let target = match &self.inner.borrow().kind {
            ObjectKind::Function(FunctionData::Ordinary(f)) => Some(f.clone()),
            _ => None,
        };
        if let Some(f) = target {
            *f.home_object.borrow_mut() = Some(home);
        }
    }

    pub fn function_home_object(&self) -> Option<JsObject> {
        match &self.inner.borrow().kind {
            ObjectKind::Function(FunctionData::Ordinary(f)) => f.home_object.borrow().clone(),
            _ => None,
        }
    }

    pub fn identical(a: &Self, b: &Self) -> bool {
        Gc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn kind_name(&self) -> &'static str {
        self.inner.borrow().kind.type_name()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::Array)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::Error)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.inner.borrow().kind, ObjectKind::Function(_))
    }

    pub fn is_constructor(&self) -> bool {
        match &self.inner.borrow().kind {
            ObjectKind::Function(data) => data.is_constructor(),
            _ => false,
        }
    }

    pub fn with_function_data<R>(&self, f: impl FnOnce(&FunctionData) -> R) -> Option<R> {
        match &self.inner.borrow().kind {
            ObjectKind::Function(data) => Some(f(data)),
            _ => None,
        }
    }

    pub fn primitive_data(&self) -> Option<JsValue> {
        match &self.inner.borrow().kind {
            ObjectKind::BooleanData(b) => Some(JsValue::Boolean(*b)),
            ObjectKind::NumberData(n) => Some(JsValue::Number(*n)),
            ObjectKind::StringData(s) => Some(JsValue::String(s.clone())),
            ObjectKind::SymbolData(s) => Some(JsValue::Symbol(s.clone())),
            ObjectKind::BigIntData(b) => Some(JsValue::BigInt(b.clone())),
            _ => None,
        }
    }

    // ---- the nine internal methods (spec §3/§4.B) ----

    pub fn get_prototype_of(&self) -> Option<JsObject> {
        self.inner.borrow().prototype.clone()
    }

    /// `[[SetPrototypeOf]]`: rejects cycles and is a no-op success if the
    /// prototype is unchanged, refuses if not extensible.
    pub fn set_prototype_of(&self, prototype: Option<JsObject>) -> bool {
        let current = self.get_prototype_of();
        if current
            .as_ref()
            .zip(prototype.as_ref())
            .is_some_and(|(a, b)| Self::identical(a, b))
            || (current.is_none() && prototype.is_none())
        {
            return true;
        }
        if !self.is_extensible() {
            return false;
        }
        let mut cursor = prototype.clone();
        while let Some(candidate) = cursor {
            if Self::identical(&candidate, self) {
                return false;
            }
            cursor = candidate.get_prototype_of();
        }
        self.inner.borrow_mut().prototype = prototype;
        true
    }

    pub fn is_extensible(&self) -> bool {
        self.inner.borrow().extensible
    }

    pub fn prevent_extensions(&self) -> bool {
        self.inner.borrow_mut().extensible = false;
        true
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.inner.borrow().properties.get(key).cloned()
    }

    /// `[[DefineOwnProperty]]` via `ValidateAndApplyPropertyDescriptor`
    /// (spec §4.B), simplified to the ordinary (non-array-length-exotic)
    /// algorithm; array `length` updates are handled by the `Array`
    /// builtins directly rather than a generic exotic hook.
    pub fn define_own_property(&self, key: &PropertyKey, descriptor: PropertyDescriptor) -> bool {
        let mut inner = self.inner.borrow_mut();
        let extensible = inner.extensible;
        match inner.properties.get(key).cloned() {
            None => {
                if !extensible {
                    return false;
                }
                inner.properties.insert(key, descriptor.complete());
                true
            }
            Some(current) => {
                if !current.configurable().unwrap_or(false) {
                    if descriptor.configurable() == Some(true) {
                        return false;
                    }
                    if let Some(enumerable) = descriptor.enumerable() {
                        if enumerable != current.enumerable().unwrap_or(false) {
                            return false;
                        }
                    }
                    if current.is_data_descriptor() != descriptor.is_data_descriptor()
                        && !descriptor.is_generic_descriptor()
                    {
                        return false;
                    }
                    if current.is_data_descriptor()
                        && !current.writable().unwrap_or(false)
                        && descriptor.writable() == Some(true)
                    {
                        return false;
                    }
                    if current.is_data_descriptor()
                        && !current.writable().unwrap_or(false)
                        && descriptor
                            .value()
                            .is_some_and(|v| !JsValue::same_value(v, current.value().unwrap()))
                    {
                        return false;
                    }
                }
                let merged = current.merged_with(descriptor);
                inner.properties.insert(key, merged);
                true
            }
        }
    }

    pub fn has_property(&self, key: &PropertyKey) -> bool {
        if self.get_own_property(key).is_some() {
            return true;
        }
        match self.get_prototype_of() {
            Some(proto) => proto.has_property(key),
            None => false,
        }
    }

    /// `[[Get]]`: may call into user code through an accessor's getter.
    pub fn get(&self, key: &PropertyKey, receiver: &JsValue, agent: &mut Agent) -> JsResult<JsValue> {
        match self.get_own_property(key) {
            Some(descriptor) => {
                if descriptor.is_accessor_descriptor() {
                    match descriptor.get() {
                        Some(getter) if !getter.is_undefined() => {
                            agent.call_function(getter, receiver, &[])
                        }
                        _ => Ok(JsValue::undefined()),
                    }
                } else {
                    Ok(descriptor.value().cloned().unwrap_or(JsValue::undefined()))
                }
            }
            None => match self.get_prototype_of() {
                Some(proto) => proto.get(key, receiver, agent),
                None => Ok(JsValue::undefined()),
            },
        }
    }

    /// `[[Set]]`: may call into user code through an accessor's setter.
    pub fn set(
        &self,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsValue,
        agent: &mut Agent,
    ) -> JsResult<bool> {
        match self.get_own_property(key) {
            Some(descriptor) => {
                if descriptor.is_accessor_descriptor() {
                    return match descriptor.set_fn() {
                        Some(setter) if !setter.is_undefined() => {
                            agent.call_function(setter, receiver, &[value])?;
                            Ok(true)
                        }
                        _ => Ok(false),
                    };
                }
                if !descriptor.writable().unwrap_or(false) {
                    return Ok(false);
                }
                let Some(receiver_object) = receiver.as_object() else {
                    return Ok(false);
                };
                if Self::identical(receiver_object, self) {
                    Ok(self.define_own_property(
                        key,
                        PropertyDescriptor::builder().value(value).build(),
                    ))
                } else {
                    Ok(receiver_object.define_own_property(
                        key,
                        PropertyDescriptor::data(value, Attribute::DEFAULT),
                    ))
                }
            }
            None => match self.get_prototype_of() {
                Some(proto) => proto.set(key, value, receiver, agent),
                None => {
                    let Some(receiver_object) = receiver.as_object() else {
                        return Ok(false);
                    };
                    Ok(receiver_object.define_own_property(
                        key,
                        PropertyDescriptor::data(value, Attribute::DEFAULT),
                    ))
                }
            },
        }
    }

    pub fn delete(&self, key: &PropertyKey) -> bool {
        match self.get_own_property(key) {
            Some(descriptor) => {
                if !descriptor.configurable().unwrap_or(false) {
                    return false;
                }
                self.inner.borrow_mut().properties.remove(key);
                true
            }
            None => true,
        }
    }

    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        self.inner.borrow().properties.own_keys()
    }

    // ---- convenience wrappers used pervasively by builtins/bytecompiler ----

    pub fn get_v(&self, key: impl Into<PropertyKey>, agent: &mut Agent) -> JsResult<JsValue> {
        let key = key.into();
        let this = JsValue::Object(self.clone());
        self.get(&key, &this, agent)
    }

    pub fn set_v(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<JsValue>,
        agent: &mut Agent,
    ) -> JsResult<bool> {
        let key = key.into();
        let this = JsValue::Object(self.clone());
        self.set(&key, value.into(), &this, agent)
    }

    pub fn create_data_property(&self, key: impl Into<PropertyKey>, value: impl Into<JsValue>) -> bool {
        self.define_own_property(&key.into(), PropertyDescriptor::data(value.into(), Attribute::DEFAULT))
    }

    pub fn create_method(
        &self,
        key: impl Into<PropertyKey>,
        name: &str,
        length: usize,
        call: NativeCall,
        prototype: Option<JsObject>,
    ) {
        let function = Self::native_function(
            prototype,
            JsString::new(name),
            length,
            NativeFunctionData { call, construct: None },
        );
        self.define_own_property(
            &key.into(),
            PropertyDescriptor::data(function, Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }

    /// `OrdinaryToPrimitive` (spec §4.A), walking `valueOf`/`toString` (or
    /// the reverse, for a string hint) and taking the first result that is
    /// not itself an object.
    pub fn ordinary_to_primitive(&self, agent: &mut Agent, hint: PreferredType) -> JsResult<JsValue> {
        let method_names: [&str; 2] = match hint {
            PreferredType::String => ["toString", "valueOf"],
            PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
        };
        for name in method_names {
            let method = self.get_v(name, agent)?;
            if method.is_callable() {
                let result = agent.call_function(&method, &JsValue::Object(self.clone()), &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(JsNativeError::typ("cannot convert object to primitive value").into())
    }

    /// `Object.freeze` (spec §4.D): makes every own property
    /// non-configurable, and data properties non-writable too.
    pub fn freeze(&self) {
        self.prevent_extensions();
        for key in self.own_property_keys() {
            if let Some(mut descriptor) = self.get_own_property(&key) {
                descriptor.set_configurable(false);
                if descriptor.is_data_descriptor() {
                    descriptor.set_writable(false);
                }
                self.inner.borrow_mut().properties.insert(&key, descriptor);
            }
        }
    }

    /// `Object.seal`: non-configurable, but data properties stay writable.
    pub fn seal(&self) {
        self.prevent_extensions();
        for key in self.own_property_keys() {
            if let Some(mut descriptor) = self.get_own_property(&key) {
                descriptor.set_configurable(false);
                self.inner.borrow_mut().properties.insert(&key, descriptor);
            }
        }
    }

    pub fn is_sealed(&self) -> bool {
        !self.is_extensible()
            && self.own_property_keys().into_iter().all(|key| {
                self.get_own_property(&key)
                    .is_some_and(|d| !d.configurable().unwrap_or(true))
            })
    }

    pub fn is_frozen(&self) -> bool {
        !self.is_extensible()
            && self.own_property_keys().into_iter().all(|key| {
                self.get_own_property(&key).is_some_and(|d| {
                    !d.configurable().unwrap_or(true)
                        && (!d.is_data_descriptor() || !d.writable().unwrap_or(true))
                })
            })
    }
}

impl From<JsObject> for PropertyKey {
    fn from(_: JsObject) -> Self {
        unreachable!("objects are never used directly as property keys")
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self::String(JsString::new(value))
    }
}

impl From<JsString> for PropertyKey {
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}
