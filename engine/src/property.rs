//! Property descriptors and attributes (spec §3/§4.B, component B).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/property.rs`: a descriptor is a
//! bag of optional fields (`PropertyDescriptorBuilder` in the teacher) rather
//! than an up-front enum, since `[[DefineOwnProperty]]` needs to reason about
//! partially-specified descriptors before it knows whether the result is a
//! data or accessor slot.

use crate::value::JsValue;
use boa_gc::{Finalize, Trace};
use std::fmt;

bitflags::bitflags! {
    /// The three boolean attributes every property slot carries (spec §3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        const WRITABLE     = 0b0000_0001;
        const ENUMERABLE   = 0b0000_0010;
        const CONFIGURABLE = 0b0000_0100;
    }
}

impl Attribute {
    /// The attribute set most literal-created properties get: writable,
    /// enumerable, and configurable.
    pub const DEFAULT: Self = Self::WRITABLE.union(Self::ENUMERABLE).union(Self::CONFIGURABLE);

    pub fn writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    pub fn enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    pub fn configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::empty()
    }
}

/// A (possibly partial) property descriptor, as passed to
/// `[[DefineOwnProperty]]` or returned from `[[GetOwnProperty]]` (spec §3).
///
/// Every field is optional so a descriptor built from `Object.defineProperty`
/// can specify only the fields the caller mentioned, per the ECMAScript
/// `ToPropertyDescriptor` abstract operation; [`PropertyDescriptor::complete`]
/// fills the rest with the standard defaults once the final shape (data vs.
/// accessor) is known.
#[derive(Debug, Clone, Default, Trace, Finalize)]
pub struct PropertyDescriptor {
    value: Option<JsValue>,
    get: Option<JsValue>,
    set: Option<JsValue>,
    writable: Option<bool>,
    enumerable: Option<bool>,
    configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn builder() -> PropertyDescriptorBuilder {
        PropertyDescriptorBuilder::default()
    }

    /// A fully-specified writable/enumerable/configurable data property,
    /// the shape most literal and builtin properties use.
    pub fn data(value: impl Into<JsValue>, attributes: Attribute) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(attributes.writable()),
            enumerable: Some(attributes.enumerable()),
            configurable: Some(attributes.configurable()),
            get: None,
            set: None,
        }
    }

    pub fn accessor(get: Option<JsValue>, set: Option<JsValue>, attributes: Attribute) -> Self {
        Self {
            value: None,
            writable: None,
            get,
            set,
            enumerable: Some(attributes.enumerable()),
            configurable: Some(attributes.configurable()),
        }
    }

    pub fn value(&self) -> Option<&JsValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: JsValue) {
        self.value = Some(value);
    }

    pub fn get(&self) -> Option<&JsValue> {
        self.get.as_ref()
    }

    pub fn set_fn(&self) -> Option<&JsValue> {
        self.set.as_ref()
    }

    pub fn writable(&self) -> Option<bool> {
        self.writable
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = Some(writable);
    }

    pub fn enumerable(&self) -> Option<bool> {
        self.enumerable
    }

    pub fn set_enumerable(&mut self, enumerable: bool) {
        self.enumerable = Some(enumerable);
    }

    pub fn configurable(&self) -> Option<bool> {
        self.configurable
    }

    pub fn set_configurable(&mut self, configurable: bool) {
        self.configurable = Some(configurable);
    }

    /// A descriptor is a data descriptor if it specifies `value` or
    /// `writable` (spec §3: "IsDataDescriptor").
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// A descriptor is an accessor descriptor if it specifies `get` or `set`
    /// (spec §3: "IsAccessorDescriptor").
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Neither data nor accessor fields were specified ("IsGenericDescriptor").
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// `CompletePropertyDescriptor` (spec §3): fills in the standard
    /// defaults for whichever fields the partial descriptor left unset,
    /// once its data-vs-accessor shape is fixed.
    pub fn complete(mut self) -> Self {
        if self.is_accessor_descriptor() {
            self.get.get_or_insert(JsValue::undefined());
            self.set.get_or_insert(JsValue::undefined());
        } else {
            self.value.get_or_insert(JsValue::undefined());
            self.writable.get_or_insert(false);
        }
        self.enumerable.get_or_insert(false);
        self.configurable.get_or_insert(false);
        self
    }

    /// `ValidateAndApplyPropertyDescriptor`'s merge step (spec §4.B): applies
    /// `incoming`'s explicitly-set fields on top of `self`, switching the
    /// data/accessor shape entirely if `incoming` specifies the other kind.
    pub fn merged_with(&self, incoming: Self) -> Self {
        let mut merged = if incoming.is_accessor_descriptor() {
            Self {
                get: incoming.get.or_else(|| self.get.clone()),
                set: incoming.set.or_else(|| self.set.clone()),
                value: None,
                writable: None,
                enumerable: self.enumerable,
                configurable: self.configurable,
            }
        } else if incoming.is_data_descriptor() {
            Self {
                value: incoming.value.or_else(|| self.value.clone()),
                writable: incoming.writable.or(self.writable),
                get: None,
                set: None,
                enumerable: self.enumerable,
                configurable: self.configurable,
            }
        } else {
            self.clone()
        };
        if let Some(enumerable) = incoming.enumerable {
            merged.enumerable = Some(enumerable);
        }
        if let Some(configurable) = incoming.configurable {
            merged.configurable = Some(configurable);
        }
        merged
    }

    pub fn to_attribute(&self) -> Attribute {
        let mut attrs = Attribute::empty();
        if self.writable.unwrap_or(false) {
            attrs |= Attribute::WRITABLE;
        }
        if self.enumerable.unwrap_or(false) {
            attrs |= Attribute::ENUMERABLE;
        }
        if self.configurable.unwrap_or(false) {
            attrs |= Attribute::CONFIGURABLE;
        }
        attrs
    }
}

impl fmt::Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_accessor_descriptor() {
            write!(f, "[accessor descriptor]")
        } else {
            write!(f, "[data descriptor]")
        }
    }
}

/// Fluent builder mirroring `boa::property::PropertyDescriptorBuilder`.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptorBuilder {
    descriptor: PropertyDescriptor,
}

impl PropertyDescriptorBuilder {
    pub fn value(mut self, value: impl Into<JsValue>) -> Self {
        self.descriptor.value = Some(value.into());
        self
    }

    pub fn get(mut self, get: impl Into<JsValue>) -> Self {
        self.descriptor.get = Some(get.into());
        self
    }

    pub fn set(mut self, set: impl Into<JsValue>) -> Self {
        self.descriptor.set = Some(set.into());
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.descriptor.writable = Some(writable);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.descriptor.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.descriptor.configurable = Some(configurable);
        self
    }

    pub fn build(self) -> PropertyDescriptor {
        self.descriptor
    }
}
