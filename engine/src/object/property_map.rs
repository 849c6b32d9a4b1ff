//! Backing storage for an ordinary object's own properties.
//!
//! Grounded on `examples/boa-dev-boa/boa/src/object/property_map.rs`: a
//! `FxHashMap` for the dense integer-index slots and insertion-ordered
//! `IndexMap`s for string and symbol slots, so `[[OwnPropertyKeys]]` can
//! produce the spec-mandated order (ascending indices, then strings in
//! insertion order, then symbols in insertion order) cheaply.

use crate::property::PropertyDescriptor;
use crate::string::JsString;
use crate::symbol::JsSymbol;
use crate::value::PropertyKey;
use boa_gc::{custom_trace, Finalize, Trace};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::BuildHasherDefault;

#[derive(Debug, Finalize)]
struct OrderedHashMap<K: Trace>(IndexMap<K, PropertyDescriptor, BuildHasherDefault<FxHasher>>);

impl<K: Trace> Default for OrderedHashMap<K> {
    fn default() -> Self {
        Self(IndexMap::with_hasher(BuildHasherDefault::default()))
    }
}

unsafe impl<K: Trace> Trace for OrderedHashMap<K> {
    custom_trace!(this, {
        for (k, v) in this.0.iter() {
            mark(k);
            mark(v);
        }
    });
}

#[derive(Default, Debug, Trace, Finalize)]
pub struct PropertyMap {
    indexed: FxHashMap<u32, PropertyDescriptor>,
    strings: OrderedHashMap<JsString>,
    symbols: OrderedHashMap<JsSymbol>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        if let Some(index) = key.as_array_index() {
            return self.indexed.get(&index);
        }
        match key {
            PropertyKey::String(s) => self.strings.0.get(s),
            PropertyKey::Symbol(s) => self.symbols.0.get(s),
        }
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        if let Some(index) = key.as_array_index() {
            return self.indexed.get_mut(&index);
        }
        match key {
            PropertyKey::String(s) => self.strings.0.get_mut(s),
            PropertyKey::Symbol(s) => self.symbols.0.get_mut(s),
        }
    }

    pub fn insert(&mut self, key: &PropertyKey, descriptor: PropertyDescriptor) {
        if let Some(index) = key.as_array_index() {
            self.indexed.insert(index, descriptor);
            return;
        }
        match key {
            PropertyKey::String(s) => {
                self.strings.0.insert(s.clone(), descriptor);
            }
            PropertyKey::Symbol(s) => {
                self.symbols.0.insert(s.clone(), descriptor);
            }
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        if let Some(index) = key.as_array_index() {
            return self.indexed.remove(&index);
        }
        match key {
            PropertyKey::String(s) => self.strings.0.shift_remove(s),
            PropertyKey::Symbol(s) => self.symbols.0.shift_remove(s),
        }
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.strings.0.is_empty() && self.symbols.0.is_empty()
    }

    /// `[[OwnPropertyKeys]]` order (spec §3/§4.B): ascending integer indices,
    /// then string keys in insertion order, then symbol keys in insertion
    /// order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self.indexed.keys().copied().collect();
        indices.sort_unstable();
        let mut keys: Vec<PropertyKey> =
            indices.into_iter().map(PropertyKey::from_index).collect();
        keys.extend(self.strings.0.keys().cloned().map(PropertyKey::String));
        keys.extend(self.symbols.0.keys().cloned().map(PropertyKey::Symbol));
        keys
    }
}
