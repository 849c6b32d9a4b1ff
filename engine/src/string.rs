//! The ECMAScript `String` primitive type.
//!
//! Grounded on `examples/boa-dev-boa/boa/src/string.rs`'s semantics (strings
//! are UTF-16 code-unit sequences, not code-point sequences, and clones are
//! cheap pointer copies) but backed by a safe `Rc<[u16]>` instead of that
//! file's hand-rolled thin-pointer allocator — see `SPEC_FULL.md`'s note on
//! this simplification.

use boa_gc::{empty_trace, Finalize, Trace};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Clone, Eq, Finalize)]
pub struct JsString {
    units: Rc<[u16]>,
}

unsafe impl Trace for JsString {
    empty_trace!();
}

impl JsString {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self {
            units: s.as_ref().encode_utf16().collect::<Vec<_>>().into(),
        }
    }

    pub fn from_units(units: Vec<u16>) -> Self {
        Self {
            units: units.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    /// Lossy conversion to a Rust `String`; unpaired surrogates become
    /// U+FFFD, as there is no `DOMString`-style surface in this engine.
    pub fn to_std_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut units = Vec::with_capacity(self.units.len() + other.units.len());
        units.extend_from_slice(&self.units);
        units.extend_from_slice(&other.units);
        Self::from_units(units)
    }

    /// A key derived from an integer uses its decimal string form (spec §3,
    /// Property key).
    pub fn from_index(index: u32) -> Self {
        Self::new(index.to_string())
    }

    /// Non-negative array indices route to indexed storage (spec §3).
    pub fn as_array_index(&self) -> Option<u32> {
        let s = self.to_std_string_lossy();
        if s == "0" {
            return Some(0);
        }
        if s.starts_with('0') || s.is_empty() {
            return None;
        }
        let index: u32 = s.parse().ok()?;
        (index.to_string() == s).then_some(index)
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.units.hash(state);
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_std_string_lossy())
    }
}

impl Default for JsString {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for JsString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JsString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
