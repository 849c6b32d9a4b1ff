//! The ECMAScript `Symbol` primitive type.

use crate::string::JsString;
use boa_gc::{empty_trace, Finalize, Trace};
use std::cell::Cell;
use std::rc::Rc;

thread_local! {
    static NEXT_SYMBOL_ID: Cell<u64> = const { Cell::new(1) };
}

struct Inner {
    id: u64,
    description: Option<JsString>,
}

/// A unique, optionally-described symbol value.
///
/// Two `JsSymbol`s are only ever equal if they are clones of the same
/// allocation (`Rc::ptr_eq`), matching the "unique identity" invariant in
/// spec §3.
#[derive(Clone, Finalize)]
pub struct JsSymbol {
    inner: Rc<Inner>,
}

unsafe impl Trace for JsSymbol {
    empty_trace!();
}

impl JsSymbol {
    pub fn new(description: Option<JsString>) -> Self {
        let id = NEXT_SYMBOL_ID.with(|cell| {
            let id = cell.get();
            cell.set(id + 1);
            id
        });
        Self {
            inner: Rc::new(Inner { id, description }),
        }
    }

    pub fn description(&self) -> Option<&JsString> {
        self.inner.description.as_ref()
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for JsSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Symbol({})",
            self.description()
                .map(|d| d.to_std_string_lossy())
                .unwrap_or_default()
        )
    }
}

/// The realm's well-known symbol registry (spec §3 Realm, §4.D).
#[derive(Debug, Clone, Trace, Finalize)]
pub struct WellKnownSymbols {
    pub iterator: JsSymbol,
    pub async_iterator: JsSymbol,
    pub to_primitive: JsSymbol,
    pub has_instance: JsSymbol,
    pub to_string_tag: JsSymbol,
}

impl WellKnownSymbols {
    pub fn new() -> Self {
        Self {
            iterator: JsSymbol::new(Some(JsString::new("Symbol.iterator"))),
            async_iterator: JsSymbol::new(Some(JsString::new("Symbol.asyncIterator"))),
            to_primitive: JsSymbol::new(Some(JsString::new("Symbol.toPrimitive"))),
            has_instance: JsSymbol::new(Some(JsString::new("Symbol.hasInstance"))),
            to_string_tag: JsSymbol::new(Some(JsString::new("Symbol.toStringTag"))),
        }
    }
}

impl Default for WellKnownSymbols {
    fn default() -> Self {
        Self::new()
    }
}
