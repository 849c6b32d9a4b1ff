//! The three error taxonomies of spec §7: user-visible JS throws, parse
//! errors (owned by the external parser, only represented here as an output
//! shape), and engine-internal invariant failures.
//!
//! Grounded on `boa_engine`'s `JsNativeError`/`JsError` split (see
//! `examples/boa-dev-boa/boa_engine/src/builtins/error/mod.rs`'s `ErrorKind`
//! and its surrounding doc comments).

use crate::value::JsValue;
use std::fmt;

/// Result type used throughout the engine for operations that can produce a
/// JS-catchable throw.
pub type JsResult<T> = Result<T, JsError>;

/// A JS throw, carrying the thrown value per spec §3/§7 taxonomy 1.
///
/// Constructed either from an already-built [`JsValue`] (`from_opaque`, used
/// when user code does `throw <expr>`) or from a [`JsNativeError`], which the
/// realm turns into a proper `Error`-subclass object the first time it needs
/// to cross into JS (`JsNativeError::into`/`JsError::from`).
#[derive(Debug, Clone)]
pub struct JsError {
    inner: JsErrorInner,
}

#[derive(Debug, Clone)]
enum JsErrorInner {
    Native(JsNativeError),
    Opaque(JsValue),
}

impl JsError {
    pub fn from_opaque(value: JsValue) -> Self {
        Self {
            inner: JsErrorInner::Opaque(value),
        }
    }

    /// Turns this error into a plain JS value, constructing the backing
    /// `Error` object the first time a native error crosses the boundary
    /// (spec §7: "native functions convert host exceptions into JS throws at
    /// the boundary").
    pub fn to_opaque(&self, agent: &mut crate::agent::Agent) -> JsValue {
        match &self.inner {
            JsErrorInner::Opaque(value) => value.clone(),
            JsErrorInner::Native(native) => native.to_js_value(agent),
        }
    }

    pub fn as_native(&self) -> Option<&JsNativeError> {
        match &self.inner {
            JsErrorInner::Native(native) => Some(native),
            JsErrorInner::Opaque(_) => None,
        }
    }
}

impl From<JsNativeError> for JsError {
    fn from(native: JsNativeError) -> Self {
        Self {
            inner: JsErrorInner::Native(native),
        }
    }
}

/// The kind of a `NativeError` object, mirroring `ErrorKind` in
/// `boa_engine/src/builtins/error/mod.rs`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JsNativeErrorKind {
    Error,
    Type,
    Range,
    Reference,
    Syntax,
    Eval,
    Uri,
}

/// A structured, not-yet-realized JS error: the kind plus a message. Kept
/// separate from the eventual `Error` object so engine code that throws
/// `TypeError`s doesn't need a `&mut Agent` on hand at the call site.
#[derive(Debug, Clone)]
pub struct JsNativeError {
    pub kind: JsNativeErrorKind,
    pub message: String,
}

macro_rules! ctor {
    ($name:ident, $kind:ident) => {
        pub fn $name(message: impl Into<String>) -> Self {
            Self {
                kind: JsNativeErrorKind::$kind,
                message: message.into(),
            }
        }
    };
}

impl JsNativeError {
    ctor!(error, Error);
    ctor!(typ, Type);
    ctor!(range, Range);
    ctor!(reference, Reference);
    ctor!(syntax, Syntax);
    ctor!(eval, Eval);
    ctor!(uri, Uri);

    fn to_js_value(&self, agent: &mut crate::agent::Agent) -> JsValue {
        agent.realm().construct_native_error(self)
    }
}

impl fmt::Display for JsNativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            JsNativeErrorKind::Error => "Error",
            JsNativeErrorKind::Type => "TypeError",
            JsNativeErrorKind::Range => "RangeError",
            JsNativeErrorKind::Reference => "ReferenceError",
            JsNativeErrorKind::Syntax => "SyntaxError",
            JsNativeErrorKind::Eval => "EvalError",
            JsNativeErrorKind::Uri => "URIError",
        };
        write!(f, "{name}: {}", self.message)
    }
}

/// Taxonomy 3 (spec §7): assertion failures, unreachable branches, and
/// not-yet-implemented opcodes. Never catchable by user code; `Agent::run`
/// surfaces these as [`RunOutcome::InternalError`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum InternalError {
    #[error("IR validation failed: {0}")]
    InvalidIr(String),
    #[error("not yet implemented: {0}")]
    Unimplemented(&'static str),
    #[error("unreachable: {0}")]
    Unreachable(String),
}

/// Taxonomy 2 (spec §7): produced by the external parser, never enters the
/// exception channel. The engine never constructs this itself; it exists so
/// [`crate::RunOutcome`] can express "the embedder handed us a parse
/// failure" without inventing a parser.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub reason: String,
    pub start: (u32, u32),
    pub end: (u32, u32),
}
