//! The ECMAScript `bigint` primitive type (spec §3, value model component A).

use crate::error::JsNativeError;
use crate::JsResult;
use boa_gc::{empty_trace, Finalize, Trace};
use num_bigint::BigInt as RawBigInt;
use num_traits::{pow::Pow, Signed, ToPrimitive, Zero};
use std::fmt;
use std::rc::Rc;

/// Arbitrary-precision integer value, reference counted so that clones of a
/// [`crate::value::JsValue`] never copy the underlying digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Finalize)]
pub struct JsBigInt {
    inner: Rc<RawBigInt>,
}

unsafe impl Trace for JsBigInt {
    empty_trace!();
}

impl JsBigInt {
    pub fn new<T: Into<Self>>(value: T) -> Self {
        value.into()
    }

    pub fn zero() -> Self {
        Self {
            inner: Rc::new(RawBigInt::zero()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.inner.is_negative()
    }

    pub fn to_f64(&self) -> f64 {
        self.inner.to_f64().unwrap_or(f64::INFINITY)
    }

    pub fn to_string_radix(&self, radix: u32) -> String {
        self.inner.to_str_radix(radix)
    }

    /// Parses a decimal-digit literal produced by the parser (spec §3, the
    /// `Opcode::PushBigInt` payload).
    pub fn from_digits(digits: &str) -> Option<Self> {
        Some(Self {
            inner: Rc::new(RawBigInt::parse_bytes(digits.as_bytes(), 10)?),
        })
    }

    pub fn from_string(mut string: &str) -> Option<Self> {
        string = string.trim();
        if string.is_empty() {
            return Some(Self::zero());
        }
        let mut radix = 10;
        if let Some(rest) = string.strip_prefix("0x").or_else(|| string.strip_prefix("0X")) {
            radix = 16;
            string = rest;
        } else if let Some(rest) = string.strip_prefix("0o").or_else(|| string.strip_prefix("0O")) {
            radix = 8;
            string = rest;
        } else if let Some(rest) = string.strip_prefix("0b").or_else(|| string.strip_prefix("0B")) {
            radix = 2;
            string = rest;
        }
        Some(Self {
            inner: Rc::new(RawBigInt::parse_bytes(string.as_bytes(), radix)?),
        })
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::new(&*self.inner + &*other.inner)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(&*self.inner - &*other.inner)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::new(&*self.inner * &*other.inner)
    }

    pub fn div(&self, other: &Self) -> JsResult<Self> {
        if other.is_zero() {
            return Err(JsNativeError::range("BigInt division by zero").into());
        }
        Ok(Self::new(&*self.inner / &*other.inner))
    }

    pub fn rem(&self, other: &Self) -> JsResult<Self> {
        if other.is_zero() {
            return Err(JsNativeError::range("BigInt division by zero").into());
        }
        Ok(Self::new(&*self.inner % &*other.inner))
    }

    pub fn pow(&self, exponent: &Self) -> JsResult<Self> {
        if exponent.is_negative() {
            return Err(JsNativeError::range("exponent must be positive").into());
        }
        let exponent = exponent
            .inner
            .to_u32()
            .ok_or_else(|| JsNativeError::range("BigInt exponent is too large"))?;
        Ok(Self::new((*self.inner).clone().pow(exponent)))
    }

    pub fn neg(&self) -> Self {
        Self::new(-&*self.inner)
    }

    pub fn not(&self) -> Self {
        Self::new(!&*self.inner)
    }

    pub fn shl(&self, rhs: &Self) -> JsResult<Self> {
        let shift = rhs
            .inner
            .to_i64()
            .ok_or_else(|| JsNativeError::range("BigInt shift amount is too large"))?;
        Ok(if shift >= 0 {
            Self::new(&*self.inner << shift as usize)
        } else {
            Self::new(&*self.inner >> (-shift) as usize)
        })
    }

    pub fn shr(&self, rhs: &Self) -> JsResult<Self> {
        self.shl(&rhs.neg())
    }

    pub fn bitand(&self, other: &Self) -> Self {
        Self::new(&*self.inner & &*other.inner)
    }

    pub fn bitor(&self, other: &Self) -> Self {
        Self::new(&*self.inner | &*other.inner)
    }

    pub fn bitxor(&self, other: &Self) -> Self {
        Self::new(&*self.inner ^ &*other.inner)
    }
}

impl fmt::Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<i32> for JsBigInt {
    fn from(value: i32) -> Self {
        Self {
            inner: Rc::new(RawBigInt::from(value)),
        }
    }
}

impl From<i64> for JsBigInt {
    fn from(value: i64) -> Self {
        Self {
            inner: Rc::new(RawBigInt::from(value)),
        }
    }
}

impl From<RawBigInt> for JsBigInt {
    fn from(value: RawBigInt) -> Self {
        Self {
            inner: Rc::new(value),
        }
    }
}
