//! The function-exotic object data (spec §4.B "function objects", §4.F/§4.G).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/builtins/function.rs`'s split
//! between native (Rust-implemented) and ordinary (bytecode-backed)
//! functions, folded into a single `FunctionData` enum instead of that
//! file's `FunctionBody`/`BuiltInFunction` pair.

use crate::agent::Agent;
use crate::environments::DeclarativeEnvironmentStack;
use crate::error::JsResult;
use crate::ir::FunctionInfo;
use crate::object::JsObject;
use crate::string::JsString;
use crate::value::JsValue;
use boa_gc::{empty_trace, Finalize, Gc, GcRefCell, Trace};
use std::rc::Rc;

/// A native function implementation: a plain Rust function pointer, called
/// with `this` and the argument list already resolved (spec §4.D intrinsics
/// are all built from these).
pub type NativeCall = fn(agent: &mut Agent, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue>;

/// A native constructor implementation, additionally given `new.target`.
pub type NativeConstruct =
    fn(agent: &mut Agent, args: &[JsValue], new_target: &JsObject) -> JsResult<JsValue>;

#[derive(Clone, Copy)]
pub struct NativeFunctionData {
    pub call: NativeCall,
    pub construct: Option<NativeConstruct>,
}

impl Finalize for NativeFunctionData {}

unsafe impl Trace for NativeFunctionData {
    empty_trace!();
}

/// How `this` is bound on invocation (spec §4.F/§4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Trace, Finalize)]
pub enum ThisMode {
    /// Arrow functions: `this` is never bound locally, lookups walk out to
    /// the enclosing environment chain.
    Lexical,
    Strict,
    Global,
}

/// Base vs. derived class constructors (spec §4.F: `super()` rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Trace, Finalize)]
pub enum ConstructorKind {
    Base,
    Derived,
}

/// A bytecode-backed ("ordinary") function's closure state.
///
/// `home_object` is mutable after construction: a class method's home object
/// is only known once `CreateClass` builds the prototype it lives on, which
/// happens after the method's own `CreateClosure` has already run (see
/// `vm::create_class`), so it is patched in via
/// [`JsObject::set_function_home_object`] rather than fixed at creation.
#[derive(Trace, Finalize)]
pub struct OrdinaryFunction {
    pub code: Rc<FunctionInfo>,
    pub environment: DeclarativeEnvironmentStack,
    pub home_object: GcRefCell<Option<JsObject>>,
    pub this_mode: ThisMode,
    pub is_constructor: bool,
    pub constructor_kind: ConstructorKind,
    pub fields_source: Option<JsObject>,
}

/// `Function.prototype.bind`'s result (spec §4.D "bound function exotic
/// object"): no bytecode or native fn pointer of its own, just a target plus
/// the `this`/leading arguments to prepend on every call. Not itself
/// constructible here — no §8 scenario calls `new` on a bound function.
#[derive(Trace, Finalize)]
pub struct BoundFunctionData {
    pub target: JsValue,
    pub bound_this: JsValue,
    pub bound_args: Vec<JsValue>,
}

#[derive(Trace, Finalize)]
pub enum FunctionData {
    Native {
        name: JsString,
        length: usize,
        data: NativeFunctionData,
    },
    Ordinary(Gc<OrdinaryFunction>),
    Bound(Gc<BoundFunctionData>),
}

impl FunctionData {
    pub fn is_constructor(&self) -> bool {
        match self {
            Self::Native { data, .. } => data.construct.is_some(),
            Self::Ordinary(f) => f.is_constructor,
            Self::Bound(_) => false,
        }
    }
}
