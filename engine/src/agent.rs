//! The `Agent`: one realm's live execution state (spec §3 `Agent`, §6
//! embedder API), plus the function/constructor call dispatch spec §4.F
//! describes in prose as `Call`/`Construct`.
//!
//! Grounded on `examples/boa-dev-boa/boa/src/context.rs`'s `Context`: a
//! realm plus the call/construct entry points every builtin and the VM
//! itself go through, driven from one handle per execution state. The job
//! (microtask) queue drained explicitly by the embedder is this crate's own
//! reading of spec §6's `blockUntilEmpty()` host hook, not something that
//! era of `Context` had. This engine has no shape/object-id arena the way
//! `boa`'s GC does — `JsObject` identity is a `Gc` pointer (see
//! `object::JsObject::identical`) — so `Agent` carries no counters for
//! either.

use crate::bytecompiler;
use crate::environments::DeclarativeEnvironmentStack;
use crate::error::{InternalError, JsNativeError, JsResult, ParseError};
use crate::ir::FunctionKind;
use crate::object::{
    BoundFunctionData, ConstructorKind, FunctionData, JsObject, NativeFunctionData, OrdinaryFunction,
    ThisMode,
};
use crate::realm::Realm;
use crate::value::{JsValue, PropertyKey};
use crate::vm::{self, Frame, FrameOutcome, GeneratorData};
use boa_gc::Gc;
use boa_interner::{Interner, Sym};
use std::collections::VecDeque;

/// A call target resolved down to the three shapes `Agent::call_function`/
/// `Agent::construct` actually need to dispatch on (spec §4.F: "the internal
/// methods `[[Call]]`/`[[Construct]]` branch on how the function was made").
enum Callable {
    Native(NativeFunctionData),
    Ordinary(Gc<OrdinaryFunction>),
    Bound(Gc<BoundFunctionData>),
}

fn callable_of(object: &JsObject) -> Option<Callable> {
    object.with_function_data(|data| match data {
        FunctionData::Native { data, .. } => Callable::Native(*data),
        FunctionData::Ordinary(f) => Callable::Ordinary(f.clone()),
        FunctionData::Bound(b) => Callable::Bound(b.clone()),
    })
}

/// How the top-level `Agent::run` call (spec §6) finished.
#[derive(Debug)]
pub enum RunOutcome {
    Success(JsValue),
    RuntimeError(JsValue),
    ParseError(ParseError),
    InternalError(InternalError),
}

const DEFAULT_STACK_SIZE_LIMIT: usize = 768;

/// One realm's live execution state (spec §3 `Agent`). Lives for as long as
/// the embedder wants to keep running scripts against the same global
/// object; `interner` is borrowed for that whole lifetime since every
/// `Sym` baked into compiled bytecode is only meaningful against the
/// interner that produced it.
pub struct Agent<'a> {
    realm: Realm,
    interner: &'a Interner,
    call_depth: usize,
    stack_size_limit: usize,
    microtasks: VecDeque<Box<dyn FnOnce(&mut Agent)>>,
    /// Diagnostic flag (spec §6 `agent.printIR`): prints each compiled
    /// `FunctionInfo` before `run` executes it. Not wired to any formatter
    /// here — left for an embedder to read and act on via [`Self::take_ir_dump`].
    pub print_ir: bool,
    ir_dump: Vec<String>,
}

impl<'a> Agent<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            realm: Realm::create(),
            interner,
            call_depth: 0,
            stack_size_limit: DEFAULT_STACK_SIZE_LIMIT,
            microtasks: VecDeque::new(),
            print_ir: false,
            ir_dump: Vec::new(),
        }
    }

    /// Replaces this agent's realm with a fresh one, matching spec §6's
    /// `Agent::make_realm` — a new global object and intrinsic graph, same
    /// interner and job queue.
    pub fn make_realm(&mut self) {
        self.realm = Realm::create();
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    pub fn set_stack_size_limit(&mut self, limit: usize) {
        self.stack_size_limit = limit;
    }

    pub fn resolve_sym(&self, sym: Sym) -> String {
        self.interner
            .resolve(sym)
            .map(|r| r.utf8().unwrap_or_default().to_string())
            .unwrap_or_default()
    }

    pub fn enqueue_microtask(&mut self, job: Box<dyn FnOnce(&mut Agent)>) {
        self.microtasks.push_back(job);
    }

    /// Drains the microtask queue until empty, matching spec §6's informal
    /// `blockUntilEmpty()` host hook: the embedder, not `run` itself, decides
    /// when to call this (running it automatically after every `run` would
    /// be wrong for an embedder pumping several scripts before draining).
    pub fn run_jobs(&mut self) {
        while let Some(job) = self.microtasks.pop_front() {
            job(self);
        }
    }

    /// Compiles and runs `script` to completion (spec §6 `Agent::run`).
    /// Takes an already-parsed AST rather than source text: this engine
    /// never tokenizes or parses (see `SPEC_FULL.md` §1/§6), so a
    /// [`ParseError`] can only ever be handed back verbatim by an embedder
    /// that failed to produce a `Script` at all — `run` itself never
    /// constructs one.
    pub fn run(&mut self, script: &crate::ast::Script, interner: &Interner) -> RunOutcome {
        debug_assert!(
            std::ptr::eq(interner, self.interner),
            "script must have been parsed against this agent's own interner"
        );
        let code = match bytecompiler::compile_script(script, interner) {
            Ok(code) => code,
            Err(err) => return RunOutcome::InternalError(err),
        };
        if self.print_ir {
            self.ir_dump.push(format!("{code:#?}"));
        }
        let mut frame = Frame::new(
            code,
            DeclarativeEnvironmentStack::new(),
            JsValue::undefined(),
            None,
            None,
            Vec::new(),
        );
        match vm::run_frame(&mut frame, self, None) {
            Ok(FrameOutcome::Return(value)) => RunOutcome::Success(value),
            Ok(FrameOutcome::Yield(_)) => {
                RunOutcome::InternalError(InternalError::Unreachable(
                    "top-level script yielded".to_string(),
                ))
            }
            Err(err) => RunOutcome::RuntimeError(err.to_opaque(self)),
        }
    }

    /// Debug/diagnostic output accumulated while `print_ir` was set.
    pub fn take_ir_dump(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ir_dump)
    }

    fn enter_call(&mut self) -> JsResult<()> {
        if self.call_depth >= self.stack_size_limit {
            return Err(JsNativeError::range("call stack size exceeded").into());
        }
        self.call_depth += 1;
        Ok(())
    }

    fn leave_call(&mut self) {
        self.call_depth -= 1;
    }

    /// `Call` (spec §4.F): dispatches on how `callee` was built. Native
    /// functions and bound functions never touch the VM; an ordinary
    /// function either starts a generator (left unrun until `.next()`) or
    /// runs to completion in a fresh [`Frame`].
    pub fn call_function(&mut self, callee: &JsValue, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        let Some(object) = callee.as_object() else {
            return Err(JsNativeError::typ("value is not a function").into());
        };
        let Some(callable) = callable_of(object) else {
            return Err(JsNativeError::typ("value is not a function").into());
        };
        self.enter_call()?;
        let result = self.call_callable(object, callable, this, args);
        self.leave_call();
        result
    }

    fn call_callable(
        &mut self,
        object: &JsObject,
        callable: Callable,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        match callable {
            Callable::Native(data) => (data.call)(self, this, args),
            Callable::Bound(bound) => {
                let mut full_args = bound.bound_args.clone();
                full_args.extend_from_slice(args);
                self.call_function(&bound.target, &bound.bound_this, &full_args)
            }
            Callable::Ordinary(function) => {
                if matches!(function.code.kind, FunctionKind::Generator) {
                    return Ok(JsValue::Object(self.create_generator(object, &function, this, args)));
                }
                let mut frame =
                    build_frame(&function, object.clone(), JsValue::undefined(), this, args, &self.realm);
                match vm::run_frame(&mut frame, self, None)? {
                    FrameOutcome::Return(value) => Ok(value),
                    FrameOutcome::Yield(_) => Err(InternalError::Unreachable(
                        "non-generator function yielded".to_string(),
                    )
                    .into()),
                }
            }
        }
    }

    /// `Construct` (spec §4.F): `new_target` is the object `new.target`
    /// should read as inside the call — ordinarily `callee` itself, but a
    /// derived class's synthesized `super(...)` call passes the
    /// most-derived class instead (see `ir::Opcode::SuperConstructSpread`).
    pub fn construct(&mut self, callee: &JsValue, args: &[JsValue], new_target: &JsObject) -> JsResult<JsValue> {
        let Some(object) = callee.as_object() else {
            return Err(JsNativeError::typ("value is not a constructor").into());
        };
        if !object.is_constructor() {
            return Err(JsNativeError::typ("value is not a constructor").into());
        }
        let Some(callable) = callable_of(object) else {
            return Err(JsNativeError::typ("value is not a constructor").into());
        };
        self.enter_call()?;
        let result = self.construct_callable(object, callable, args, new_target);
        self.leave_call();
        result
    }

    fn construct_callable(
        &mut self,
        object: &JsObject,
        callable: Callable,
        args: &[JsValue],
        new_target: &JsObject,
    ) -> JsResult<JsValue> {
        match callable {
            Callable::Native(data) => {
                let construct = data
                    .construct
                    .expect("is_constructor already checked this has one");
                construct(self, args, new_target)
            }
            Callable::Bound(_) => Err(InternalError::Unreachable(
                "bound functions are never constructible in this engine".to_string(),
            )
            .into()),
            Callable::Ordinary(function) => {
                let this_object = self.ordinary_create_from_constructor(new_target)?;
                let this_value = if function.constructor_kind == ConstructorKind::Derived {
                    JsValue::undefined()
                } else {
                    JsValue::Object(this_object.clone())
                };
                let mut frame = build_frame(
                    &function,
                    object.clone(),
                    JsValue::Object(new_target.clone()),
                    &this_value,
                    args,
                    &self.realm,
                );
                match vm::run_frame(&mut frame, self, None)? {
                    FrameOutcome::Return(JsValue::Object(obj)) => Ok(JsValue::Object(obj)),
                    FrameOutcome::Return(_) if function.constructor_kind == ConstructorKind::Derived => {
                        Ok(frame.environment.get_this().unwrap_or(JsValue::Object(this_object)))
                    }
                    FrameOutcome::Return(_) => Ok(JsValue::Object(this_object)),
                    FrameOutcome::Yield(_) => Err(InternalError::Unreachable(
                        "constructor yielded".to_string(),
                    )
                    .into()),
                }
            }
        }
    }

    /// `OrdinaryCreateFromConstructor` (spec §4.F): the new object's
    /// `[[Prototype]]` is `new_target.prototype` if that is an object, else
    /// falls back to `%Object.prototype%` ("extends null" and similar — see
    /// `DESIGN.md`).
    fn ordinary_create_from_constructor(&mut self, new_target: &JsObject) -> JsResult<JsObject> {
        let proto_v = new_target.get_v("prototype", self)?;
        let prototype = proto_v
            .as_object()
            .cloned()
            .unwrap_or_else(|| self.realm.intrinsics.object_prototype.clone());
        Ok(JsObject::ordinary(Some(prototype)))
    }

    /// Builds a not-yet-run generator object (spec §4.G): the frame is
    /// constructed eagerly but the VM never sees it until the first
    /// `.next()` call resumes it, matching `next_value`'s contract in
    /// `builtins::generator`.
    fn create_generator(
        &mut self,
        object: &JsObject,
        function: &Gc<OrdinaryFunction>,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsObject {
        let frame = build_frame(function, object.clone(), JsValue::undefined(), this, args, &self.realm);
        let prototype = self.realm.intrinsics.generator_prototype.clone();
        JsObject::generator(Some(prototype), GeneratorData { frame: Some(frame) })
    }
}

/// Builds the fresh [`Frame`] a non-generator call, constructor call, or
/// generator start all share: the closure's captured environment chain plus
/// one more function-scope environment binding `this` and the parameters
/// (spec §4.F "FunctionDeclarationInstantiation", trimmed to what this
/// engine supports — see `SPEC_FULL.md` §9 open questions for why
/// destructuring/default-value parameters aren't here).
fn build_frame(
    function: &Gc<OrdinaryFunction>,
    function_object: JsObject,
    new_target: JsValue,
    this: &JsValue,
    args: &[JsValue],
    realm: &Realm,
) -> Frame {
    let code = function.code.clone();
    let mut environment = function.environment.snapshot();
    let this_value = match function.this_mode {
        ThisMode::Lexical => None,
        ThisMode::Strict => Some(this.clone()),
        // Non-strict ("global") `this` coercion (spec §4.F `OrdinaryCallBindThis`):
        // `undefined`/`null` become the global object, and a primitive is boxed
        // through the realm's wrapper prototypes so `this.valueOf` etc. resolve.
        ThisMode::Global => Some(match this {
            JsValue::Undefined | JsValue::Null => JsValue::Object(realm.global_object.clone()),
            JsValue::Boolean(b) => JsValue::Object(realm.wrap_boolean(*b)),
            JsValue::Number(n) => JsValue::Object(realm.wrap_number(*n)),
            JsValue::String(s) => JsValue::Object(realm.wrap_string(s.clone())),
            JsValue::Symbol(s) => JsValue::Object(realm.wrap_symbol(s.clone())),
            JsValue::BigInt(b) => JsValue::Object(realm.wrap_bigint(b.clone())),
            other => other.clone(),
        }),
    };
    environment.push_function(code.num_own_bindings, this_value);
    {
        let env = environment.at(environment.len() - 1);
        for i in 0..code.param_count {
            let value = args.get(i).cloned().unwrap_or(JsValue::undefined());
            env.set(i, value);
        }
        if code.has_rest {
            let rest = args.get(code.param_count..).unwrap_or(&[]);
            let array = realm.new_array();
            for (i, value) in rest.iter().enumerate() {
                array.create_data_property(PropertyKey::from_index(i as u32), value.clone());
            }
            crate::builtins::array::set_length(&array, rest.len() as u32);
            env.set(code.param_count, JsValue::Object(array));
        }
    }
    let home_object = function.home_object.borrow().clone();
    Frame::new(code, environment, new_target, Some(function_object), home_object, args.to_vec())
}
