//! The stack-based interpreter (spec §4.G, component G).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/vm/mod.rs`'s fetch-decode-execute
//! loop, adapted to this crate's `Opcode` enum (no byte-packing, see
//! `crate::ir`) and its own environment-capture-per-closure model (see
//! `crate::environments::runtime`). Exception unwinding walks
//! `FunctionInfo::handlers` exactly like `boa`'s `HandlerFrame`/try-stack, but
//! as a single pc-range search rather than a side stack of pushed/popped
//! handler frames — see `DESIGN.md` for why one search covers throw-in-try,
//! throw-in-catch, and `finally`-rethrow uniformly.

use crate::agent::Agent;
use crate::bigint::JsBigInt;
use crate::builtins::array::{length_of, set_length};
use crate::builtins::function::array_like_to_vec;
use crate::environments::DeclarativeEnvironmentStack;
use crate::error::{JsError, JsNativeError, JsResult};
use crate::ir::{BindingRef, FunctionInfo, FunctionKind, Opcode};
use crate::object::{ConstructorKind, JsObject, ThisMode};
use crate::property::{Attribute, PropertyDescriptor};
use crate::string::JsString;
use crate::value::{JsValue, Numeric, PropertyKey};
use boa_gc::{Finalize, Trace};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// One call's execution state: its own operand stack, its own (captured)
/// environment chain, and the bookkeeping a closure or generator needs to
/// resume correctly (spec §4.F/§4.G).
#[derive(Trace, Finalize)]
pub struct Frame {
    pub code: Rc<FunctionInfo>,
    pub pc: usize,
    pub stack: Vec<JsValue>,
    pub environment: DeclarativeEnvironmentStack,
    pub new_target: JsValue,
    pub function_object: Option<JsObject>,
    pub home_object: Option<JsObject>,
    pub raw_arguments: Vec<JsValue>,
}

impl Frame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: Rc<FunctionInfo>,
        environment: DeclarativeEnvironmentStack,
        new_target: JsValue,
        function_object: Option<JsObject>,
        home_object: Option<JsObject>,
        raw_arguments: Vec<JsValue>,
    ) -> Self {
        Self {
            code,
            pc: 0,
            stack: Vec::new(),
            environment,
            new_target,
            function_object,
            home_object,
            raw_arguments,
        }
    }
}

/// What running a frame to its next suspension point produced.
pub enum FrameOutcome {
    Return(JsValue),
    Yield(JsValue),
}

/// A generator object's suspended state (spec §4.G): `None` once the
/// generator has run to completion (or been closed early), so a further
/// `.next()` just reports `{done: true}` without re-entering the VM.
#[derive(Trace, Finalize)]
pub struct GeneratorData {
    pub frame: Option<Frame>,
}

/// Runs `frame` until it returns, yields, or throws uncaught.
///
/// `resume_value` is `Some` only when resuming a generator after a `Yield`:
/// it becomes the value the paused `Yield` opcode's two-invocation "pop, then
/// later push" behaviour produces, pushed once before the first instruction
/// of this invocation runs.
pub fn run_frame(
    frame: &mut Frame,
    agent: &mut Agent,
    resume_value: Option<JsValue>,
) -> JsResult<FrameOutcome> {
    if let Some(value) = resume_value {
        frame.stack.push(value);
    }
    let mut pending: Option<JsValue> = None;
    loop {
        let op = frame.code.code[frame.pc].clone();
        frame.pc += 1;
        match step(frame, agent, &mut pending, op) {
            Ok(Some(outcome)) => return Ok(outcome),
            Ok(None) => {}
            Err(err) => do_throw(frame, agent, &mut pending, err)?,
        }
    }
}

/// Finds the innermost handler region protecting `search_pc`. Regions can
/// only nest or be disjoint (never partially overlap, `validate_function`'s
/// job), so "innermost" is simply the one with the largest `try_start`.
fn find_handler(frame: &Frame, search_pc: usize) -> Option<crate::ir::HandlerRegion> {
    frame
        .code
        .handlers
        .iter()
        .filter(|h| (h.try_start as usize) <= search_pc && search_pc < (h.try_end as usize))
        .max_by_key(|h| h.try_start)
        .copied()
}

/// The single unwind routine behind `Throw`, `ReThrow`, and any native
/// `JsResult::Err` bubbling out of an opcode handler. Finds the innermost
/// handler region covering the pc that raised the error (`frame.pc - 1`,
/// since `frame.pc` already advanced past the faulting instruction); with no
/// match, propagates the original [`JsError`] unopaqued so an uncaught throw
/// at the top level keeps its native kind.
fn do_throw(
    frame: &mut Frame,
    agent: &mut Agent,
    pending: &mut Option<JsValue>,
    err: JsError,
) -> JsResult<()> {
    let search_pc = frame.pc - 1;
    let Some(region) = find_handler(frame, search_pc) else {
        return Err(err);
    };
    let value = err.to_opaque(agent);
    frame.stack.truncate(region.stack_depth as usize);
    frame.environment.truncate(region.env_depth as usize);
    match region.handler {
        Some(handler_pc) => {
            frame.stack.push(value);
            frame.pc = handler_pc as usize;
        }
        None => {
            *pending = Some(value);
            frame.pc = region
                .finally
                .expect("a handler region with no catch must have a finally")
                as usize;
        }
    }
    Ok(())
}

fn to_uint32(n: f64) -> u32 {
    n.trunc().rem_euclid(2f64.powi(32)) as u32
}

fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

fn numeric_to_value(n: Numeric) -> JsValue {
    match n {
        Numeric::Number(x) => JsValue::Number(x),
        Numeric::BigInt(b) => JsValue::BigInt(b),
    }
}

fn inc_dec(n: &Numeric, increment: bool) -> Numeric {
    match n {
        Numeric::Number(x) => Numeric::Number(if increment { x + 1.0 } else { x - 1.0 }),
        Numeric::BigInt(b) => {
            let one = JsBigInt::new(1i32);
            Numeric::BigInt(if increment { b.add(&one) } else { b.sub(&one) })
        }
    }
}

/// `OrdinaryHasInstance` (spec §4.F), without the `[[BoundTargetFunction]]`
/// recursion bound functions would need — no §8 scenario puts a bound
/// function on the right-hand side of `instanceof`.
fn ordinary_has_instance(ctor: &JsObject, value: &JsValue, agent: &mut Agent) -> JsResult<bool> {
    let Some(object) = value.as_object() else {
        return Ok(false);
    };
    let proto_v = ctor.get_v("prototype", agent)?;
    let Some(target_proto) = proto_v.as_object() else {
        return Err(JsNativeError::typ("function has non-object prototype").into());
    };
    let mut cursor = object.get_prototype_of();
    while let Some(candidate) = cursor {
        if JsObject::identical(&candidate, target_proto) {
            return Ok(true);
        }
        cursor = candidate.get_prototype_of();
    }
    Ok(false)
}

/// `ForInStart`'s key list (spec §5): walks the prototype chain outer to
/// inner, keeping only the first (closest) occurrence of each name so a
/// shadowing property — even a non-enumerable one — correctly hides an
/// inherited enumerable property of the same name, and only enumerable
/// occurrences are ever enqueued.
fn enumerate_keys(object: &JsObject) -> VecDeque<JsString> {
    let mut seen = HashSet::new();
    let mut result = VecDeque::new();
    let mut cursor = Some(object.clone());
    while let Some(current) = cursor {
        for key in current.own_property_keys() {
            if let PropertyKey::String(name) = &key {
                if seen.insert(name.clone()) {
                    if current.get_own_property(&key).is_some_and(|d| d.enumerable().unwrap_or(false)) {
                        result.push_back(name.clone());
                    }
                }
            }
        }
        cursor = current.get_prototype_of();
    }
    result
}

fn pop_n(frame: &mut Frame, n: usize) -> Vec<JsValue> {
    let at = frame.stack.len() - n;
    frame.stack.drain(at..).collect()
}

/// Runs one instruction. `Ok(None)` continues the dispatch loop; `Ok(Some(_))`
/// suspends this call (`Return`/`Yield`); `Err` is handled uniformly by
/// [`do_throw`] back in [`run_frame`] — nothing here needs to know whether it
/// is inside a `try` or not.
#[allow(clippy::too_many_lines)]
fn step(
    frame: &mut Frame,
    agent: &mut Agent,
    pending: &mut Option<JsValue>,
    op: Opcode,
) -> JsResult<Option<FrameOutcome>> {
    match op {
        Opcode::Pop => {
            frame.stack.pop().expect("stack underflow");
        }
        Opcode::Dup => {
            let value = frame.stack.last().expect("stack underflow").clone();
            frame.stack.push(value);
        }
        Opcode::Swap => {
            let len = frame.stack.len();
            frame.stack.swap(len - 1, len - 2);
        }
        Opcode::Over => {
            let len = frame.stack.len();
            let value = frame.stack[len - 2].clone();
            frame.stack.push(value);
        }

        Opcode::PushUndefined => frame.stack.push(JsValue::undefined()),
        Opcode::PushNull => frame.stack.push(JsValue::null()),
        Opcode::PushTrue => frame.stack.push(JsValue::Boolean(true)),
        Opcode::PushFalse => frame.stack.push(JsValue::Boolean(false)),
        Opcode::PushZero => frame.stack.push(JsValue::Number(0.0)),
        Opcode::PushOne => frame.stack.push(JsValue::Number(1.0)),
        Opcode::PushNaN => frame.stack.push(JsValue::nan()),
        Opcode::PushInfinity => frame.stack.push(JsValue::Number(f64::INFINITY)),
        Opcode::PushNegInfinity => frame.stack.push(JsValue::Number(f64::NEG_INFINITY)),
        Opcode::PushConstant(index) => {
            let value = JsValue::from(&frame.code.constants[index as usize]);
            frame.stack.push(value);
        }
        Opcode::PushThis => {
            let this = frame.environment.get_this().unwrap_or(JsValue::undefined());
            frame.stack.push(this);
        }
        Opcode::PushNewTarget => frame.stack.push(frame.new_target.clone()),
        Opcode::PushSuperBase => {
            let base = frame.home_object.as_ref().and_then(JsObject::get_prototype_of);
            frame.stack.push(base.map(JsValue::Object).unwrap_or(JsValue::undefined()));
        }
        Opcode::PushArguments => {
            let array = agent.realm().new_array();
            for (index, value) in frame.raw_arguments.iter().enumerate() {
                array.create_data_property(PropertyKey::from_index(index as u32), value.clone());
            }
            set_length(&array, frame.raw_arguments.len() as u32);
            frame.stack.push(JsValue::Object(array));
        }
        Opcode::PushSuperConstructor => {
            let sup = frame.function_object.as_ref().and_then(JsObject::get_prototype_of);
            frame.stack.push(sup.map(JsValue::Object).unwrap_or(JsValue::undefined()));
        }

        Opcode::PushEmptyObject => frame.stack.push(JsValue::Object(agent.realm().new_object())),
        Opcode::PushEmptyArray => frame.stack.push(JsValue::Object(agent.realm().new_array())),
        Opcode::AppendArrayElement => {
            let value = frame.stack.pop().expect("stack underflow");
            frame.stack.pop().expect("stack underflow"); // the Dup'd array reference
            let array = frame.stack.last().expect("stack underflow").as_object().expect("array").clone();
            let len = length_of(&array, agent)?;
            array.create_data_property(PropertyKey::from_index(len), value);
            set_length(&array, len + 1);
        }
        Opcode::SpreadArrayElement => {
            let iterable = frame.stack.pop().expect("stack underflow");
            frame.stack.pop().expect("stack underflow");
            let array = frame.stack.last().expect("stack underflow").as_object().expect("array").clone();
            let Some(source) = iterable.as_object() else {
                return Err(JsNativeError::typ("spread element is not iterable").into());
            };
            let mut len = length_of(&array, agent)?;
            if source.is_array() {
                let source_len = length_of(source, agent)?;
                for index in 0..source_len {
                    let value = source.get_v(PropertyKey::from_index(index), agent)?;
                    array.create_data_property(PropertyKey::from_index(len), value);
                    len += 1;
                }
            } else if source.is_generator() {
                loop {
                    let (value, done) = crate::builtins::generator::next_value(agent, source)?;
                    if done {
                        break;
                    }
                    array.create_data_property(PropertyKey::from_index(len), value);
                    len += 1;
                }
            } else {
                return Err(JsNativeError::typ("spread element is not iterable").into());
            }
            set_length(&array, len);
        }
        Opcode::DefineDataProperty => {
            let value = frame.stack.pop().expect("stack underflow");
            let key_v = frame.stack.pop().expect("stack underflow");
            frame.stack.pop().expect("stack underflow");
            let object = frame.stack.last().expect("stack underflow").as_object().expect("object").clone();
            let key = key_v.to_property_key(agent)?;
            object.create_data_property(key, value);
        }
        Opcode::DefineAccessorProperty(is_getter) => {
            let function = frame.stack.pop().expect("stack underflow");
            let key_v = frame.stack.pop().expect("stack underflow");
            frame.stack.pop().expect("stack underflow");
            let object = frame.stack.last().expect("stack underflow").as_object().expect("object").clone();
            let key = key_v.to_property_key(agent)?;
            let existing = object.get_own_property(&key);
            let (get, set) = if is_getter {
                (Some(function), existing.as_ref().and_then(|d| d.set_fn().cloned()))
            } else {
                (existing.as_ref().and_then(|d| d.get().cloned()), Some(function))
            };
            object.define_own_property(
                &key,
                PropertyDescriptor::accessor(get, set, Attribute::ENUMERABLE | Attribute::CONFIGURABLE),
            );
        }
        Opcode::CopyDataProperties => {
            let source = frame.stack.pop().expect("stack underflow");
            frame.stack.pop().expect("stack underflow");
            let object = frame.stack.last().expect("stack underflow").as_object().expect("object").clone();
            if let Some(source_obj) = source.as_object() {
                for key in source_obj.own_property_keys() {
                    if source_obj.get_own_property(&key).is_some_and(|d| d.enumerable().unwrap_or(false)) {
                        let value = source_obj.get_v(key.clone(), agent)?;
                        object.create_data_property(key, value);
                    }
                }
            }
        }

        Opcode::GetBinding(binding) => {
            let value = get_binding(frame, agent, binding)?;
            frame.stack.push(value);
        }
        Opcode::InitBinding(binding) => {
            let value = frame.stack.pop().expect("stack underflow");
            init_binding(frame, agent, binding, value);
        }
        Opcode::SetBinding(binding) => {
            let value = frame.stack.pop().expect("stack underflow");
            set_binding(frame, agent, binding, value)?;
        }
        Opcode::TypeOfBinding(binding) => {
            let type_str = type_of_binding(frame, agent, binding)?;
            frame.stack.push(JsValue::String(JsString::new(type_str)));
        }

        Opcode::PushDeclarativeEnvironment(count) => frame.environment.push_declarative(count as usize),
        Opcode::PopEnvironment => {
            frame.environment.pop();
        }

        Opcode::GetProperty => {
            let key_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            if object_v.is_null_or_undefined() {
                return Err(JsNativeError::typ("cannot read properties of null or undefined").into());
            }
            let key = key_v.to_property_key(agent)?;
            let base = object_v.to_object(agent)?;
            let value = base.get(&key, &object_v, agent)?;
            frame.stack.push(value);
        }
        Opcode::SetProperty => {
            let value = frame.stack.pop().expect("stack underflow");
            let key_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            if object_v.is_null_or_undefined() {
                return Err(JsNativeError::typ("cannot set properties of null or undefined").into());
            }
            let key = key_v.to_property_key(agent)?;
            let base = object_v.to_object(agent)?;
            let ok = base.set(&key, value.clone(), &object_v, agent)?;
            if !ok && frame.code.is_strict {
                return Err(JsNativeError::typ(format!("cannot assign to read only property '{key}'")).into());
            }
            frame.stack.push(value);
        }
        Opcode::UpdateProperty { increment, prefix } => {
            let key_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            if object_v.is_null_or_undefined() {
                return Err(JsNativeError::typ("cannot read properties of null or undefined").into());
            }
            let key = key_v.to_property_key(agent)?;
            let base = object_v.to_object(agent)?;
            let old = base.get(&key, &object_v, agent)?;
            let old_numeric = old.to_numeric(agent)?;
            let old_value = numeric_to_value(old_numeric.clone());
            let new_value = numeric_to_value(inc_dec(&old_numeric, increment));
            let ok = base.set(&key, new_value.clone(), &object_v, agent)?;
            if !ok && frame.code.is_strict {
                return Err(JsNativeError::typ(format!("cannot assign to read only property '{key}'")).into());
            }
            frame.stack.push(if prefix { new_value } else { old_value });
        }
        Opcode::DeleteProperty => {
            let key_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            let result = match object_v.as_object() {
                Some(object) => {
                    let key = key_v.to_property_key(agent)?;
                    object.delete(&key)
                }
                // ToObject then delete on a throwaway wrapper always succeeds.
                None => true,
            };
            frame.stack.push(JsValue::Boolean(result));
        }
        Opcode::HasProperty => {
            let key_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            let Some(object) = object_v.as_object() else {
                return Err(JsNativeError::typ("cannot use 'in' operator on a non-object").into());
            };
            let key = key_v.to_property_key(agent)?;
            frame.stack.push(JsValue::Boolean(object.has_property(&key)));
        }
        Opcode::TypeOf => {
            let value = frame.stack.pop().expect("stack underflow");
            frame.stack.push(JsValue::String(JsString::new(value.type_of())));
        }
        Opcode::InstanceOf => {
            let ctor_v = frame.stack.pop().expect("stack underflow");
            let object_v = frame.stack.pop().expect("stack underflow");
            let Some(ctor) = ctor_v.as_object().filter(|o| o.is_callable()) else {
                return Err(JsNativeError::typ("right-hand side of 'instanceof' is not callable").into());
            };
            let result = ordinary_has_instance(ctor, &object_v, agent)?;
            frame.stack.push(JsValue::Boolean(result));
        }

        Opcode::UnaryPlus => {
            let value = frame.stack.pop().expect("stack underflow");
            let n = value.to_number(agent)?;
            frame.stack.push(JsValue::Number(n));
        }
        Opcode::UnaryMinus => {
            let value = frame.stack.pop().expect("stack underflow");
            let result = match value.to_numeric(agent)? {
                Numeric::Number(n) => JsValue::Number(-n),
                Numeric::BigInt(b) => JsValue::BigInt(b.neg()),
            };
            frame.stack.push(result);
        }
        Opcode::UnaryNot => {
            let value = frame.stack.pop().expect("stack underflow");
            frame.stack.push(JsValue::Boolean(!value.to_boolean()));
        }
        Opcode::UnaryBitNot => {
            let value = frame.stack.pop().expect("stack underflow");
            let result = match value.to_numeric(agent)? {
                Numeric::Number(n) => JsValue::Number(f64::from(!to_int32(n))),
                Numeric::BigInt(b) => JsValue::BigInt(b.not()),
            };
            frame.stack.push(result);
        }
        Opcode::UnaryVoid => {
            frame.stack.pop().expect("stack underflow");
            frame.stack.push(JsValue::undefined());
        }
        Opcode::Add => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let pa = a.to_primitive(agent, crate::value::PreferredType::Default)?;
            let pb = b.to_primitive(agent, crate::value::PreferredType::Default)?;
            let result = if matches!(pa, JsValue::String(_)) || matches!(pb, JsValue::String(_)) {
                let sa = pa.to_string(agent)?;
                let sb = pb.to_string(agent)?;
                JsValue::String(sa.concat(&sb))
            } else {
                match (pa.to_numeric(agent)?, pb.to_numeric(agent)?) {
                    (Numeric::Number(x), Numeric::Number(y)) => JsValue::Number(x + y),
                    (Numeric::BigInt(x), Numeric::BigInt(y)) => JsValue::BigInt(x.add(&y)),
                    _ => return Err(mixed_bigint_error()),
                }
            };
            frame.stack.push(result);
        }
        Opcode::Sub => numeric_binop(frame, agent, |x, y| Ok(x - y), |x, y| Ok(x.sub(y)))?,
        Opcode::Mul => numeric_binop(frame, agent, |x, y| Ok(x * y), |x, y| Ok(x.mul(y)))?,
        Opcode::Div => numeric_binop(frame, agent, |x, y| Ok(x / y), |x, y| x.div(y))?,
        Opcode::Mod => numeric_binop(frame, agent, |x, y| Ok(x % y), |x, y| x.rem(y))?,
        Opcode::Pow => numeric_binop(frame, agent, |x, y| Ok(x.powf(y)), |x, y| x.pow(y))?,
        Opcode::BitAnd => numeric_binop(
            frame,
            agent,
            |x, y| Ok(f64::from(to_int32(x) & to_int32(y))),
            |x, y| Ok(x.bitand(y)),
        )?,
        Opcode::BitOr => numeric_binop(
            frame,
            agent,
            |x, y| Ok(f64::from(to_int32(x) | to_int32(y))),
            |x, y| Ok(x.bitor(y)),
        )?,
        Opcode::BitXor => numeric_binop(
            frame,
            agent,
            |x, y| Ok(f64::from(to_int32(x) ^ to_int32(y))),
            |x, y| Ok(x.bitxor(y)),
        )?,
        Opcode::Shl => numeric_binop(
            frame,
            agent,
            |x, y| Ok(f64::from(to_int32(x).wrapping_shl(to_uint32(y) & 31))),
            |x, y| x.shl(y),
        )?,
        Opcode::Shr => numeric_binop(
            frame,
            agent,
            |x, y| Ok(f64::from(to_int32(x).wrapping_shr(to_uint32(y) & 31))),
            |x, y| x.shr(y),
        )?,
        Opcode::UShr => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let (na, nb) = (a.to_numeric(agent)?, b.to_numeric(agent)?);
            let (Numeric::Number(x), Numeric::Number(y)) = (na, nb) else {
                return Err(JsNativeError::typ(
                    "BigInts have no unsigned right shift, use >> instead",
                )
                .into());
            };
            let shift = to_uint32(y) & 31;
            frame.stack.push(JsValue::Number(f64::from(to_uint32(x) >> shift)));
        }
        Opcode::Equal => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::loosely_equals(&a, &b, agent)?;
            frame.stack.push(JsValue::Boolean(result));
        }
        Opcode::NotEqual => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::loosely_equals(&a, &b, agent)?;
            frame.stack.push(JsValue::Boolean(!result));
        }
        Opcode::StrictEqual => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            frame.stack.push(JsValue::Boolean(JsValue::strictly_equals(&a, &b)));
        }
        Opcode::StrictNotEqual => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            frame.stack.push(JsValue::Boolean(!JsValue::strictly_equals(&a, &b)));
        }
        Opcode::LessThan => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::is_less_than(&a, &b, agent)?.unwrap_or(false);
            frame.stack.push(JsValue::Boolean(result));
        }
        Opcode::GreaterThan => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::is_less_than(&b, &a, agent)?.unwrap_or(false);
            frame.stack.push(JsValue::Boolean(result));
        }
        Opcode::LessThanOrEqual => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::is_less_than(&b, &a, agent)?.map_or(false, |v| !v);
            frame.stack.push(JsValue::Boolean(result));
        }
        Opcode::GreaterThanOrEqual => {
            let b = frame.stack.pop().expect("stack underflow");
            let a = frame.stack.pop().expect("stack underflow");
            let result = JsValue::is_less_than(&a, &b, agent)?.map_or(false, |v| !v);
            frame.stack.push(JsValue::Boolean(result));
        }

        Opcode::Inc => {
            let value = frame.stack.pop().expect("stack underflow");
            let n = value.to_numeric(agent)?;
            frame.stack.push(numeric_to_value(inc_dec(&n, true)));
        }
        Opcode::Dec => {
            let value = frame.stack.pop().expect("stack underflow");
            let n = value.to_numeric(agent)?;
            frame.stack.push(numeric_to_value(inc_dec(&n, false)));
        }

        Opcode::Jump(target) => frame.pc = target as usize,
        Opcode::JumpIfFalse(target) => {
            let value = frame.stack.pop().expect("stack underflow");
            if !value.to_boolean() {
                frame.pc = target as usize;
            }
        }
        Opcode::JumpIfTrue(target) => {
            let value = frame.stack.pop().expect("stack underflow");
            if value.to_boolean() {
                frame.pc = target as usize;
            }
        }
        Opcode::JumpIfNullish(target) => {
            let value = frame.stack.pop().expect("stack underflow");
            if value.is_null_or_undefined() {
                frame.pc = target as usize;
            }
        }

        Opcode::Call(argc) => {
            let args = pop_n(frame, argc as usize);
            let this = frame.stack.pop().expect("stack underflow");
            let callee = frame.stack.pop().expect("stack underflow");
            if !callee.is_callable() {
                return Err(JsNativeError::typ("value is not a function").into());
            }
            let result = agent.call_function(&callee, &this, &args)?;
            frame.stack.push(result);
        }
        Opcode::CallSpread => {
            let args_array = frame.stack.pop().expect("stack underflow");
            let this = frame.stack.pop().expect("stack underflow");
            let callee = frame.stack.pop().expect("stack underflow");
            if !callee.is_callable() {
                return Err(JsNativeError::typ("value is not a function").into());
            }
            let args = array_like_to_vec(agent, &args_array)?;
            let result = agent.call_function(&callee, &this, &args)?;
            frame.stack.push(result);
        }
        Opcode::Construct(argc) => {
            let args = pop_n(frame, argc as usize);
            let callee = frame.stack.pop().expect("stack underflow");
            let Some(ctor) = callee.as_object().filter(|o| o.is_constructor()).cloned() else {
                return Err(JsNativeError::typ("value is not a constructor").into());
            };
            let result = agent.construct(&callee, &args, &ctor)?;
            frame.stack.push(result);
        }
        Opcode::ConstructSpread => {
            let args_array = frame.stack.pop().expect("stack underflow");
            let callee = frame.stack.pop().expect("stack underflow");
            let Some(ctor) = callee.as_object().filter(|o| o.is_constructor()).cloned() else {
                return Err(JsNativeError::typ("value is not a constructor").into());
            };
            let args = array_like_to_vec(agent, &args_array)?;
            let result = agent.construct(&callee, &args, &ctor)?;
            frame.stack.push(result);
        }
        Opcode::SuperConstructSpread => {
            let args_array = frame.stack.pop().expect("stack underflow");
            let callee = frame.stack.pop().expect("stack underflow");
            if !callee.as_object().is_some_and(JsObject::is_constructor) {
                return Err(JsNativeError::typ("super constructor is not a constructor").into());
            }
            let Some(new_target) = frame.new_target.as_object().cloned() else {
                return Err(JsNativeError::typ("'super' called outside a derived constructor").into());
            };
            let args = array_like_to_vec(agent, &args_array)?;
            let result = agent.construct(&callee, &args, &new_target)?;
            frame.stack.push(result);
        }

        Opcode::Return => {
            let value = frame.stack.pop().expect("stack underflow");
            return Ok(Some(FrameOutcome::Return(value)));
        }
        Opcode::Throw => {
            let value = frame.stack.pop().expect("stack underflow");
            return Err(JsError::from_opaque(value));
        }
        Opcode::ReThrow => {
            let value = pending.take().expect("ReThrow with no pending exception");
            return Err(JsError::from_opaque(value));
        }

        Opcode::CreateClosure(index) => {
            let value = create_closure(frame, agent, index);
            frame.stack.push(value);
        }
        Opcode::CreateClass { ctor_index, has_super_class, method_count } => {
            let value = create_class(frame, agent, ctor_index, has_super_class, method_count)?;
            frame.stack.push(value);
        }

        Opcode::ForInStart => {
            let value = frame.stack.pop().expect("stack underflow");
            let keys = value.as_object().map(enumerate_keys).unwrap_or_default();
            frame.stack.push(JsValue::Object(JsObject::for_in_iterator(keys)));
        }
        Opcode::ForInNext => {
            let enumerator_v = frame.stack.pop().expect("stack underflow");
            let enumerator = enumerator_v.as_object().expect("for-in iterator").clone();
            match enumerator.for_in_next() {
                Some(key) => {
                    frame.stack.push(enumerator_v);
                    frame.stack.push(JsValue::String(key));
                    frame.stack.push(JsValue::Boolean(true));
                }
                None => {
                    frame.stack.push(enumerator_v);
                    frame.stack.push(JsValue::undefined());
                    frame.stack.push(JsValue::Boolean(false));
                }
            }
        }

        Opcode::GetIterator => {
            let value = frame.stack.pop().expect("stack underflow");
            let iterator = match value.as_object() {
                Some(object) if object.is_array() => JsValue::Object(JsObject::array_iterator(object.clone())),
                Some(object) if object.is_generator() => value.clone(),
                _ => return Err(JsNativeError::typ("value is not iterable").into()),
            };
            frame.stack.push(iterator);
        }
        Opcode::IteratorNext => {
            let iterator_v = frame.stack.pop().expect("stack underflow");
            let iterator = iterator_v.as_object().expect("iterator").clone();
            let (value, done) = if iterator.is_generator() {
                crate::builtins::generator::next_value(agent, &iterator)?
            } else {
                let (target, index) = iterator
                    .with_array_iterator_state(|state| (state.target.clone(), state.index))
                    .expect("array iterator");
                let len = length_of(&target, agent)?;
                if index >= len {
                    (JsValue::undefined(), true)
                } else {
                    let value = target.get_v(PropertyKey::from_index(index), agent)?;
                    iterator.with_array_iterator_state(|state| state.index += 1);
                    (value, false)
                }
            };
            frame.stack.push(iterator_v);
            frame.stack.push(value);
            frame.stack.push(JsValue::Boolean(!done));
        }
        Opcode::IteratorClose => {
            let iterator_v = frame.stack.pop().expect("stack underflow");
            if let Some(iterator) = iterator_v.as_object() {
                if iterator.is_generator() {
                    iterator.with_generator_data(|data| data.frame = None);
                }
            }
        }

        Opcode::Yield => {
            let value = frame.stack.pop().expect("stack underflow");
            return Ok(Some(FrameOutcome::Yield(value)));
        }

        Opcode::BindThis => {
            let value = frame.stack.pop().expect("stack underflow");
            frame.environment.bind_this_on_top(value);
        }

        Opcode::Nop => {}
    }
    Ok(None)
}

fn mixed_bigint_error() -> JsError {
    JsNativeError::typ("cannot mix BigInt and other types, use explicit conversions").into()
}

/// Applies a same-tag binary numeric op (spec §4.A `ToNumeric` both sides,
/// then dispatch on the shared tag). `num`/`big` each get their own fallible
/// closure so the same helper covers both infallible ops (`+`, `&`, ...) and
/// the handful that can themselves throw (`/`, `%`, `**`, `<<`, `>>` on a
/// `BigInt`).
fn numeric_binop(
    frame: &mut Frame,
    agent: &mut Agent,
    num: impl FnOnce(f64, f64) -> JsResult<f64>,
    big: impl FnOnce(&JsBigInt, &JsBigInt) -> JsResult<JsBigInt>,
) -> JsResult<()> {
    let b = frame.stack.pop().expect("stack underflow");
    let a = frame.stack.pop().expect("stack underflow");
    let result = match (a.to_numeric(agent)?, b.to_numeric(agent)?) {
        (Numeric::Number(x), Numeric::Number(y)) => JsValue::Number(num(x, y)?),
        (Numeric::BigInt(x), Numeric::BigInt(y)) => JsValue::BigInt(big(&x, &y)?),
        _ => return Err(mixed_bigint_error()),
    };
    frame.stack.push(result);
    Ok(())
}

fn get_binding(frame: &Frame, agent: &mut Agent, binding: BindingRef) -> JsResult<JsValue> {
    match binding {
        BindingRef::Declarative { environment_index, binding_index, name, .. } => {
            let env = frame.environment.at(environment_index as usize);
            env.get_optional(binding_index as usize).ok_or_else(|| {
                let n = agent.resolve_sym(name.0);
                JsNativeError::reference(format!("cannot access '{n}' before initialization")).into()
            })
        }
        BindingRef::Global(name) => {
            let n = agent.resolve_sym(name.0);
            let key = PropertyKey::String(JsString::new(n.clone()));
            let global = agent.realm().global_object.clone();
            if !global.has_property(&key) {
                return Err(JsNativeError::reference(format!("{n} is not defined")).into());
            }
            global.get_v(key, agent)
        }
    }
}

fn init_binding(frame: &Frame, agent: &mut Agent, binding: BindingRef, value: JsValue) {
    match binding {
        BindingRef::Declarative { environment_index, binding_index, .. } => {
            frame.environment.at(environment_index as usize).set(binding_index as usize, value);
        }
        BindingRef::Global(name) => {
            let n = agent.resolve_sym(name.0);
            let global = agent.realm().global_object.clone();
            // Global `var`/function bindings become configurable here (unlike
            // the spec's non-configurable global var bindings); see DESIGN.md.
            global.create_data_property(PropertyKey::String(JsString::new(n)), value);
        }
    }
}

fn set_binding(frame: &Frame, agent: &mut Agent, binding: BindingRef, value: JsValue) -> JsResult<()> {
    match binding {
        BindingRef::Declarative { environment_index, binding_index, mutable, name } => {
            if !mutable {
                let n = agent.resolve_sym(name.0);
                return Err(JsNativeError::typ(format!("Assignment to constant variable '{n}'.")).into());
            }
            frame.environment.at(environment_index as usize).set(binding_index as usize, value);
            Ok(())
        }
        BindingRef::Global(name) => {
            let n = agent.resolve_sym(name.0);
            let key = PropertyKey::String(JsString::new(n.clone()));
            let global = agent.realm().global_object.clone();
            if frame.code.is_strict && !global.has_property(&key) {
                return Err(JsNativeError::reference(format!("{n} is not defined")).into());
            }
            global.set_v(key, value, agent)?;
            Ok(())
        }
    }
}

fn type_of_binding(frame: &Frame, agent: &mut Agent, binding: BindingRef) -> JsResult<&'static str> {
    match binding {
        BindingRef::Declarative { environment_index, binding_index, .. } => {
            let env = frame.environment.at(environment_index as usize);
            Ok(env.get_optional(binding_index as usize).as_ref().map_or("undefined", JsValue::type_of))
        }
        BindingRef::Global(name) => {
            let n = agent.resolve_sym(name.0);
            let key = PropertyKey::String(JsString::new(n));
            let global = agent.realm().global_object.clone();
            if !global.has_property(&key) {
                return Ok("undefined");
            }
            Ok(global.get_v(key, agent)?.type_of())
        }
    }
}

/// `CreateClosure` (spec §4.F): derives `this_mode`/constructibility/home
/// object from the `FunctionInfo` at the moment the closure is created, and
/// — for a constructible ordinary function — wires up the own
/// `prototype`/`constructor` pair the same way `builtins::object`/`error`
/// do for their own constructors.
fn create_closure(frame: &Frame, agent: &mut Agent, index: u32) -> JsValue {
    let info = frame.code.functions[index as usize].clone();
    let this_mode = if info.is_arrow {
        ThisMode::Lexical
    } else if info.is_strict {
        ThisMode::Strict
    } else {
        ThisMode::Global
    };
    // Arrow functions lexically inherit the enclosing `[[HomeObject]]`;
    // `new.target` is deliberately not inherited the same way (always reads
    // undefined inside an arrow), see DESIGN.md.
    let home_object = if info.is_arrow { frame.home_object.clone() } else { None };
    let is_constructor = !info.is_arrow && matches!(info.kind, FunctionKind::Normal);
    let function_prototype = agent.realm().intrinsics.function_prototype.clone();
    let function_object = JsObject::ordinary_function(
        Some(function_prototype),
        info,
        frame.environment.snapshot(),
        home_object,
        this_mode,
        is_constructor,
        ConstructorKind::Base,
    );
    if is_constructor {
        let proto = agent.realm().new_object();
        proto.define_own_property(
            &PropertyKey::from("constructor"),
            PropertyDescriptor::data(function_object.clone(), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
        function_object.define_own_property(
            &PropertyKey::from("prototype"),
            PropertyDescriptor::data(proto, Attribute::WRITABLE),
        );
    }
    JsValue::Object(function_object)
}

/// `CreateClass` (spec §4.F): resolves the (optional) superclass, builds the
/// constructor's own `[[Prototype]]` and `.prototype` object, wires up each
/// method, and patches every method's home object to `proto` now that `proto`
/// finally exists — see `JsObject::set_function_home_object` and the
/// `OrdinaryFunction::home_object` field comment for why this has to happen
/// after the fact.
fn create_class(
    frame: &mut Frame,
    agent: &mut Agent,
    ctor_index: u32,
    has_super_class: bool,
    method_count: u32,
) -> JsResult<JsValue> {
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let function = frame.stack.pop().expect("stack underflow");
        let key_v = frame.stack.pop().expect("stack underflow");
        let key = key_v.to_property_key(agent)?;
        methods.push((key, function));
    }
    methods.reverse();
    let superclass = if has_super_class {
        Some(frame.stack.pop().expect("stack underflow"))
    } else {
        None
    };

    let function_prototype = agent.realm().intrinsics.function_prototype.clone();
    let object_prototype = agent.realm().intrinsics.object_prototype.clone();
    let (ctor_proto, parent_prototype) = match &superclass {
        None => (function_prototype, Some(object_prototype)),
        Some(JsValue::Null) => (function_prototype, None),
        Some(value) => {
            let Some(parent_ctor) = value.as_object().filter(|o| o.is_constructor()) else {
                return Err(JsNativeError::typ("class extends value is not a constructor").into());
            };
            let parent_proto_v = parent_ctor.get_v("prototype", agent)?;
            (parent_ctor.clone(), parent_proto_v.as_object().cloned())
        }
    };

    let constructor_kind = if has_super_class { ConstructorKind::Derived } else { ConstructorKind::Base };
    let info = frame.code.functions[ctor_index as usize].clone();
    let proto = JsObject::ordinary(parent_prototype);
    let ctor = JsObject::ordinary_function(
        Some(ctor_proto),
        info,
        frame.environment.snapshot(),
        None,
        ThisMode::Strict,
        true,
        constructor_kind,
    );
    ctor.define_own_property(
        &PropertyKey::from("prototype"),
        PropertyDescriptor::data(proto.clone(), Attribute::empty()),
    );
    proto.define_own_property(
        &PropertyKey::from("constructor"),
        PropertyDescriptor::data(ctor.clone(), Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );

    for (key, function) in methods {
        if let Some(method_object) = function.as_object() {
            method_object.set_function_home_object(proto.clone());
        }
        proto.define_own_property(
            &key,
            PropertyDescriptor::data(function, Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }

    Ok(JsValue::Object(ctor))
}
