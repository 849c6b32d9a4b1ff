//! The IR validator (spec §4.E invariant: "every compiled function passes
//! validation before the VM will run it" — jump targets in range, handler
//! regions well-nested, and the operand stack height agreeing at every
//! control-flow join point).

use super::{FunctionInfo, HandlerRegion, Opcode};
use crate::error::InternalError;
use std::collections::VecDeque;

fn stack_effect(op: &Opcode) -> (u32, u32) {
    use Opcode::{
        Add, AppendArrayElement, BindThis, BitAnd, BitOr, BitXor, Call, Construct, ConstructSpread,
        CopyDataProperties, CreateClass, CreateClosure, Dec, DefineAccessorProperty,
        DefineDataProperty, DeleteProperty, Div, Dup, Equal, ForInNext, ForInStart, GetBinding,
        GetIterator, GetProperty, GreaterThan, GreaterThanOrEqual, HasProperty, Inc, InitBinding,
        InstanceOf, IteratorClose, IteratorNext, Jump, JumpIfFalse, JumpIfNullish, JumpIfTrue,
        LessThan, LessThanOrEqual, Mod, Mul, Nop, NotEqual, Over, Pop, Pow, PopEnvironment, PushConstant,
        PushDeclarativeEnvironment, PushEmptyArray, PushEmptyObject, PushFalse, PushInfinity,
        PushArguments, PushNaN, PushNegInfinity, PushNewTarget, PushNull, PushOne, PushSuperBase,
        PushSuperConstructor, PushThis, PushTrue, PushUndefined, PushZero, ReThrow, Return, SetBinding,
        SetProperty, Shl, Shr, SpreadArrayElement, StrictEqual, StrictNotEqual, Sub, SuperConstructSpread,
        Swap, Throw, TypeOf, TypeOfBinding, UShr, UnaryBitNot, UnaryMinus, UnaryNot, UnaryPlus, UnaryVoid,
        UpdateProperty, Yield,
    };
    match op {
        Pop => (1, 0),
        Dup => (1, 2),
        Swap => (2, 2),
        Over => (2, 3),
        BindThis => (1, 0),
        PushUndefined | PushNull | PushTrue | PushFalse | PushZero | PushOne | PushNaN
        | PushInfinity | PushNegInfinity | PushConstant(_) | PushThis | PushNewTarget
        | PushSuperBase | PushSuperConstructor | PushEmptyObject | PushEmptyArray
        | PushArguments => (0, 1),
        AppendArrayElement | SpreadArrayElement | CopyDataProperties => (2, 0),
        DefineDataProperty => (3, 0),
        DefineAccessorProperty(_) => (3, 0),
        GetBinding(_) | TypeOfBinding(_) => (0, 1),
        InitBinding(_) => (1, 0),
        SetBinding(_) => (1, 0),
        PushDeclarativeEnvironment(_) | PopEnvironment => (0, 0),
        GetProperty => (2, 1),
        SetProperty => (3, 1),
        UpdateProperty { .. } => (2, 1),
        DeleteProperty | HasProperty | InstanceOf => (2, 1),
        TypeOf | UnaryPlus | UnaryMinus | UnaryNot | UnaryBitNot | UnaryVoid | Inc | Dec => (1, 1),
        Add | Sub | Mul | Div | Mod | Pow | BitAnd | BitOr | BitXor | Shl | Shr | UShr | Equal
        | NotEqual | StrictEqual | StrictNotEqual | LessThan | LessThanOrEqual | GreaterThan
        | GreaterThanOrEqual => (2, 1),
        Jump(_) => (0, 0),
        JumpIfFalse(_) | JumpIfTrue(_) | JumpIfNullish(_) => (1, 0),
        Call(argc) => (2 + argc, 1),
        Opcode::CallSpread => (3, 1),
        Construct(argc) => (1 + argc, 1),
        ConstructSpread | SuperConstructSpread => (2, 1),
        Return | Throw => (1, 0),
        ReThrow => (0, 0),
        CreateClosure(_) => (0, 1),
        CreateClass { has_super_class, method_count, .. } => {
            (u32::from(*has_super_class) + method_count * 2, 1)
        }
        ForInStart | GetIterator => (1, 1),
        ForInNext => (1, 3),
        IteratorNext => (1, 3),
        IteratorClose => (1, 0),
        Yield => (1, 1),
        Nop => (0, 0),
    }
}

fn jump_target(op: &Opcode) -> Option<u32> {
    match op {
        Opcode::Jump(t) | Opcode::JumpIfFalse(t) | Opcode::JumpIfTrue(t) | Opcode::JumpIfNullish(t) => {
            Some(*t)
        }
        _ => None,
    }
}

fn falls_through(op: &Opcode) -> bool {
    !matches!(op, Opcode::Jump(_) | Opcode::Return | Opcode::Throw | Opcode::ReThrow)
}

/// Validates a single function's bytecode and, recursively, every nested
/// closure template it references.
pub fn validate_function(info: &FunctionInfo) -> Result<(), InternalError> {
    validate_jump_targets(info)?;
    validate_handlers(info)?;
    validate_stack_balance(info)?;
    for nested in &info.functions {
        validate_function(nested)?;
    }
    Ok(())
}

fn validate_jump_targets(info: &FunctionInfo) -> Result<(), InternalError> {
    let len = info.code.len() as u32;
    for (i, op) in info.code.iter().enumerate() {
        if let Some(target) = jump_target(op) {
            if target > len {
                return Err(InternalError::InvalidIr(format!(
                    "instruction {i} jumps to out-of-range target {target}"
                )));
            }
        }
    }
    Ok(())
}

fn validate_handlers(info: &FunctionInfo) -> Result<(), InternalError> {
    let len = info.code.len() as u32;
    for (i, region) in info.handlers.iter().enumerate() {
        if region.try_start > region.try_end || region.try_end > len {
            return Err(InternalError::InvalidIr(format!(
                "handler region {i} has an invalid try range"
            )));
        }
        if let Some(handler) = region.handler {
            if handler > len {
                return Err(InternalError::InvalidIr(format!(
                    "handler region {i}'s catch target is out of range"
                )));
            }
        }
        if let Some(finally) = region.finally {
            if finally > len {
                return Err(InternalError::InvalidIr(format!(
                    "handler region {i}'s finally target is out of range"
                )));
            }
        }
        if region.handler.is_none() && region.finally.is_none() {
            return Err(InternalError::InvalidIr(format!(
                "handler region {i} has neither a catch nor a finally target"
            )));
        }
    }
    // Nesting: later regions fully inside an earlier one, or disjoint.
    for (i, a) in info.handlers.iter().enumerate() {
        for b in info.handlers.iter().skip(i + 1) {
            let disjoint = a.try_end <= b.try_start || b.try_end <= a.try_start;
            let nested = (b.try_start >= a.try_start && b.try_end <= a.try_end)
                || (a.try_start >= b.try_start && a.try_end <= b.try_end);
            if !disjoint && !nested {
                return Err(InternalError::InvalidIr(
                    "handler regions overlap without nesting".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Walks the control-flow graph, tracking the operand-stack height reaching
/// each instruction. Any instruction reachable with two different heights
/// (an unbalanced `if`/loop) is rejected, as is falling off the end of the
/// function with a non-empty stack or returning with the wrong height.
fn validate_stack_balance(info: &FunctionInfo) -> Result<(), InternalError> {
    let len = info.code.len();
    if len == 0 {
        return Ok(());
    }
    let mut height_at: Vec<Option<i64>> = vec![None; len + 1];
    let mut queue = VecDeque::new();
    height_at[0] = Some(0);
    queue.push_back(0usize);
    while let Some(pc) = queue.pop_front() {
        let Some(height) = height_at[pc] else { continue };
        if pc >= len {
            continue;
        }
        let op = &info.code[pc];
        let (pops, pushes) = stack_effect(op);
        if height < i64::from(pops) {
            return Err(InternalError::InvalidIr(format!(
                "instruction {pc} underflows the operand stack"
            )));
        }
        let next_height = height - i64::from(pops) + i64::from(pushes);
        let mut visit = |target: usize, h: i64| -> Result<(), InternalError> {
            match height_at[target] {
                Some(existing) if existing != h => Err(InternalError::InvalidIr(format!(
                    "instruction {target} reachable with inconsistent stack heights {existing} and {h}"
                ))),
                Some(_) => Ok(()),
                None => {
                    height_at[target] = Some(h);
                    queue.push_back(target);
                    Ok(())
                }
            }
        };
        if let Some(target) = jump_target(op) {
            visit(target as usize, next_height)?;
        }
        if falls_through(op) {
            visit(pc + 1, next_height)?;
        }
    }
    match height_at[len] {
        Some(0) | None => Ok(()),
        Some(h) => Err(InternalError::InvalidIr(format!(
            "function falls off its end with {h} values left on the operand stack"
        ))),
    }
}
