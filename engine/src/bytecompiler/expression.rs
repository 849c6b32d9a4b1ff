//! Lowers [`crate::ast::Expression`] to bytecode. Every arm leaves exactly
//! one value on the operand stack, matching [`crate::ir::validate`]'s fixed
//! per-opcode stack-effect rule.

use super::{ByteCompiler, CompileResult};
use crate::ast::{
    ArrayElement, AssignOp, BinaryOp, Class, ClassElementKind, Expression, Function, FunctionKind,
    Literal, LogicalOp, MemberKey, MethodKind, ObjectProperty, Parameters, PropertyName, UnaryOp,
    UpdateOp,
};
use crate::bigint::JsBigInt;
use crate::error::InternalError;
use crate::ir::{validate_function, Constant, FunctionInfo, FunctionKind as IrFunctionKind, Opcode};
use std::rc::Rc;

impl<'a> ByteCompiler<'a> {
    pub(super) fn compile_expression(&mut self, expr: &Expression) -> CompileResult<()> {
        match expr {
            Expression::This => {
                self.emit(Opcode::PushThis);
            }
            Expression::NewTarget => {
                self.emit(Opcode::PushNewTarget);
            }
            Expression::SuperBase => {
                self.emit(Opcode::PushSuperBase);
            }
            Expression::SuperCall(_) => {
                return Err(InternalError::Unimplemented("super() calls"));
            }
            Expression::Identifier(sym) => self.compile_identifier(*sym),
            Expression::Literal(literal) => self.compile_literal(literal)?,
            Expression::ArrayLiteral(elements) => self.compile_array_literal(elements)?,
            Expression::ObjectLiteral(properties) => self.compile_object_literal(properties)?,
            Expression::TemplateLiteral(template) => {
                let mut parts = template.cooked.iter();
                let first = parts.next().expect("a template always has a head chunk");
                let index = self.push_string_constant(*first);
                self.emit(Opcode::PushConstant(index));
                for (expr, cooked) in template.expressions.iter().zip(parts) {
                    self.compile_expression(expr)?;
                    self.emit(Opcode::Add);
                    let index = self.push_string_constant(*cooked);
                    self.emit(Opcode::PushConstant(index));
                    self.emit(Opcode::Add);
                }
            }
            Expression::Function(func) | Expression::ArrowFunction(func) => {
                let index = self.compile_nested_function(func)?;
                self.emit(Opcode::CreateClosure(index));
            }
            Expression::Class(class) => self.compile_class(class)?,
            Expression::Unary(op, operand) => self.compile_unary(*op, operand)?,
            Expression::Update { op, prefix, target } => {
                self.compile_update(*op, *prefix, target)?;
            }
            Expression::Binary(op, left, right) => self.compile_binary(*op, left, right)?,
            Expression::Logical(op, left, right) => self.compile_logical(*op, left, right)?,
            Expression::Conditional { test, consequent, alternate } => {
                self.compile_expression(test)?;
                let to_alt = self.emit(Opcode::JumpIfFalse(0));
                self.compile_expression(consequent)?;
                let to_end = self.emit(Opcode::Jump(0));
                self.patch_jump_here(to_alt);
                self.compile_expression(alternate)?;
                self.patch_jump_here(to_end);
            }
            Expression::Assign { op, target, value } => self.compile_assign(*op, target, value)?,
            Expression::Sequence(expressions) => {
                let (last, init) = expressions
                    .split_last()
                    .expect("a comma expression always has at least one operand");
                for expr in init {
                    self.compile_expression(expr)?;
                    self.emit(Opcode::Pop);
                }
                self.compile_expression(last)?;
            }
            Expression::Call { callee, arguments, optional } => {
                self.compile_call(callee, arguments, *optional)?;
            }
            Expression::New { callee, arguments } => self.compile_new(callee, arguments)?,
            Expression::Member { object, key, optional } => {
                self.compile_member(object, key, *optional)?;
            }
            Expression::Spread(_) => {
                return Err(InternalError::Unreachable(
                    "a spread element can only appear inside an array literal or argument list"
                        .to_string(),
                ));
            }
            Expression::Yield { argument, delegate } => {
                if *delegate {
                    return Err(InternalError::Unimplemented("yield*"));
                }
                match argument {
                    Some(argument) => self.compile_expression(argument)?,
                    None => {
                        self.emit(Opcode::PushUndefined);
                    }
                }
                self.emit(Opcode::Yield);
            }
            Expression::Await(_) => return Err(InternalError::Unimplemented("await")),
            Expression::RegExpLiteral { .. } => {
                return Err(InternalError::Unimplemented("regular expression literals"))
            }
        }
        Ok(())
    }

    fn compile_identifier(&mut self, sym: boa_interner::Sym) {
        // Only the parameter list is consulted for shadowing (see
        // `FunctionInfo::has_lexical_arguments`); this mirrors that same
        // simplification rather than re-deriving it from `self.scope`,
        // which also sees enclosing functions' bindings and would wrongly
        // suppress this function's own implicit `arguments` object if an
        // outer function happens to bind that name.
        if !self.is_arrow && !self.has_lexical_arguments && self.resolve_sym(sym) == "arguments" {
            self.emit(Opcode::PushArguments);
            return;
        }
        let binding = self.resolve_binding(sym);
        self.emit(Opcode::GetBinding(binding));
    }

    fn compile_literal(&mut self, literal: &Literal) -> CompileResult<()> {
        match literal {
            Literal::Undefined => {
                self.emit(Opcode::PushUndefined);
            }
            Literal::Null => {
                self.emit(Opcode::PushNull);
            }
            Literal::Bool(true) => {
                self.emit(Opcode::PushTrue);
            }
            Literal::Bool(false) => {
                self.emit(Opcode::PushFalse);
            }
            Literal::Num(n) => self.compile_number(*n),
            Literal::BigInt(sym) => {
                let digits = self.resolve_sym(*sym);
                let value = JsBigInt::from_digits(&digits).ok_or_else(|| {
                    InternalError::Unreachable(format!("invalid bigint literal digits {digits:?}"))
                })?;
                let index = self.push_constant(Constant::BigInt(value));
                self.emit(Opcode::PushConstant(index));
            }
            Literal::Str(sym) => {
                let index = self.push_string_constant(*sym);
                self.emit(Opcode::PushConstant(index));
            }
        }
        Ok(())
    }

    fn compile_number(&mut self, n: f64) {
        if n == 0.0 && n.is_sign_positive() {
            self.emit(Opcode::PushZero);
        } else if n == 1.0 {
            self.emit(Opcode::PushOne);
        } else if n.is_nan() {
            self.emit(Opcode::PushNaN);
        } else if n == f64::INFINITY {
            self.emit(Opcode::PushInfinity);
        } else if n == f64::NEG_INFINITY {
            self.emit(Opcode::PushNegInfinity);
        } else {
            let index = self.push_constant(Constant::Number(n));
            self.emit(Opcode::PushConstant(index));
        }
    }

    fn compile_array_literal(&mut self, elements: &[Option<ArrayElement>]) -> CompileResult<()> {
        self.emit(Opcode::PushEmptyArray);
        for element in elements {
            match element {
                None | Some(ArrayElement::Elision) => {
                    self.emit(Opcode::Dup);
                    self.emit(Opcode::PushUndefined);
                    self.emit(Opcode::AppendArrayElement);
                }
                Some(ArrayElement::Item(expr)) => {
                    self.emit(Opcode::Dup);
                    self.compile_expression(expr)?;
                    self.emit(Opcode::AppendArrayElement);
                }
                Some(ArrayElement::Spread(expr)) => {
                    self.emit(Opcode::Dup);
                    self.compile_expression(expr)?;
                    self.emit(Opcode::SpreadArrayElement);
                }
            }
        }
        Ok(())
    }

    fn compile_object_literal(&mut self, properties: &[ObjectProperty]) -> CompileResult<()> {
        self.emit(Opcode::PushEmptyObject);
        for property in properties {
            match property {
                ObjectProperty::Property { name, value } => {
                    self.emit(Opcode::Dup);
                    self.push_property_name(name)?;
                    self.compile_expression(value)?;
                    self.emit(Opcode::DefineDataProperty);
                }
                ObjectProperty::Shorthand(sym) => {
                    self.emit(Opcode::Dup);
                    let index = self.push_string_constant(*sym);
                    self.emit(Opcode::PushConstant(index));
                    self.compile_identifier(*sym);
                    self.emit(Opcode::DefineDataProperty);
                }
                ObjectProperty::Method { name, kind, function } => match kind {
                    MethodKind::Normal => {
                        self.emit(Opcode::Dup);
                        self.push_property_name(name)?;
                        let index = self.compile_nested_function(function)?;
                        self.emit(Opcode::CreateClosure(index));
                        self.emit(Opcode::DefineDataProperty);
                    }
                    MethodKind::Get | MethodKind::Set => {
                        self.emit(Opcode::Dup);
                        self.push_property_name(name)?;
                        let index = self.compile_nested_function(function)?;
                        self.emit(Opcode::CreateClosure(index));
                        self.emit(Opcode::DefineAccessorProperty(*kind == MethodKind::Get));
                    }
                    MethodKind::Generator | MethodKind::Async | MethodKind::AsyncGenerator => {
                        return Err(InternalError::Unimplemented(
                            "generator/async object literal methods",
                        ));
                    }
                },
                ObjectProperty::Spread(expr) => {
                    self.emit(Opcode::Dup);
                    self.compile_expression(expr)?;
                    self.emit(Opcode::CopyDataProperties);
                }
            }
        }
        Ok(())
    }

    fn push_property_name(&mut self, name: &PropertyName) -> CompileResult<()> {
        match name {
            PropertyName::Named(sym) => {
                let index = self.push_string_constant(*sym);
                self.emit(Opcode::PushConstant(index));
            }
            PropertyName::Computed(expr) => self.compile_expression(expr)?,
        }
        Ok(())
    }

    pub(super) fn push_member_key(&mut self, key: &MemberKey) -> CompileResult<()> {
        match key {
            MemberKey::Named(sym) => {
                let index = self.push_string_constant(*sym);
                self.emit(Opcode::PushConstant(index));
            }
            MemberKey::Computed(expr) => self.compile_expression(expr)?,
            MemberKey::Private(_) => {
                return Err(InternalError::Unimplemented("private class fields"))
            }
        }
        Ok(())
    }

    /// Drops the `n` items sitting directly below the top of the stack,
    /// leaving the top value in place. Built from `Swap`/`Pop` since the IR
    /// has no direct "remove below top" primitive.
    fn emit_drop_below_top(&mut self, n: usize) {
        for _ in 0..n {
            self.emit(Opcode::Swap);
            self.emit(Opcode::Pop);
        }
    }

    fn compile_unary(&mut self, op: UnaryOp, operand: &Expression) -> CompileResult<()> {
        match op {
            UnaryOp::Void => {
                self.compile_expression(operand)?;
                self.emit(Opcode::UnaryVoid);
            }
            UnaryOp::TypeOf => {
                if let Expression::Identifier(sym) = operand {
                    let binding = self.resolve_binding(*sym);
                    self.emit(Opcode::TypeOfBinding(binding));
                } else {
                    self.compile_expression(operand)?;
                    self.emit(Opcode::TypeOf);
                }
            }
            UnaryOp::Delete => {
                if let Expression::Member { object, key, .. } = operand {
                    self.compile_expression(object)?;
                    self.push_member_key(key)?;
                    self.emit(Opcode::DeleteProperty);
                } else {
                    // Deleting anything that isn't a property reference is a
                    // no-op that always succeeds (spec `UnaryExpression :
                    // delete UnaryExpression`, non-reference case).
                    self.emit(Opcode::PushTrue);
                }
            }
            UnaryOp::Plus => {
                self.compile_expression(operand)?;
                self.emit(Opcode::UnaryPlus);
            }
            UnaryOp::Minus => {
                self.compile_expression(operand)?;
                self.emit(Opcode::UnaryMinus);
            }
            UnaryOp::BitNot => {
                self.compile_expression(operand)?;
                self.emit(Opcode::UnaryBitNot);
            }
            UnaryOp::Not => {
                self.compile_expression(operand)?;
                self.emit(Opcode::UnaryNot);
            }
        }
        Ok(())
    }

    fn compile_update(&mut self, op: UpdateOp, prefix: bool, target: &Expression) -> CompileResult<()> {
        let increment = op == UpdateOp::Increment;
        match target {
            Expression::Identifier(sym) => {
                let binding = self.resolve_binding(*sym);
                self.emit(Opcode::GetBinding(binding));
                if prefix {
                    self.emit(if increment { Opcode::Inc } else { Opcode::Dec });
                    self.emit(Opcode::Dup);
                    self.emit(Opcode::SetBinding(binding));
                } else {
                    self.emit(Opcode::Dup);
                    self.emit(if increment { Opcode::Inc } else { Opcode::Dec });
                    self.emit(Opcode::SetBinding(binding));
                }
            }
            Expression::Member { object, key, .. } => {
                self.compile_expression(object)?;
                self.push_member_key(key)?;
                self.emit(Opcode::UpdateProperty { increment, prefix });
            }
            _ => {
                return Err(InternalError::Unreachable(
                    "update expression target must be an identifier or member expression"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    fn compile_binary(&mut self, op: BinaryOp, left: &Expression, right: &Expression) -> CompileResult<()> {
        if op == BinaryOp::In {
            self.compile_expression(left)?;
            self.compile_expression(right)?;
            self.emit(Opcode::Swap);
            self.emit(Opcode::HasProperty);
            return Ok(());
        }
        self.compile_expression(left)?;
        self.compile_expression(right)?;
        let opcode = match op {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::Pow => Opcode::Pow,
            BinaryOp::ShiftLeft => Opcode::Shl,
            BinaryOp::ShiftRight => Opcode::Shr,
            BinaryOp::UnsignedShiftRight => Opcode::UShr,
            BinaryOp::BitAnd => Opcode::BitAnd,
            BinaryOp::BitOr => Opcode::BitOr,
            BinaryOp::BitXor => Opcode::BitXor,
            BinaryOp::Equal => Opcode::Equal,
            BinaryOp::NotEqual => Opcode::NotEqual,
            BinaryOp::StrictEqual => Opcode::StrictEqual,
            BinaryOp::StrictNotEqual => Opcode::StrictNotEqual,
            BinaryOp::LessThan => Opcode::LessThan,
            BinaryOp::LessThanOrEqual => Opcode::LessThanOrEqual,
            BinaryOp::GreaterThan => Opcode::GreaterThan,
            BinaryOp::GreaterThanOrEqual => Opcode::GreaterThanOrEqual,
            BinaryOp::InstanceOf => Opcode::InstanceOf,
            BinaryOp::In => unreachable!("handled above"),
        };
        self.emit(opcode);
        Ok(())
    }

    fn compile_logical(&mut self, op: LogicalOp, left: &Expression, right: &Expression) -> CompileResult<()> {
        self.compile_expression(left)?;
        self.emit(Opcode::Dup);
        match op {
            LogicalOp::And => {
                let end = self.emit(Opcode::JumpIfFalse(0));
                self.emit(Opcode::Pop);
                self.compile_expression(right)?;
                self.patch_jump_here(end);
            }
            LogicalOp::Or => {
                let end = self.emit(Opcode::JumpIfTrue(0));
                self.emit(Opcode::Pop);
                self.compile_expression(right)?;
                self.patch_jump_here(end);
            }
            LogicalOp::Coalesce => {
                let to_right = self.emit(Opcode::JumpIfNullish(0));
                let to_end = self.emit(Opcode::Jump(0));
                self.patch_jump_here(to_right);
                self.emit(Opcode::Pop);
                self.compile_expression(right)?;
                self.patch_jump_here(to_end);
            }
        }
        Ok(())
    }

    fn compile_assign(&mut self, op: AssignOp, target: &Expression, value: &Expression) -> CompileResult<()> {
        if let Some(logical) = logical_op_of(op) {
            return self.compile_logical_assign(logical, target, value);
        }
        match target {
            Expression::Identifier(sym) => {
                let binding = self.resolve_binding(*sym);
                if let Some(binop) = binop_of(op) {
                    self.emit(Opcode::GetBinding(binding));
                    self.compile_expression(value)?;
                    self.emit(binop);
                } else {
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Dup);
                self.emit(Opcode::SetBinding(binding));
            }
            Expression::Member { object, key, .. } => {
                self.compile_expression(object)?;
                self.push_member_key(key)?;
                if let Some(binop) = binop_of(op) {
                    self.emit(Opcode::Over);
                    self.emit(Opcode::Over);
                    self.emit(Opcode::GetProperty);
                    self.compile_expression(value)?;
                    self.emit(binop);
                } else {
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::SetProperty);
            }
            _ => {
                return Err(InternalError::Unreachable(
                    "assignment target must be an identifier or member expression".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn compile_logical_assign(
        &mut self,
        op: LogicalOp,
        target: &Expression,
        value: &Expression,
    ) -> CompileResult<()> {
        match target {
            Expression::Identifier(sym) => {
                let binding = self.resolve_binding(*sym);
                self.emit(Opcode::GetBinding(binding));
                self.emit(Opcode::Dup);
                // stack: [old, old]; the guard below consumes one copy.
                let (guard, invert) = self.emit_logical_guard(op);
                if !invert {
                    // fallthrough (guard not taken) is the assign arm.
                    self.compile_expression(value)?;
                    self.emit(Opcode::Dup);
                    self.emit(Opcode::SetBinding(binding));
                    let to_end = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(guard); // skip arm: stack already [old]
                    self.patch_jump_here(to_end);
                } else {
                    // `??=`: the guard target IS the assign arm; fallthrough skips.
                    let to_skip = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(guard);
                    self.compile_expression(value)?;
                    self.emit(Opcode::Dup);
                    self.emit(Opcode::SetBinding(binding));
                    let to_end = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(to_skip); // skip arm: stack already [old]
                    self.patch_jump_here(to_end);
                }
            }
            Expression::Member { object, key, .. } => {
                self.compile_expression(object)?;
                self.push_member_key(key)?;
                self.emit(Opcode::Over);
                self.emit(Opcode::Over);
                self.emit(Opcode::GetProperty);
                self.emit(Opcode::Dup);
                // stack: [obj, key, old, old]; guard consumes one copy,
                // leaving [obj, key, old] on both arms below.
                let (guard, invert) = self.emit_logical_guard(op);
                if !invert {
                    self.emit(Opcode::Pop); // drop stale `old` -> [obj, key]
                    self.compile_expression(value)?;
                    self.emit(Opcode::SetProperty); // -> [result]
                    let to_end = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(guard); // skip arm: [obj, key, old]
                    self.emit_drop_below_top(2); // -> [old]
                    self.patch_jump_here(to_end);
                } else {
                    let to_skip = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(guard); // assign arm: [obj, key, old]
                    self.emit(Opcode::Pop);
                    self.compile_expression(value)?;
                    self.emit(Opcode::SetProperty);
                    let to_end = self.emit(Opcode::Jump(0));
                    self.patch_jump_here(to_skip); // skip arm: [obj, key, old]
                    self.emit_drop_below_top(2);
                    self.patch_jump_here(to_end);
                }
            }
            _ => {
                return Err(InternalError::Unreachable(
                    "assignment target must be an identifier or member expression".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Emits the conditional test shared by `&&=`/`||=`/`??=`, consuming the
    /// duplicated current value. Returns the jump instruction index still
    /// needing a target, and whether its sense is inverted (Coalesce jumps
    /// to the *assignment* arm instead of the *skip* arm, since there is no
    /// direct "jump if not nullish").
    fn emit_logical_guard(&mut self, op: LogicalOp) -> (usize, bool) {
        match op {
            LogicalOp::And => (self.emit(Opcode::JumpIfFalse(0)), false),
            LogicalOp::Or => (self.emit(Opcode::JumpIfTrue(0)), false),
            LogicalOp::Coalesce => (self.emit(Opcode::JumpIfNullish(0)), true),
        }
    }

    fn compile_member(&mut self, object: &Expression, key: &MemberKey, optional: bool) -> CompileResult<()> {
        self.compile_expression(object)?;
        if optional {
            self.emit(Opcode::Dup);
            let to_undefined = self.emit(Opcode::JumpIfNullish(0));
            self.push_member_key(key)?;
            self.emit(Opcode::GetProperty);
            let to_end = self.emit(Opcode::Jump(0));
            self.patch_jump_here(to_undefined);
            self.emit(Opcode::Pop);
            self.emit(Opcode::PushUndefined);
            self.patch_jump_here(to_end);
        } else {
            self.push_member_key(key)?;
            self.emit(Opcode::GetProperty);
        }
        Ok(())
    }

    fn has_spread(arguments: &[Expression]) -> bool {
        arguments.iter().any(|a| matches!(a, Expression::Spread(_)))
    }

    /// Pushes the argument list and reports which call/construct opcode
    /// variant matches what it left on the stack: a flat run of values for
    /// the plain `Call`/`Construct(argc)` opcodes, or a single packed array
    /// for `CallSpread`/`ConstructSpread` once any argument is a spread.
    fn push_arguments(&mut self, arguments: &[Expression]) -> CompileResult<ArgsShape> {
        if Self::has_spread(arguments) {
            self.emit(Opcode::PushEmptyArray);
            for argument in arguments {
                self.emit(Opcode::Dup);
                match argument {
                    Expression::Spread(inner) => {
                        self.compile_expression(inner)?;
                        self.emit(Opcode::SpreadArrayElement);
                    }
                    other => {
                        self.compile_expression(other)?;
                        self.emit(Opcode::AppendArrayElement);
                    }
                }
            }
            Ok(ArgsShape::Spread)
        } else {
            for argument in arguments {
                self.compile_expression(argument)?;
            }
            Ok(ArgsShape::Flat(arguments.len() as u32))
        }
    }

    fn compile_call(&mut self, callee: &Expression, arguments: &[Expression], call_optional: bool) -> CompileResult<()> {
        let member_optional = matches!(callee, Expression::Member { optional: true, .. });
        let short_circuit = call_optional || member_optional;

        if let Expression::Member { object, key, .. } = callee {
            self.compile_expression(object)?;
            let to_undefined = if short_circuit {
                self.emit(Opcode::Dup);
                Some(self.emit(Opcode::JumpIfNullish(0)))
            } else {
                None
            };
            self.emit(Opcode::Dup);
            self.push_member_key(key)?;
            self.emit(Opcode::GetProperty);
            self.emit(Opcode::Swap);
            match self.push_arguments(arguments)? {
                ArgsShape::Spread => self.emit(Opcode::CallSpread),
                ArgsShape::Flat(argc) => self.emit(Opcode::Call(argc)),
            };
            if let Some(to_undefined) = to_undefined {
                let to_end = self.emit(Opcode::Jump(0));
                self.patch_jump_here(to_undefined);
                self.emit(Opcode::Pop);
                self.emit(Opcode::PushUndefined);
                self.patch_jump_here(to_end);
            }
        } else {
            self.compile_expression(callee)?;
            let to_undefined = if short_circuit {
                self.emit(Opcode::Dup);
                Some(self.emit(Opcode::JumpIfNullish(0)))
            } else {
                None
            };
            self.emit(Opcode::PushUndefined);
            match self.push_arguments(arguments)? {
                ArgsShape::Spread => self.emit(Opcode::CallSpread),
                ArgsShape::Flat(argc) => self.emit(Opcode::Call(argc)),
            };
            if let Some(to_undefined) = to_undefined {
                let to_end = self.emit(Opcode::Jump(0));
                self.patch_jump_here(to_undefined);
                self.emit(Opcode::Pop);
                self.emit(Opcode::PushUndefined);
                self.patch_jump_here(to_end);
            }
        }
        Ok(())
    }

    fn compile_new(&mut self, callee: &Expression, arguments: &[Expression]) -> CompileResult<()> {
        self.compile_expression(callee)?;
        match self.push_arguments(arguments)? {
            ArgsShape::Spread => self.emit(Opcode::ConstructSpread),
            ArgsShape::Flat(argc) => self.emit(Opcode::Construct(argc)),
        };
        Ok(())
    }

    fn compile_class(&mut self, class: &Class) -> CompileResult<()> {
        let has_super_class = class.super_class.is_some();
        if let Some(super_expr) = &class.super_class {
            self.compile_expression(super_expr)?;
        }
        let ctor_index = match &class.constructor {
            Some(ctor) => self.compile_nested_function(ctor)?,
            None => self.compile_default_constructor(has_super_class)?,
        };
        let mut method_count = 0u32;
        for element in &class.elements {
            match element {
                ClassElementKind::Method(m) if m.kind == MethodKind::Normal && !m.is_static => {
                    self.push_member_key(&m.key)?;
                    let index = self.compile_nested_function(&m.function)?;
                    self.emit(Opcode::CreateClosure(index));
                    method_count += 1;
                }
                ClassElementKind::Method(_) => {
                    return Err(InternalError::Unimplemented(
                        "static or accessor class methods",
                    ));
                }
                ClassElementKind::Field { .. } => {
                    return Err(InternalError::Unimplemented("class fields"));
                }
            }
        }
        self.emit(Opcode::CreateClass { ctor_index, has_super_class, method_count });
        Ok(())
    }

    fn compile_default_constructor(&mut self, has_super_class: bool) -> CompileResult<u32> {
        if has_super_class {
            return self.compile_derived_default_constructor();
        }
        let synthetic = Function {
            name: None,
            parameters: Parameters::default(),
            body: Vec::new(),
            kind: FunctionKind::Normal,
            is_arrow: false,
            is_strict: true,
        };
        self.compile_nested_function(&synthetic)
    }

    /// The implicit `constructor(...args) { super(...args); }` a derived
    /// class gets when it declares no constructor of its own (spec §4.F
    /// "GetSuperConstructor"). Lowered directly to IR — rather than through
    /// `compile_nested_function` over a synthesized AST — since it needs
    /// `PushSuperConstructor`/`BindThis`, two opcodes no surface syntax in
    /// this engine reaches (an explicit `super(...)` call expression stays
    /// `Unimplemented`; see `DESIGN.md`).
    fn compile_derived_default_constructor(&mut self) -> CompileResult<u32> {
        let outer_code = std::mem::take(&mut self.code);
        let outer_constants = std::mem::take(&mut self.constants);
        let outer_functions = std::mem::take(&mut self.functions);
        let outer_handlers = std::mem::take(&mut self.handlers);
        let outer_loops = std::mem::take(&mut self.loops);
        let outer_pending_label = std::mem::take(&mut self.pending_label);
        let outer_name = std::mem::take(&mut self.name);
        let outer_kind = std::mem::replace(&mut self.kind, IrFunctionKind::Normal);
        let outer_is_arrow = std::mem::replace(&mut self.is_arrow, false);
        let outer_is_strict = std::mem::replace(&mut self.is_strict, true);
        let outer_expected_argument_count = std::mem::replace(&mut self.expected_argument_count, 0);
        let outer_has_lexical_arguments = std::mem::replace(&mut self.has_lexical_arguments, false);

        self.scope.push(true);
        self.emit(Opcode::PushSuperConstructor);
        self.emit(Opcode::PushArguments);
        self.emit(Opcode::SuperConstructSpread);
        self.emit(Opcode::Dup);
        self.emit(Opcode::BindThis);
        self.emit(Opcode::Pop);
        self.emit(Opcode::PushUndefined);
        self.emit(Opcode::Return);
        let num_own_bindings = self.scope.current_binding_count();
        self.scope.pop();

        let code = std::mem::replace(&mut self.code, outer_code);
        let constants = std::mem::replace(&mut self.constants, outer_constants);
        let functions = std::mem::replace(&mut self.functions, outer_functions);
        let handlers = std::mem::replace(&mut self.handlers, outer_handlers);
        self.loops = outer_loops;
        self.pending_label = outer_pending_label;
        self.name = outer_name;
        self.kind = outer_kind;
        self.is_arrow = outer_is_arrow;
        self.is_strict = outer_is_strict;
        self.expected_argument_count = outer_expected_argument_count;
        self.has_lexical_arguments = outer_has_lexical_arguments;

        let info = FunctionInfo {
            name: None,
            expected_argument_count: 0,
            param_count: 0,
            has_rest: false,
            arguments_binding_index: Some(0),
            is_strict: true,
            kind: IrFunctionKind::Normal,
            is_arrow: false,
            num_own_bindings,
            has_lexical_arguments: false,
            code,
            constants,
            functions,
            handlers,
        };
        validate_function(&info)?;
        self.functions.push(Rc::new(info));
        Ok((self.functions.len() - 1) as u32)
    }
}

enum ArgsShape {
    Flat(u32),
    Spread,
}

fn binop_of(op: AssignOp) -> Option<Opcode> {
    Some(match op {
        AssignOp::Assign => return None,
        AssignOp::Add => Opcode::Add,
        AssignOp::Sub => Opcode::Sub,
        AssignOp::Mul => Opcode::Mul,
        AssignOp::Div => Opcode::Div,
        AssignOp::Mod => Opcode::Mod,
        AssignOp::Pow => Opcode::Pow,
        AssignOp::ShiftLeft => Opcode::Shl,
        AssignOp::ShiftRight => Opcode::Shr,
        AssignOp::UnsignedShiftRight => Opcode::UShr,
        AssignOp::BitAnd => Opcode::BitAnd,
        AssignOp::BitOr => Opcode::BitOr,
        AssignOp::BitXor => Opcode::BitXor,
        AssignOp::LogicalAnd | AssignOp::LogicalOr | AssignOp::Coalesce => return None,
    })
}

fn logical_op_of(op: AssignOp) -> Option<LogicalOp> {
    match op {
        AssignOp::LogicalAnd => Some(LogicalOp::And),
        AssignOp::LogicalOr => Some(LogicalOp::Or),
        AssignOp::Coalesce => Some(LogicalOp::Coalesce),
        _ => None,
    }
}
