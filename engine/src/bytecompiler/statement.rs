//! Lowers [`crate::ast::Statement`] to bytecode. Every statement leaves the
//! operand stack exactly as it found it (height 0 relative to the
//! statement's start) — expressions used as statements always end with a
//! `Pop`.

use super::{ByteCompiler, CompileResult, LoopContext};
use crate::ast::{BindingTarget, ForInit, ForTarget, Statement, VarDeclarator, VarKind};
use crate::error::InternalError;
use crate::ir::Opcode;

impl<'a> ByteCompiler<'a> {
    pub(super) fn compile_statement(&mut self, statement: &Statement) -> CompileResult<()> {
        match statement {
            Statement::Empty => {}
            Statement::Expression(expr) => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Pop);
            }
            Statement::VarDecl(kind, declarators) => {
                self.compile_var_declarators(*kind, declarators)?;
            }
            Statement::Block(body) => self.compile_block_scoped(body)?,
            Statement::If { test, consequent, alternate } => {
                self.compile_expression(test)?;
                let to_alt = self.emit(Opcode::JumpIfFalse(0));
                self.compile_statement(consequent)?;
                match alternate {
                    Some(alt) => {
                        let to_end = self.emit(Opcode::Jump(0));
                        self.patch_jump_here(to_alt);
                        self.compile_statement(alt)?;
                        self.patch_jump_here(to_end);
                    }
                    None => self.patch_jump_here(to_alt),
                }
            }
            Statement::While { test, body } => self.compile_while(test, body)?,
            Statement::DoWhile { body, test } => self.compile_do_while(body, test)?,
            Statement::For { init, test, update, body } => {
                self.compile_for(init, test, update, body)?;
            }
            Statement::ForIn { left, right, body } => self.compile_for_in_of(left, right, body, false)?,
            Statement::ForOf { left, right, body, is_await } => {
                if *is_await {
                    return Err(InternalError::Unimplemented("for-await-of"));
                }
                self.compile_for_in_of(left, right, body, true)?;
            }
            Statement::Switch { discriminant, cases } => self.compile_switch(discriminant, cases)?,
            Statement::Return(value) => {
                match value {
                    Some(expr) => self.compile_expression(expr)?,
                    None => {
                        self.emit(Opcode::PushUndefined);
                    }
                }
                self.emit(Opcode::Return);
            }
            Statement::Throw(expr) => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Throw);
            }
            Statement::Try { block, handler, finally } => self.compile_try(block, handler, finally)?,
            Statement::Break(label) => self.compile_break(*label)?,
            Statement::Continue(label) => self.compile_continue(*label)?,
            Statement::Labelled(label, body) => self.compile_labelled(*label, body)?,
            Statement::FunctionDecl(_) => {
                // Already compiled and bound eagerly by `scope::hoist_scope`.
            }
            Statement::ClassDecl(class) => {
                self.compile_class(class)?;
                let name = class.name.expect("a class declaration is always named");
                let binding = self.resolve_binding(name);
                self.emit(Opcode::InitBinding(binding));
            }
        }
        Ok(())
    }

    fn compile_var_declarators(
        &mut self,
        kind: VarKind,
        declarators: &[VarDeclarator],
    ) -> CompileResult<()> {
        for declarator in declarators {
            let name = match &declarator.target {
                BindingTarget::Identifier(name) => *name,
                BindingTarget::Pattern => {
                    return Err(InternalError::Unimplemented("destructuring declarations"))
                }
            };
            match kind {
                VarKind::Var => {
                    // Already hoisted and initialized to `undefined`; only a
                    // statement with its own initializer does anything here.
                    if let Some(init) = &declarator.init {
                        self.compile_expression(init)?;
                        let binding = self.resolve_binding(name);
                        self.emit(Opcode::SetBinding(binding));
                    }
                }
                VarKind::Let | VarKind::Const => {
                    match &declarator.init {
                        Some(init) => self.compile_expression(init)?,
                        None => {
                            self.emit(Opcode::PushUndefined);
                        }
                    }
                    let binding = self.resolve_binding(name);
                    self.emit(Opcode::InitBinding(binding));
                }
            }
        }
        Ok(())
    }

    fn compile_while(&mut self, test: &crate::ast::Expression, body: &Statement) -> CompileResult<()> {
        let label = self.pending_label.take();
        let start = self.here();
        self.compile_expression(test)?;
        let test_fail = self.emit(Opcode::JumpIfFalse(0));
        self.loops.push(LoopContext {
            label,
            break_patches: Vec::new(),
            continue_patches: Vec::new(),
            is_switch: false,
        });
        let body_result = self.compile_statement(body);
        let ctx = self.loops.pop().expect("pushed above");
        body_result?;
        self.emit(Opcode::Jump(start));
        let end = self.here();
        self.patch_jump(test_fail, end);
        for p in ctx.continue_patches {
            self.patch_jump(p, start);
        }
        for p in ctx.break_patches {
            self.patch_jump(p, end);
        }
        Ok(())
    }

    fn compile_do_while(&mut self, body: &Statement, test: &crate::ast::Expression) -> CompileResult<()> {
        let label = self.pending_label.take();
        let body_start = self.here();
        self.loops.push(LoopContext {
            label,
            break_patches: Vec::new(),
            continue_patches: Vec::new(),
            is_switch: false,
        });
        let body_result = self.compile_statement(body);
        let ctx = self.loops.pop().expect("pushed above");
        body_result?;
        let test_start = self.here();
        self.compile_expression(test)?;
        let back = self.emit(Opcode::JumpIfTrue(0));
        self.patch_jump(back, body_start);
        let end = self.here();
        for p in ctx.continue_patches {
            self.patch_jump(p, test_start);
        }
        for p in ctx.break_patches {
            self.patch_jump(p, end);
        }
        Ok(())
    }

    fn compile_for(
        &mut self,
        init: &Option<ForInit>,
        test: &Option<crate::ast::Expression>,
        update: &Option<crate::ast::Expression>,
        body: &Statement,
    ) -> CompileResult<()> {
        let label = self.pending_label.take();

        // A lexical (`let`/`const`) initializer gets `CreatePerIterationEnvironment`
        // treatment (spec §13.7.4.3): a fresh declarative environment every
        // iteration, its bindings copied forward from the previous one, so a
        // closure created in iteration `k`'s body keeps seeing iteration
        // `k`'s values even after later iterations mutate the loop variable
        // (spec §8 scenario: `for (let i=0;i<3;i++) a.push(()=>i)` yields
        // `"0,1,2"`, not `"3,3,3"`). Implemented as a copy-in-place at the
        // `continue` target: read every binding out of the current
        // environment, pop it, push a same-sized replacement, and
        // re-initialize each binding from the saved value — the environment
        // index stays the same throughout, so every `GetBinding`/`SetBinding`
        // compiled anywhere in the loop body keeps resolving correctly
        // without needing to know which physical environment is live.
        let needs_scope = matches!(init, Some(ForInit::VarDecl(VarKind::Let | VarKind::Const, _)));
        let mut loop_names = Vec::new();
        if needs_scope {
            self.scope.push(false);
            if let Some(ForInit::VarDecl(kind, declarators)) = init {
                for declarator in declarators {
                    match &declarator.target {
                        BindingTarget::Identifier(name) => {
                            self.scope.declare(*name, *kind == VarKind::Let);
                            loop_names.push(*name);
                        }
                        BindingTarget::Pattern => {
                            return Err(InternalError::Unimplemented("destructuring declarations"))
                        }
                    }
                }
            }
            let n = self.scope.current_binding_count();
            self.emit(Opcode::PushDeclarativeEnvironment(n as u32));
        }
        match init {
            Some(ForInit::VarDecl(kind, declarators)) => {
                self.compile_var_declarators(*kind, declarators)?;
            }
            Some(ForInit::Expression(expr)) => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Pop);
            }
            None => {}
        }

        let start = self.here();
        let to_end = match test {
            Some(test) => {
                self.compile_expression(test)?;
                Some(self.emit(Opcode::JumpIfFalse(0)))
            }
            None => None,
        };
        self.loops.push(LoopContext {
            label,
            break_patches: Vec::new(),
            continue_patches: Vec::new(),
            is_switch: false,
        });
        let body_result = self.compile_statement(body);
        let ctx = self.loops.pop().expect("pushed above");
        body_result?;
        let continue_target = self.here();
        if needs_scope {
            for name in &loop_names {
                let binding = self.resolve_binding(*name);
                self.emit(Opcode::GetBinding(binding));
            }
            self.emit(Opcode::PopEnvironment);
            let n = self.scope.current_binding_count();
            self.emit(Opcode::PushDeclarativeEnvironment(n as u32));
            for name in loop_names.iter().rev() {
                let binding = self.resolve_binding(*name);
                self.emit(Opcode::InitBinding(binding));
            }
        }
        if let Some(update) = update {
            self.compile_expression(update)?;
            self.emit(Opcode::Pop);
        }
        self.emit(Opcode::Jump(start));
        let end = self.here();
        if let Some(to_end) = to_end {
            self.patch_jump(to_end, end);
        }
        for p in ctx.continue_patches {
            self.patch_jump(p, continue_target);
        }
        for p in ctx.break_patches {
            self.patch_jump(p, end);
        }
        if needs_scope {
            self.emit(Opcode::PopEnvironment);
            self.scope.pop();
        }
        Ok(())
    }

    fn compile_for_in_of(
        &mut self,
        left: &ForTarget,
        right: &crate::ast::Expression,
        body: &Statement,
        is_of: bool,
    ) -> CompileResult<()> {
        let label = self.pending_label.take();
        let (kind, name) = match left {
            ForTarget::VarDecl(kind, BindingTarget::Identifier(name)) => (*kind, *name),
            ForTarget::VarDecl(_, BindingTarget::Pattern) | ForTarget::Pattern(_) => {
                return Err(InternalError::Unimplemented("destructuring for-in/for-of target"))
            }
        };

        self.compile_expression(right)?;
        self.emit(if is_of { Opcode::GetIterator } else { Opcode::ForInStart });

        let needs_scope = matches!(kind, VarKind::Let | VarKind::Const);
        if needs_scope {
            self.scope.push(false);
            self.scope.declare(name, kind == VarKind::Let);
            let n = self.scope.current_binding_count();
            self.emit(Opcode::PushDeclarativeEnvironment(n as u32));
        }

        let start = self.here();
        self.emit(if is_of { Opcode::IteratorNext } else { Opcode::ForInNext });
        let to_end = self.emit(Opcode::JumpIfFalse(0));
        let binding = self.resolve_binding(name);
        self.emit(if kind == VarKind::Var { Opcode::SetBinding(binding) } else { Opcode::InitBinding(binding) });

        self.loops.push(LoopContext {
            label,
            break_patches: Vec::new(),
            continue_patches: Vec::new(),
            is_switch: false,
        });
        let body_result = self.compile_statement(body);
        let ctx = self.loops.pop().expect("pushed above");
        body_result?;
        self.emit(Opcode::Jump(start));

        self.patch_jump_here(to_end);
        self.emit(Opcode::Pop); // drop the leftover key/value
        let end = self.here();
        for p in ctx.break_patches {
            self.patch_jump(p, end);
        }
        self.emit(Opcode::Pop); // drop the enumerator/iterator
        for p in ctx.continue_patches {
            self.patch_jump(p, start);
        }
        if needs_scope {
            self.emit(Opcode::PopEnvironment);
            self.scope.pop();
        }
        Ok(())
    }

    /// All case bodies share ONE lexical scope for the whole `switch`
    /// (spec-accurate: a `let` in one case is visible, if past its TDZ, to a
    /// later case reached via fallthrough). Declared here the same
    /// declare-then-push-then-init way `compile_block_scoped` does it, since
    /// a case-body function declaration's `CreateClosure`/`InitBinding` must
    /// not run before this environment exists either.
    fn compile_switch(
        &mut self,
        discriminant: &crate::ast::Expression,
        cases: &[crate::ast::SwitchCase],
    ) -> CompileResult<()> {
        let label = self.pending_label.take();
        self.compile_expression(discriminant)?;

        self.scope.push(false);
        for case in cases {
            super::scope::declare_block(self, &case.body)?;
        }
        let n = self.scope.current_binding_count();
        self.emit(Opcode::PushDeclarativeEnvironment(n as u32));
        for case in cases {
            super::scope::init_block(self, &case.body)?;
        }

        let mut test_patches = Vec::with_capacity(cases.len());
        let mut default_index = None;
        for (i, case) in cases.iter().enumerate() {
            match &case.test {
                Some(test) => {
                    self.emit(Opcode::Dup);
                    self.compile_expression(test)?;
                    self.emit(Opcode::StrictEqual);
                    test_patches.push(Some(self.emit(Opcode::JumpIfTrue(0))));
                }
                None => {
                    default_index = Some(i);
                    test_patches.push(None);
                }
            }
        }
        let no_match_jump = self.emit(Opcode::Jump(0));

        self.loops.push(LoopContext {
            label,
            break_patches: Vec::new(),
            continue_patches: Vec::new(),
            is_switch: true,
        });
        let mut case_starts = Vec::with_capacity(cases.len());
        let body_result = (|| -> CompileResult<()> {
            for case in cases {
                case_starts.push(self.here());
                for stmt in &case.body {
                    self.compile_statement(stmt)?;
                }
            }
            Ok(())
        })();
        let ctx = self.loops.pop().expect("pushed above");
        body_result?;

        let join = self.here();
        self.emit(Opcode::Pop); // drop the discriminant
        self.emit(Opcode::PopEnvironment);
        self.scope.pop();

        for (patch, start) in test_patches.iter().zip(case_starts.iter()) {
            if let Some(patch) = patch {
                self.patch_jump(*patch, *start);
            }
        }
        match default_index {
            Some(i) => self.patch_jump(no_match_jump, case_starts[i]),
            None => self.patch_jump(no_match_jump, join),
        }
        for p in ctx.break_patches {
            self.patch_jump(p, join);
        }
        Ok(())
    }

    /// `finally` has two distinct entries that need different exits: falling
    /// in after the `try`/`catch` complete normally (continue past the whole
    /// statement) versus being jumped to by the VM while unwinding an
    /// uncaught/rethrown exception (must re-throw once done, to keep
    /// unwinding). Rather than thread both exits through one compiled copy,
    /// the `finally` body is compiled twice: once inline on the normal-
    /// completion path, once as the dedicated unwind target recorded in
    /// `HandlerRegion::finally` that always ends in `ReThrow`.
    fn compile_try(
        &mut self,
        block: &[Statement],
        handler: &Option<(Option<BindingTarget>, Vec<Statement>)>,
        finally: &Option<Vec<Statement>>,
    ) -> CompileResult<()> {
        let stack_depth = 0; // try/catch/finally always run at statement-boundary height 0
        let env_depth = self.scope.depth() as u32;

        let try_start = self.here();
        self.compile_block_scoped(block)?;
        let try_end = self.here();
        let try_to_normal = self.emit(Opcode::Jump(0));

        let handler_target = if let Some((binding, catch_body)) = handler {
            let target = self.here();
            self.scope.push(false);
            if let Some(BindingTarget::Identifier(name)) = binding {
                self.scope.declare(*name, true);
            } else if matches!(binding, Some(BindingTarget::Pattern)) {
                return Err(InternalError::Unimplemented("destructuring catch binding"));
            }
            super::scope::declare_block(self, catch_body)?;
            let n = self.scope.current_binding_count();
            self.emit(Opcode::PushDeclarativeEnvironment(n as u32));
            if let Some(BindingTarget::Identifier(name)) = binding {
                let binding_ref = self.resolve_binding(*name);
                self.emit(Opcode::InitBinding(binding_ref));
            } else {
                self.emit(Opcode::Pop); // no catch parameter: discard the thrown value
            }
            super::scope::init_block(self, catch_body)?;
            for stmt in catch_body {
                self.compile_statement(stmt)?;
            }
            self.emit(Opcode::PopEnvironment);
            self.scope.pop();
            Some(target)
        } else {
            None
        };
        let handler_to_normal = handler.as_ref().map(|_| self.emit(Opcode::Jump(0)));

        // The unwind-only copy: reached solely via `HandlerRegion::finally`
        // when the VM propagates an exception through this frame (no
        // handler, or the handler itself threw).
        let finally_target = if let Some(finally_body) = finally {
            let target = self.here();
            self.compile_block_scoped(finally_body)?;
            self.emit(Opcode::ReThrow);
            Some(target)
        } else {
            None
        };

        // The normal-completion copy: both `try` and a successful `catch`
        // fall through here before continuing past the whole statement.
        let normal = self.here();
        self.patch_jump(try_to_normal, normal);
        if let Some(handler_to_normal) = handler_to_normal {
            self.patch_jump(handler_to_normal, normal);
        }
        if let Some(finally_body) = finally {
            self.compile_block_scoped(finally_body)?;
        }

        self.handlers.push(crate::ir::HandlerRegion {
            try_start,
            try_end,
            handler: handler_target,
            finally: finally_target,
            env_depth,
            stack_depth,
        });
        Ok(())
    }

    fn compile_break(&mut self, label: Option<crate::ast::Label>) -> CompileResult<()> {
        let pos = match label {
            Some(label) => self.loops.iter().rposition(|c| c.label == Some(label)),
            None => self.loops.len().checked_sub(1),
        }
        .ok_or_else(|| InternalError::Unreachable("break outside any loop or switch".to_string()))?;
        let idx = self.emit(Opcode::Jump(0));
        self.loops[pos].break_patches.push(idx);
        Ok(())
    }

    fn compile_continue(&mut self, label: Option<crate::ast::Label>) -> CompileResult<()> {
        let pos = match label {
            Some(label) => self.loops.iter().rposition(|c| !c.is_switch && c.label == Some(label)),
            None => self.loops.iter().rposition(|c| !c.is_switch),
        }
        .ok_or_else(|| InternalError::Unreachable("continue outside any loop".to_string()))?;
        let idx = self.emit(Opcode::Jump(0));
        self.loops[pos].continue_patches.push(idx);
        Ok(())
    }

    fn compile_labelled(&mut self, label: crate::ast::Label, body: &Statement) -> CompileResult<()> {
        match body {
            Statement::While { .. }
            | Statement::DoWhile { .. }
            | Statement::For { .. }
            | Statement::ForIn { .. }
            | Statement::ForOf { .. }
            | Statement::Switch { .. } => {
                self.pending_label = Some(label);
                self.compile_statement(body)
            }
            _ => {
                self.loops.push(LoopContext {
                    label: Some(label),
                    break_patches: Vec::new(),
                    continue_patches: Vec::new(),
                    is_switch: true,
                });
                let body_result = self.compile_statement(body);
                let ctx = self.loops.pop().expect("pushed above");
                body_result?;
                let end = self.here();
                for p in ctx.break_patches {
                    self.patch_jump(p, end);
                }
                Ok(())
            }
        }
    }
}
