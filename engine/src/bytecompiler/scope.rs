//! Declaration instantiation (spec §4.F): hoists `var`/function declarations
//! to the nearest function scope, and declares (but does not initialize —
//! leaving the temporal dead zone in place) `let`/`const`/`class` bindings
//! in whatever block they textually appear in.
//!
//! Grounded on the `GlobalDeclarationInstantiation`/
//! `FunctionDeclarationInstantiation` abstract operations the ECMAScript
//! spec describes, adapted to run once per compiled scope instead of once
//! per call (this engine resolves everything statically; see
//! `environments::compile`).

use super::{ByteCompiler, CompileResult};
use crate::ast::{BindingTarget, Function, ForInit, Parameters, Statement, VarKind};
use crate::error::InternalError;
use crate::ir::Opcode;
use boa_interner::Sym;

pub fn hoist_function(c: &mut ByteCompiler<'_>, func: &Function) -> CompileResult<()> {
    declare_parameters(c, &func.parameters)?;
    hoist_scope(c, &func.body, true)
}

pub fn hoist_script(c: &mut ByteCompiler<'_>, body: &[Statement]) -> CompileResult<()> {
    hoist_scope(c, body, true)
}

/// Declares every name a block scope hoists, without emitting any code.
/// Used to size a block's `PushDeclarativeEnvironment` *before* that
/// environment exists — unlike a function's own top-level scope (which the
/// VM's call mechanism creates implicitly before its body bytecode runs), a
/// block's frame is created by an explicit opcode, so the matching
/// `CreateClosure`/`InitBinding` pair for a hoisted function declaration must
/// not be emitted until after that opcode — see [`init_block`].
pub fn declare_block(c: &mut ByteCompiler<'_>, body: &[Statement]) -> CompileResult<()> {
    for statement in body {
        match statement {
            Statement::FunctionDecl(func) => {
                let name = func.name.expect("function declarations are always named");
                c.scope.declare(name, true);
            }
            Statement::VarDecl(VarKind::Let, declarators) => {
                for declarator in declarators {
                    declare_lexical(c, &declarator.target, true)?;
                }
            }
            Statement::VarDecl(VarKind::Const, declarators) => {
                for declarator in declarators {
                    declare_lexical(c, &declarator.target, false)?;
                }
            }
            Statement::ClassDecl(class) => {
                if let Some(name) = class.name {
                    c.scope.declare(name, true);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Emits the initialization code `declare_block` left out — must run only
/// after the block's `PushDeclarativeEnvironment` has executed.
pub fn init_block(c: &mut ByteCompiler<'_>, body: &[Statement]) -> CompileResult<()> {
    for statement in body {
        if let Statement::FunctionDecl(func) = statement {
            let index = c.compile_nested_function(func)?;
            let name = func.name.expect("function declarations are always named");
            c.emit(Opcode::CreateClosure(index));
            let binding = c.resolve_binding(name);
            c.emit(Opcode::InitBinding(binding));
        }
    }
    Ok(())
}

fn declare_parameters(c: &mut ByteCompiler<'_>, parameters: &Parameters) -> CompileResult<()> {
    for parameter in &parameters.bindings {
        if parameter.default.is_some() {
            return Err(InternalError::Unimplemented("default parameter values"));
        }
        match &parameter.target {
            BindingTarget::Identifier(name) => {
                c.scope.declare(*name, true);
            }
            BindingTarget::Pattern => {
                return Err(InternalError::Unimplemented("destructuring parameters"))
            }
        }
    }
    if let Some(rest) = &parameters.rest {
        match rest {
            BindingTarget::Identifier(name) => {
                c.scope.declare(*name, true);
            }
            BindingTarget::Pattern => {
                return Err(InternalError::Unimplemented("destructuring rest parameters"))
            }
        }
    }
    Ok(())
}

fn hoist_scope(c: &mut ByteCompiler<'_>, body: &[Statement], is_function_scope: bool) -> CompileResult<()> {
    if is_function_scope {
        let mut var_names = Vec::new();
        for statement in body {
            collect_var_names(statement, &mut var_names);
        }
        for name in var_names {
            if !c.scope.has_binding_in_current_scope(name) {
                c.scope.declare(name, true);
                c.emit(Opcode::PushUndefined);
                let binding = c.resolve_binding(name);
                c.emit(Opcode::InitBinding(binding));
            }
        }
    }

    for statement in body {
        match statement {
            Statement::FunctionDecl(func) => {
                let index = c.compile_nested_function(func)?;
                let name = func.name.expect("function declarations are always named");
                c.scope.declare(name, true);
                c.emit(Opcode::CreateClosure(index));
                let binding = c.resolve_binding(name);
                c.emit(Opcode::InitBinding(binding));
            }
            Statement::VarDecl(VarKind::Let, declarators) => {
                for declarator in declarators {
                    declare_lexical(c, &declarator.target, true)?;
                }
            }
            Statement::VarDecl(VarKind::Const, declarators) => {
                for declarator in declarators {
                    declare_lexical(c, &declarator.target, false)?;
                }
            }
            Statement::ClassDecl(class) => {
                if let Some(name) = class.name {
                    c.scope.declare(name, true);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn declare_lexical(c: &mut ByteCompiler<'_>, target: &BindingTarget, mutable: bool) -> CompileResult<()> {
    match target {
        BindingTarget::Identifier(name) => {
            c.scope.declare(*name, mutable);
            Ok(())
        }
        BindingTarget::Pattern => Err(InternalError::Unimplemented("destructuring declarations")),
    }
}

fn collect_var_names(statement: &Statement, out: &mut Vec<Sym>) {
    match statement {
        Statement::VarDecl(VarKind::Var, declarators) => {
            for declarator in declarators {
                if let BindingTarget::Identifier(name) = &declarator.target {
                    out.push(*name);
                }
            }
        }
        Statement::Block(body) => {
            for s in body {
                collect_var_names(s, out);
            }
        }
        Statement::If { consequent, alternate, .. } => {
            collect_var_names(consequent, out);
            if let Some(alt) = alternate {
                collect_var_names(alt, out);
            }
        }
        Statement::While { body, .. } | Statement::DoWhile { body, .. } => {
            collect_var_names(body, out);
        }
        Statement::For { init, body, .. } => {
            if let Some(ForInit::VarDecl(VarKind::Var, declarators)) = init {
                for declarator in declarators {
                    if let BindingTarget::Identifier(name) = &declarator.target {
                        out.push(*name);
                    }
                }
            }
            collect_var_names(body, out);
        }
        Statement::ForIn { left, body, .. } | Statement::ForOf { left, body, .. } => {
            if let crate::ast::ForTarget::VarDecl(VarKind::Var, BindingTarget::Identifier(name)) = left {
                out.push(*name);
            }
            collect_var_names(body, out);
        }
        Statement::Switch { cases, .. } => {
            for case in cases {
                for s in &case.body {
                    collect_var_names(s, out);
                }
            }
        }
        Statement::Try { block, handler, finally } => {
            for s in block {
                collect_var_names(s, out);
            }
            if let Some((_, body)) = handler {
                for s in body {
                    collect_var_names(s, out);
                }
            }
            if let Some(body) = finally {
                for s in body {
                    collect_var_names(s, out);
                }
            }
        }
        Statement::Labelled(_, body) => collect_var_names(body, out),
        _ => {}
    }
}
