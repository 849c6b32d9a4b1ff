//! The bytecode compiler (spec §4.F, component F).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/bytecompiler` and
//! `environments/compile.rs`: a single [`ByteCompiler`] instance lowers one
//! function (or the script top level) at a time, descending recursively for
//! nested function expressions/declarations and producing one
//! [`FunctionInfo`] per level. Scope analysis (binding classification, slot
//! assignment, TDZ) happens here via [`crate::environments::CompileTimeEnvironmentStack`],
//! never in the AST.

mod expression;
mod scope;
mod statement;

use crate::ast::{BindingTarget, Function, FunctionKind as AstFunctionKind, Script};
use crate::environments::CompileTimeEnvironmentStack;
use crate::error::InternalError;
use crate::ir::{
    validate_function, BindingRef, Constant, FunctionInfo, FunctionKind as IrFunctionKind,
    HandlerRegion, InstrIndex, Opcode, SymWrapper,
};
use boa_interner::{Interner, Sym};
use std::rc::Rc;

/// Compiler errors are always taxonomy 3 (spec §7): either a construct this
/// engine deliberately doesn't lower (see `SPEC_FULL.md`'s Open-question
/// resolutions) or an IR validator failure. Neither is catchable by user
/// code.
pub type CompileResult<T> = Result<T, InternalError>;

struct LoopContext {
    label: Option<Sym>,
    break_patches: Vec<usize>,
    continue_patches: Vec<usize>,
    /// `true` for a `switch` (or a label wrapping a non-loop statement):
    /// a valid `break` target, but invisible to an unlabelled/labelled
    /// `continue`, which always targets the nearest enclosing loop.
    is_switch: bool,
}

pub struct ByteCompiler<'a> {
    interner: &'a Interner,
    scope: CompileTimeEnvironmentStack,
    code: Vec<Opcode>,
    constants: Vec<Constant>,
    functions: Vec<Rc<FunctionInfo>>,
    handlers: Vec<HandlerRegion>,
    loops: Vec<LoopContext>,
    /// Set by `Statement::Labelled` just before compiling a loop/switch body,
    /// consumed by that statement's own compiling code as its `LoopContext`
    /// label — see `bytecompiler::statement`.
    pending_label: Option<Sym>,
    name: Option<String>,
    kind: IrFunctionKind,
    is_arrow: bool,
    is_strict: bool,
    expected_argument_count: usize,
    has_lexical_arguments: bool,
}

impl<'a> ByteCompiler<'a> {
    fn new(interner: &'a Interner, name: Option<String>, is_strict: bool) -> Self {
        Self {
            interner,
            scope: CompileTimeEnvironmentStack::new(),
            code: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
            handlers: Vec::new(),
            loops: Vec::new(),
            pending_label: None,
            name,
            kind: IrFunctionKind::Normal,
            is_arrow: false,
            is_strict,
            expected_argument_count: 0,
            has_lexical_arguments: false,
        }
    }

    fn resolve_sym(&self, sym: Sym) -> String {
        self.interner
            .resolve(sym)
            .map(|r| r.utf8().unwrap_or_default().to_string())
            .unwrap_or_default()
    }

    fn emit(&mut self, op: Opcode) -> usize {
        self.code.push(op);
        self.code.len() - 1
    }

    fn here(&self) -> InstrIndex {
        self.code.len() as InstrIndex
    }

    fn patch_jump(&mut self, index: usize, target: InstrIndex) {
        self.code[index] = match self.code[index] {
            Opcode::Jump(_) => Opcode::Jump(target),
            Opcode::JumpIfFalse(_) => Opcode::JumpIfFalse(target),
            Opcode::JumpIfTrue(_) => Opcode::JumpIfTrue(target),
            Opcode::JumpIfNullish(_) => Opcode::JumpIfNullish(target),
            ref other => unreachable!("patch_jump called on non-jump opcode {other:?}"),
        };
    }

    fn patch_jump_here(&mut self, index: usize) {
        let here = self.here();
        self.patch_jump(index, here);
    }

    fn push_constant(&mut self, constant: Constant) -> u32 {
        self.constants.push(constant);
        (self.constants.len() - 1) as u32
    }

    fn push_string_constant(&mut self, sym: Sym) -> u32 {
        let text = self.resolve_sym(sym);
        self.push_constant(Constant::String(crate::string::JsString::new(text)))
    }

    fn resolve_binding(&self, name: Sym) -> BindingRef {
        match self.scope.resolve(name) {
            Some((depth, index, mutable)) => BindingRef::Declarative {
                environment_index: depth as u32,
                binding_index: index as u32,
                mutable,
                name: SymWrapper(name),
            },
            None => BindingRef::Global(SymWrapper(name)),
        }
    }

    fn compile_block_scoped(&mut self, body: &[crate::ast::Statement]) -> CompileResult<()> {
        self.scope.push(false);
        scope::declare_block(self, body)?;
        let num_bindings = self.scope.current_binding_count();
        self.emit(Opcode::PushDeclarativeEnvironment(num_bindings as u32));
        scope::init_block(self, body)?;
        for statement in body {
            self.compile_statement(statement)?;
        }
        self.emit(Opcode::PopEnvironment);
        self.scope.pop();
        Ok(())
    }

    fn finish(self) -> FunctionInfo {
        FunctionInfo {
            name: self.name,
            expected_argument_count: self.expected_argument_count,
            param_count: 0,
            has_rest: false,
            arguments_binding_index: None,
            is_strict: self.is_strict,
            kind: self.kind,
            is_arrow: self.is_arrow,
            num_own_bindings: 0, // patched by caller once the top scope is popped
            has_lexical_arguments: self.has_lexical_arguments,
            code: self.code,
            constants: self.constants,
            functions: self.functions,
            handlers: self.handlers,
        }
    }

    /// Compiles `func` as a fresh [`FunctionInfo`], pushed into this
    /// compiler's `functions` table, returning its index for
    /// `Opcode::CreateClosure`/`CreateClass` to reference.
    ///
    /// The per-function accumulation fields (`code`, `constants`, ...) are
    /// swapped out and restored around the nested compile, but `self.scope`
    /// is shared and simply gains one more function-level frame — depths
    /// resolved by `CompileTimeEnvironmentStack::resolve` must stay
    /// consistent with the runtime `DeclarativeEnvironmentStack` a closure
    /// built from this template will see when called (its creator's
    /// snapshot plus this function's own frame), which only holds if every
    /// nested compile shares one continuously-growing scope stack instead
    /// of starting a fresh one.
    fn compile_nested_function(&mut self, func: &Function) -> CompileResult<u32> {
        if matches!(func.kind, AstFunctionKind::Async | AstFunctionKind::AsyncGenerator) {
            return Err(InternalError::Unimplemented("async functions"));
        }
        let ir_kind = match func.kind {
            AstFunctionKind::Generator => IrFunctionKind::Generator,
            AstFunctionKind::Normal | AstFunctionKind::Async | AstFunctionKind::AsyncGenerator => {
                IrFunctionKind::Normal
            }
        };
        let name = func.name.map(|sym| self.resolve_sym(sym));
        let is_strict = self.is_strict || func.is_strict;
        let names_arguments = |target: &BindingTarget| {
            matches!(target, BindingTarget::Identifier(sym) if self.resolve_sym(*sym) == "arguments")
        };
        let has_lexical_arguments = !func.is_arrow
            && (func.parameters.bindings.iter().any(|p| names_arguments(&p.target))
                || func.parameters.rest.as_ref().is_some_and(names_arguments));

        let outer_code = std::mem::take(&mut self.code);
        let outer_constants = std::mem::take(&mut self.constants);
        let outer_functions = std::mem::take(&mut self.functions);
        let outer_handlers = std::mem::take(&mut self.handlers);
        let outer_loops = std::mem::take(&mut self.loops);
        let outer_pending_label = std::mem::take(&mut self.pending_label);
        let outer_name = std::mem::replace(&mut self.name, name);
        let outer_kind = std::mem::replace(&mut self.kind, ir_kind);
        let outer_is_arrow = std::mem::replace(&mut self.is_arrow, func.is_arrow);
        let outer_is_strict = std::mem::replace(&mut self.is_strict, is_strict);
        let outer_expected_argument_count =
            std::mem::replace(&mut self.expected_argument_count, func.parameters.length());
        let outer_has_lexical_arguments =
            std::mem::replace(&mut self.has_lexical_arguments, has_lexical_arguments);

        self.scope.push(true);
        let body_result = (|| -> CompileResult<()> {
            scope::hoist_function(self, func)?;
            for statement in &func.body {
                self.compile_statement(statement)?;
            }
            self.emit(Opcode::PushUndefined);
            self.emit(Opcode::Return);
            Ok(())
        })();
        let num_own_bindings = self.scope.current_binding_count();
        self.scope.pop();

        let param_count = func.parameters.bindings.len();
        let has_rest = func.parameters.rest.is_some();
        let arguments_binding_index = if func.is_arrow || has_lexical_arguments {
            None
        } else {
            Some(0)
        };

        let code = std::mem::replace(&mut self.code, outer_code);
        let constants = std::mem::replace(&mut self.constants, outer_constants);
        let functions = std::mem::replace(&mut self.functions, outer_functions);
        let handlers = std::mem::replace(&mut self.handlers, outer_handlers);
        self.loops = outer_loops;
        self.pending_label = outer_pending_label;
        let compiled_name = std::mem::replace(&mut self.name, outer_name);
        self.kind = outer_kind;
        self.is_arrow = outer_is_arrow;
        self.is_strict = outer_is_strict;
        self.expected_argument_count = outer_expected_argument_count;
        self.has_lexical_arguments = outer_has_lexical_arguments;

        body_result?;

        let info = FunctionInfo {
            name: compiled_name,
            expected_argument_count: func.parameters.length(),
            param_count,
            has_rest,
            arguments_binding_index,
            is_strict,
            kind: ir_kind,
            is_arrow: func.is_arrow,
            num_own_bindings,
            has_lexical_arguments,
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

/// Compiles a whole script's top level into its own [`FunctionInfo`] (spec
/// §4.F: "the script top level compiles like a function body with no
/// parameters").
pub fn compile_script(script: &Script, interner: &Interner) -> CompileResult<Rc<FunctionInfo>> {
    let mut compiler = ByteCompiler::new(interner, None, script.is_strict);
    scope::hoist_script(&mut compiler, &script.body)?;
    for statement in &script.body {
        compiler.compile_statement(statement)?;
    }
    compiler.emit(Opcode::PushUndefined);
    compiler.emit(Opcode::Return);
    let num_bindings = compiler.scope.current_binding_count();
    let mut info = compiler.finish();
    info.num_own_bindings = num_bindings;
    validate_function(&info)?;
    Ok(Rc::new(info))
}
