//! Compile-time tracking of lexical scope, mirroring
//! `examples/boa-dev-boa/boa/src/environments/compile.rs`.
//!
//! This is the data structure `bytecompiler::scope` pushes/pops as it walks
//! into and out of blocks and function bodies, assigning each declared
//! binding a slot index that the runtime `DeclarativeEnvironmentStack`
//! (`super::runtime`) will later use unchanged.

use boa_interner::Sym;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy)]
struct CompileTimeBinding {
    index: usize,
    mutable: bool,
}

#[derive(Debug)]
pub struct CompileTimeEnvironment {
    bindings: FxHashMap<Sym, CompileTimeBinding>,
    function_scope: bool,
}

impl CompileTimeEnvironment {
    fn new(function_scope: bool) -> Self {
        Self {
            bindings: FxHashMap::default(),
            function_scope,
        }
    }

    pub fn num_bindings(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_function_scope(&self) -> bool {
        self.function_scope
    }
}

/// The stack of lexical scopes in effect at the point the compiler is
/// currently lowering. Index 0 is this function's own top-level scope (the
/// function-parameter/`var` scope); deeper indices are nested blocks.
#[derive(Debug)]
pub struct CompileTimeEnvironmentStack {
    stack: Vec<CompileTimeEnvironment>,
}

impl CompileTimeEnvironmentStack {
    /// A fresh stack seeded for the start of a function body (or the top
    /// level of a script).
    pub fn new() -> Self {
        Self {
            stack: vec![CompileTimeEnvironment::new(true)],
        }
    }

    pub fn push(&mut self, function_scope: bool) {
        self.stack.push(CompileTimeEnvironment::new(function_scope));
    }

    /// Pops the innermost scope, returning its final binding count so the
    /// compiler can emit the matching `PushDeclarativeEnvironment`/
    /// `PopEnvironment` pair with the right size.
    pub fn pop(&mut self) -> CompileTimeEnvironment {
        assert!(self.stack.len() > 1, "cannot pop the function's own scope");
        self.stack.pop().expect("checked above")
    }

    pub fn current_binding_count(&self) -> usize {
        self.stack
            .last()
            .expect("scope stack is never empty")
            .num_bindings()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Declares `name` in the innermost scope, returning its binding index.
    /// Re-declaring an existing name in the same scope returns the existing
    /// index (matching `var` re-declaration semantics); callers that need
    /// "already declared" detection for `let`/`const` check first with
    /// [`Self::has_binding_in_current_scope`].
    pub fn declare(&mut self, name: Sym, mutable: bool) -> usize {
        let scope = self.stack.last_mut().expect("scope stack is never empty");
        if let Some(binding) = scope.bindings.get(&name) {
            return binding.index;
        }
        let index = scope.bindings.len();
        scope.bindings.insert(name, CompileTimeBinding { index, mutable });
        index
    }

    pub fn has_binding_in_current_scope(&self, name: Sym) -> bool {
        self.stack
            .last()
            .expect("scope stack is never empty")
            .bindings
            .contains_key(&name)
    }

    /// Resolves `name` to `(environment_index, binding_index, mutable)`,
    /// walking outward from the innermost scope. `environment_index` counts
    /// from the bottom (0 = this function's own scope), matching the
    /// runtime `DeclarativeEnvironmentStack` indexing.
    pub fn resolve(&self, name: Sym) -> Option<(usize, usize, bool)> {
        for (depth, scope) in self.stack.iter().enumerate().rev() {
            if let Some(binding) = scope.bindings.get(&name) {
                return Some((depth, binding.index, binding.mutable));
            }
        }
        None
    }
}

impl Default for CompileTimeEnvironmentStack {
    fn default() -> Self {
        Self::new()
    }
}
