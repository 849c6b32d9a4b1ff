//! Runtime representation of environment records (spec §3 Environment
//! record, §4.C, component C).
//!
//! Grounded closely on `examples/boa-dev-boa/boa/src/environments/runtime.rs`:
//! bindings are stored as a fixed-size list of optional values per
//! environment (`None` encodes the temporal dead zone) instead of a hashmap,
//! because the bytecompiler assigns each binding a slot index up front.
//!
//! One deliberate simplification from the teacher: the teacher keeps a
//! single environment stack shared by the whole running program and
//! restores it across calls by index bookkeeping. Here each closure instead
//! captures its own environment chain (a `DeclarativeEnvironmentStack`
//! snapshot, cheap to clone since it is a `Vec` of `Gc` pointers) at
//! creation time, and a call starts a fresh stack from that snapshot. This
//! is simpler to reason about for recursive/re-entrant calls and is
//! semantically equivalent; see `DESIGN.md`.

use crate::value::JsValue;
use boa_gc::{Finalize, Gc, GcRefCell, Trace};
use boa_interner::Sym;

/// A single declarative environment record: a fixed-size list of binding
/// slots, plus an optional `this` binding for function environments (spec
/// §4.C "function environment record").
#[derive(Debug, Trace, Finalize)]
pub struct DeclarativeEnvironment {
    bindings: GcRefCell<Vec<Option<JsValue>>>,
    this: GcRefCell<Option<JsValue>>,
}

impl DeclarativeEnvironment {
    fn new(num_bindings: usize, this: Option<JsValue>) -> Gc<Self> {
        Gc::new(Self {
            bindings: GcRefCell::new(vec![None; num_bindings]),
            this: GcRefCell::new(this),
        })
    }

    /// Panics if the slot is out of range; slot indices come from the
    /// bytecompiler and are always in range by construction.
    pub fn get(&self, index: usize) -> JsValue {
        self.bindings.borrow()[index]
            .clone()
            .expect("binding accessed before initialization (TDZ)")
    }

    pub fn get_optional(&self, index: usize) -> Option<JsValue> {
        self.bindings.borrow()[index].clone()
    }

    pub fn set(&self, index: usize, value: JsValue) {
        self.bindings.borrow_mut()[index] = Some(value);
    }

    pub fn set_if_uninitialized(&self, index: usize, value: JsValue) {
        let mut bindings = self.bindings.borrow_mut();
        if bindings[index].is_none() {
            bindings[index] = Some(value);
        }
    }

    pub fn is_initialized(&self, index: usize) -> bool {
        self.bindings.borrow()[index].is_some()
    }

    pub fn this(&self) -> Option<JsValue> {
        self.this.borrow().clone()
    }

    /// Binds (or rebinds) this environment's `this`. Used by a derived
    /// class's synthesized default constructor to bind `this` once its
    /// `super(...)` call returns (spec §4.F "GetSuperConstructor").
    pub fn set_this(&self, value: JsValue) {
        *self.this.borrow_mut() = Some(value);
    }
}

/// A call-local stack of declarative environments: the lexical chain in
/// effect at a given point in execution (spec §3 "chained ... environment
/// records").
#[derive(Clone, Debug, Default, Trace, Finalize)]
pub struct DeclarativeEnvironmentStack {
    stack: Vec<Gc<DeclarativeEnvironment>>,
}

impl DeclarativeEnvironmentStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn push_declarative(&mut self, num_bindings: usize) {
        self.stack.push(DeclarativeEnvironment::new(num_bindings, None));
    }

    pub fn push_function(&mut self, num_bindings: usize, this: Option<JsValue>) {
        self.stack.push(DeclarativeEnvironment::new(num_bindings, this));
    }

    pub fn pop(&mut self) -> Option<Gc<DeclarativeEnvironment>> {
        self.stack.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.stack.truncate(len);
    }

    /// The environment at `environment_index` counting from the bottom of
    /// this call's chain (0 = the outermost environment captured by the
    /// current closure).
    pub fn at(&self, environment_index: usize) -> &Gc<DeclarativeEnvironment> {
        self.stack
            .get(environment_index)
            .expect("environment index must be in range")
    }

    /// The `this` binding of the nearest enclosing function environment
    /// (arrow functions have none of their own and walk outward).
    pub fn get_this(&self) -> Option<JsValue> {
        for env in self.stack.iter().rev() {
            if let Some(this) = env.this() {
                return Some(this);
            }
        }
        None
    }

    /// Snapshot the current chain for a closure being created right now
    /// (spec §4.F: "closures capture the environment active when the
    /// function expression evaluates").
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Binds `this` on the topmost environment in this call's chain. Only
    /// meaningful for the synthesized derived-class default constructor's
    /// `BindThis` opcode, which always runs before any nested block could
    /// have pushed a further frame, so "topmost" is unambiguous there.
    pub fn bind_this_on_top(&self, value: JsValue) {
        self.stack
            .last()
            .expect("BindThis requires at least one environment on the stack")
            .set_this(value);
    }
}

/// Resolved information about where a binding lives, computed once at
/// compile time and baked into the bytecode (spec §4.F scope analysis).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BindingLocator {
    name: Sym,
    environment_index: usize,
    binding_index: usize,
    global: bool,
}

impl BindingLocator {
    pub fn declarative(name: Sym, environment_index: usize, binding_index: usize) -> Self {
        Self {
            name,
            environment_index,
            binding_index,
            global: false,
        }
    }

    pub fn global(name: Sym) -> Self {
        Self {
            name,
            environment_index: 0,
            binding_index: 0,
            global: true,
        }
    }

    pub fn name(&self) -> Sym {
        self.name
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn environment_index(&self) -> usize {
        self.environment_index
    }

    pub fn binding_index(&self) -> usize {
        self.binding_index
    }
}
