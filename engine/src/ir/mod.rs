//! The bytecode IR (spec §3 Opcode/FunctionInfo, §4.E, component E).
//!
//! Grounded on `examples/boa-dev-boa/boa/src/vm/{opcode.rs,code_block.rs}`:
//! one `FunctionInfo` per function (script top level counts as a function),
//! holding its own constant pool and a flat instruction list. Unlike the
//! teacher, which packs opcodes into a byte stream read back through the
//! `Readable` trait for cache-density, this IR keeps `Opcode` as a plain
//! tagged enum with operands embedded directly (spec §3 is explicit that
//! `Opcode` is "a tagged discriminated value", so the byte-packing layer is
//! an optimization this engine doesn't need).

mod validate;

pub use validate::validate_function;

use crate::bigint::JsBigInt;
use crate::string::JsString;
use crate::value::JsValue;
use boa_gc::{empty_trace, Finalize, Trace};
use boa_interner::Sym;
use std::rc::Rc;

/// An absolute instruction index within a single [`FunctionInfo`]'s code.
pub type InstrIndex = u32;

/// A compile-time constant, resolved to a runtime [`JsValue`] each time it is
/// pushed (this engine does not intern/cache constant allocations the way a
/// production VM would; see `DESIGN.md`).
#[derive(Debug, Clone)]
pub enum Constant {
    String(JsString),
    BigInt(JsBigInt),
    /// Numbers that aren't representable by the dedicated `PushZero`/`PushOne`
    /// opcodes still go through the constant pool rather than a variant per
    /// opcode, to keep the opcode count small.
    Number(f64),
}

impl Finalize for Constant {}
unsafe impl Trace for Constant {
    empty_trace!();
}

impl From<&Constant> for JsValue {
    fn from(value: &Constant) -> Self {
        match value {
            Constant::String(s) => JsValue::String(s.clone()),
            Constant::BigInt(b) => JsValue::BigInt(b.clone()),
            Constant::Number(n) => JsValue::Number(*n),
        }
    }
}

/// The kind of callable a `FunctionInfo` produces (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Trace, Finalize)]
pub enum FunctionKind {
    Normal,
    Generator,
}

/// A `try`/`catch`/`finally` instruction range (spec §4.G "handler regions").
///
/// `[try_start, try_end)` is the protected range. On a throw inside it, the
/// VM unwinds the operand stack and environment stack to the recorded
/// depths and jumps to `handler` (if present) or straight to `finally`.
#[derive(Debug, Clone, Copy, Trace, Finalize)]
pub struct HandlerRegion {
    pub try_start: InstrIndex,
    pub try_end: InstrIndex,
    pub handler: Option<InstrIndex>,
    pub finally: Option<InstrIndex>,
    pub env_depth: u32,
    pub stack_depth: u32,
}

/// One compiled function (or the top level of a script/module), spec §3
/// `FunctionInfo`.
#[derive(Debug, Trace, Finalize)]
pub struct FunctionInfo {
    pub name: Option<String>,
    pub expected_argument_count: usize,
    /// Number of positional parameter slots (excludes a rest parameter).
    pub param_count: usize,
    pub has_rest: bool,
    /// `Some` when this function needs an implicit `arguments` object
    /// (spec §9 resolution: always unmapped, and only created when nothing
    /// in the function shadows the name — see `has_lexical_arguments`).
    /// `arguments` has no scope slot of its own; `Opcode::PushArguments`
    /// builds it directly from the call's raw argument list.
    pub arguments_binding_index: Option<usize>,
    pub is_strict: bool,
    pub kind: FunctionKind,
    pub is_arrow: bool,
    /// Number of binding slots in this function's own top-level
    /// (parameter + `var`) environment record.
    pub num_own_bindings: usize,
    /// `true` if any parameter or inner declaration named `arguments`
    /// shadows the implicit one (spec §9 resolution: `arguments` is always
    /// unmapped, but still skipped entirely when shadowed).
    pub has_lexical_arguments: bool,
    pub code: Vec<Opcode>,
    pub constants: Vec<Constant>,
    pub functions: Vec<Rc<FunctionInfo>>,
    pub handlers: Vec<HandlerRegion>,
}

/// The opcodes of the VM (spec §4.E/§4.G). Doc comments note stack effect as
/// `pops => pushes`; every opcode's effect is fixed regardless of whether an
/// embedded conditional jump is taken (the bytecompiler is responsible for
/// keeping both control-flow edges into a join point at the same stack
/// height, checked by [`validate_function`]).
#[derive(Debug, Clone, Trace, Finalize)]
pub enum Opcode {
    /// `=> ` pop the computed value, discarding it.
    Pop,
    /// `v => v, v`
    Dup,
    /// `v1, v2 => v2, v1`
    Swap,
    /// `a, b => a, b, a`; duplicates the second-from-top value. Used to keep
    /// an object/key pair live across a `[[Get]]` that precedes a matching
    /// `[[Set]]` (compound member assignment), two of these build the pair
    /// `a, b => a, b, a, b`.
    Over,

    PushUndefined,
    PushNull,
    PushTrue,
    PushFalse,
    PushZero,
    PushOne,
    PushNaN,
    PushInfinity,
    PushNegInfinity,
    /// `=> constants[index]`
    PushConstant(u32),
    /// `=> this`
    PushThis,
    /// `=> new.target (or undefined outside a constructor call)`
    PushNewTarget,
    /// `=> the [[HomeObject]]'s prototype, for \`super\` property access`
    PushSuperBase,
    /// `=> arguments`; builds this call's unmapped arguments array-like
    /// object on demand (spec §9 simplification, see `DESIGN.md`). Only
    /// emitted when `FunctionInfo::arguments_binding_index` is `Some`.
    PushArguments,
    /// `=> the active function's [[GetPrototypeOf]]`; the synthesized
    /// derived-class default constructor's only use of `super` (spec §4.F
    /// "GetSuperConstructor"). Only valid while executing a `Derived`
    /// constructor's body.
    PushSuperConstructor,

    PushEmptyObject,
    PushEmptyArray,
    /// `array, array, value => array` (array duplicated via `Dup` first)
    AppendArrayElement,
    /// `array, array, iterable => array`; iterates an array-exotic iterable
    /// (spec §9 simplification: only real arrays and generators are
    /// spreadable, see `DESIGN.md`) and appends each produced value.
    SpreadArrayElement,
    /// `object, object, key, value => object`
    DefineDataProperty,
    /// `object, object, key, function => object`; `bool` is `true` for a
    /// getter, `false` for a setter.
    DefineAccessorProperty(bool),
    /// `object, object, source => object`; copies source's own enumerable
    /// properties onto object (object literal `...spread`).
    CopyDataProperties,

    /// Resolves a binding read (spec §4.C). Throws `ReferenceError` for an
    /// uninitialized (TDZ) or undeclared global binding.
    GetBinding(BindingRef),
    /// Initializes a binding for the first time (`let`/`const`/parameter
    /// binding, function/class declaration hoisting). Never throws.
    InitBinding(BindingRef),
    /// `value =>`; assigns an existing binding. Throws for `const`
    /// reassignment or an undeclared strict-mode global.
    SetBinding(BindingRef),

    PushDeclarativeEnvironment(u32),
    PopEnvironment,

    /// `object, key => value`
    GetProperty,
    /// `object, key, value => value`; throws a `TypeError` itself for a
    /// failed strict-mode assignment rather than surfacing `[[Set]]`'s
    /// boolean result, so assignment expressions (which evaluate to the
    /// assigned value) never need to juggle it off the stack.
    SetProperty,
    /// `object, key => result`; read-modify-write update for `++`/`--` on a
    /// member expression. Folds `[[Get]]`, `Inc`/`Dec`, and `[[Set]]` into
    /// one opcode — the plain stack opcodes can't express "keep the pre- or
    /// post-update value, whichever `prefix` asks for" without a temporary
    /// this engine doesn't otherwise allocate per-expression.
    UpdateProperty {
        increment: bool,
        prefix: bool,
    },
    /// `object, key => bool`
    DeleteProperty,
    /// `object, key => bool`
    HasProperty,
    /// `value => string`
    TypeOf,
    /// `object, ctor => bool`
    InstanceOf,

    UnaryPlus,
    UnaryMinus,
    UnaryNot,
    UnaryBitNot,
    UnaryVoid,
    /// `=> bool`; `typeof` without a ReferenceError for an unresolved
    /// global (spec §4.F `typeof x` on an undeclared `x`).
    TypeOfBinding(BindingRef),

    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    /// Pre/post `++`/`--`; `bool` is `true` for increment. Operates on the
    /// top-of-stack value, pushing the updated numeric/bigint value;
    /// reads/writes of the underlying binding or property are emitted by
    /// the bytecompiler around this opcode.
    Inc,
    Dec,

    Jump(InstrIndex),
    /// `value =>`; jump if the popped value is falsy.
    JumpIfFalse(InstrIndex),
    /// `value =>`; jump if the popped value is truthy.
    JumpIfTrue(InstrIndex),
    /// `value =>`; jump if the popped value is `null`/`undefined`.
    JumpIfNullish(InstrIndex),

    /// `callee, this, arg1, .., argN =>` pop `2 + argc`, push the call
    /// result.
    Call(u32),
    /// `callee, this, argsArray => result`
    CallSpread,
    /// `callee, arg1, .., argN => result` (callee doubles as `new.target`)
    Construct(u32),
    ConstructSpread,
    /// `superCtor, argsArray => result`; the synthesized derived-class
    /// default constructor's `super(...args)` call. Unlike `ConstructSpread`,
    /// `new.target` is the *current* frame's `new_target` (the most-derived
    /// class being constructed), not `superCtor` itself — no surface syntax
    /// other than that synthesized constructor ever emits this opcode, see
    /// `bytecompiler::compile_derived_default_constructor`.
    SuperConstructSpread,

    Return,
    Throw,
    /// Re-throws the value currently being unwound (used at the end of a
    /// compiled `finally` block that has no explicit control transfer).
    ReThrow,

    /// Creates a closure from `functions[index]`, capturing the current
    /// environment stack, and pushes it (spec §4.F "closures capture the
    /// environment active when the function expression evaluates").
    CreateClosure(u32),
    /// Creates a class constructor function object from `functions[index]`,
    /// consuming the (optional) already-evaluated superclass below the
    /// method list on the stack. `method_count` data methods and
    /// `accessor_count * 2` get/set methods were pushed before this opcode
    /// as `(key, function)` / `(key, function, function)` tuples.
    CreateClass {
        ctor_index: u32,
        has_super_class: bool,
        method_count: u32,
    },

    /// Begins a `for-in` enumeration: pops the object, pushes an opaque
    /// enumerator handle.
    ForInStart,
    /// `enumerator => enumerator, key, bool`; the trailing bool is `false`
    /// when enumeration is exhausted (key is then `undefined`).
    ForInNext,

    /// Begins a `for-of`/spread iteration: pops the iterable, pushes an
    /// opaque iterator handle (spec §9 simplification: only arrays and
    /// generator objects are iterable).
    GetIterator,
    /// `iterator => iterator, value, bool`; bool `false` means done.
    IteratorNext,
    /// `iterator =>`; calls `return()` on the iterator if present, used to
    /// close iterators on early `break`/`return` out of a `for-of`.
    IteratorClose,

    /// Suspends the current generator, yielding the popped value to the
    /// caller of `.next()`. On resume, pushes the value passed to the next
    /// `.next(value)` call.
    Yield,

    /// `this_value =>`; binds `this` on the current call's own function
    /// environment (the topmost frame at the point this executes). Emitted
    /// once, right after the `super(...)` construct call in a synthesized
    /// derived-class default constructor, which runs before any nested
    /// block can have been pushed — so "topmost frame" always means this
    /// call's own top-level scope here.
    BindThis,

    Nop,
}

/// A resolved variable reference baked into the bytecode (spec §4.F scope
/// analysis output).
#[derive(Debug, Clone, Copy, Trace, Finalize)]
pub enum BindingRef {
    Declarative {
        environment_index: u32,
        binding_index: u32,
        mutable: bool,
        name: SymWrapper,
    },
    Global(SymWrapper),
}

/// `boa_interner::Sym` doesn't implement `Trace`/`Finalize` itself; it is a
/// plain `NonZeroU32`-backed index with no heap pointers, so this wrapper
/// marks it as a GC leaf the same way `JsString`/`JsBigInt` do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymWrapper(pub Sym);

impl Finalize for SymWrapper {}
unsafe impl Trace for SymWrapper {
    empty_trace!();
}
