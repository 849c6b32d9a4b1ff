use super::Statement;
use boa_interner::Sym;

/// A binding target: either a plain identifier, or a destructuring pattern.
///
/// Patterns are parsed (so the AST can represent real-world source) but are
/// rejected by the compiler — see spec §9 open question (a) and
/// `DESIGN.md`'s "Open-question decisions".
#[derive(Debug, Clone)]
pub enum BindingTarget {
    Identifier(Sym),
    Pattern,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub target: BindingTarget,
    pub default: Option<super::Expression>,
}

#[derive(Debug, Clone, Default)]
pub struct Parameters {
    pub bindings: Vec<Parameter>,
    pub rest: Option<BindingTarget>,
}

impl Parameters {
    /// Number of formal parameters, not counting a rest parameter, used to
    /// compute `function.length` and `FunctionInfo::arg_count`.
    pub fn length(&self) -> usize {
        self.bindings
            .iter()
            .take_while(|p| p.default.is_none())
            .count()
    }

    pub fn is_simple(&self) -> bool {
        self.rest.is_none()
            && self
                .bindings
                .iter()
                .all(|p| p.default.is_none() && matches!(p.target, BindingTarget::Identifier(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Normal,
    Generator,
    Async,
    AsyncGenerator,
}

/// A function/method/arrow-function body as produced by the parser.
///
/// Mirrors `boa_ast::function::FormalParameterList` + function body pairing;
/// see `examples/boa-dev-boa/boa_ast/src/function/mod.rs`.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<Sym>,
    pub parameters: Parameters,
    pub body: Vec<Statement>,
    pub kind: FunctionKind,
    pub is_arrow: bool,
    pub is_strict: bool,
}
