//! Hand-built programs exercising the scenarios SPEC_FULL.md §8 names.
//!
//! This engine has no parser (see `SPEC_FULL.md` §1/§6), so neither `cli`
//! nor `engine::tests` can load a `.js` file off disk — both instead run one
//! of the fixed [`Script`]s built here via [`ast::builder::Builder`]. `cli`
//! picks one by name (`esjs --demo <name>`); `engine::tests::scenarios`
//! asserts each one's result.

use crate::ast::builder::Builder;
use crate::ast::{BinaryOp, Expression, ForInit, FunctionKind, MethodKind, UpdateOp, VarDeclarator, VarKind};
use crate::ast::{BindingTarget, Script};
use boa_interner::Interner;

/// `(function f(n){ return n<2?n:f(n-1)+f(n-2); })(10)` — recursive named
/// function expression, conditional, recursion.
pub fn fibonacci() -> (Interner, Script) {
    let mut interner = Interner::default();
    let script = {
        let mut b = Builder::new(&mut interner);
        let f = b.sym("f");
        let n = b.sym("n");
        let body = vec![Builder::return_stmt(Some(Builder::conditional(
            Builder::bin(BinaryOp::LessThan, b.ident("n"), Builder::num(2.0)),
            b.ident("n"),
            Builder::bin(
                BinaryOp::Add,
                Builder::call(b.ident("f"), vec![Builder::bin(BinaryOp::Sub, b.ident("n"), Builder::num(1.0))]),
                Builder::call(b.ident("f"), vec![Builder::bin(BinaryOp::Sub, b.ident("n"), Builder::num(2.0))]),
            ),
        )))];
        let func_expr = Builder::function_expr(Some(f), Builder::params(vec![n]), body, FunctionKind::Normal);
        let call = Builder::call(func_expr, vec![Builder::num(10.0)]);
        Builder::script(vec![Builder::return_stmt(Some(call))], false)
    };
    (interner, script)
}

/// `let a=[]; for (let i=0;i<3;i++) a.push(()=>i); a.map(f=>f()).join(',')`
/// — per-iteration `let` binding in a `for` loop, captured by a closure.
pub fn per_iteration_closures() -> (Interner, Script) {
    let mut interner = Interner::default();
    let script = {
        let mut b = Builder::new(&mut interner);
        let a = b.sym("a");
        let i = b.sym("i");
        let f = b.sym("f");
        let push_call = Builder::expr_stmt(Builder::call(
            Builder::member(b.ident("a"), b.sym("push")),
            vec![Builder::arrow(Builder::params(vec![]), vec![Builder::return_stmt(Some(b.ident("i")))])],
        ));
        let for_loop = Builder::for_stmt(
            Some(ForInit::VarDecl(VarKind::Let, vec![VarDeclarator {
                target: BindingTarget::Identifier(i),
                init: Some(Builder::num(0.0)),
            }])),
            Some(Builder::bin(BinaryOp::LessThan, b.ident("i"), Builder::num(3.0))),
            Some(Builder::update(UpdateOp::Increment, false, b.ident("i"))),
            push_call,
        );
        let map_call = Builder::call(
            Builder::member(b.ident("a"), b.sym("map")),
            vec![Builder::arrow(
                Builder::params(vec![f]),
                vec![Builder::return_stmt(Some(Builder::call(b.ident("f"), vec![])))],
            )],
        );
        let join_call = Builder::call(Builder::member(map_call, b.sym("join")), vec![b.string(",")]);
        Builder::script(
            vec![
                Builder::var_decl(VarKind::Let, a, Some(Builder::array(vec![]))),
                for_loop,
                Builder::return_stmt(Some(join_call)),
            ],
            false,
        )
    };
    (interner, script)
}

/// `const x={}; Object.freeze(x); try{ x.y=1 }catch(e){} 'y' in x` — freeze
/// plus a silently-failing sloppy-mode property write, plus `in`.
pub fn frozen_object() -> (Interner, Script) {
    let mut interner = Interner::default();
    let script = {
        let mut b = Builder::new(&mut interner);
        let x = b.sym("x");
        let e = b.sym("e");
        let freeze_call =
            Builder::expr_stmt(Builder::call(Builder::member(b.ident("Object"), b.sym("freeze")), vec![b.ident("x")]));
        let assign = Builder::expr_stmt(Builder::assign(Builder::member(b.ident("x"), b.sym("y")), Builder::num(1.0)));
        let try_stmt = Builder::try_stmt(vec![assign], Some((Some(e), vec![])), None);
        let in_check = Builder::bin(BinaryOp::In, b.string("y"), b.ident("x"));
        Builder::script(
            vec![
                Builder::var_decl(VarKind::Const, x, Some(Expression::ObjectLiteral(vec![]))),
                freeze_call,
                try_stmt,
                Builder::return_stmt(Some(in_check)),
            ],
            false,
        )
    };
    (interner, script)
}

/// `class A{ m(){return 1} } class B extends A{ m(){return super.m()+2} }
/// new B().m()` — a derived class's synthesized default constructor
/// (`Opcode::SuperConstructSpread`) plus an explicit `super.m()` call.
pub fn derived_class_super() -> (Interner, Script) {
    let mut interner = Interner::default();
    let script = {
        let mut b = Builder::new(&mut interner);
        let class_a = b.sym("A");
        let class_b = b.sym("B");
        let m = b.sym("m");

        let method_a = Builder::method(m, MethodKind::Normal, false, Builder::params(vec![]), vec![
            Builder::return_stmt(Some(Builder::num(1.0))),
        ]);
        let decl_a = Builder::class_decl(class_a, None, None, vec![method_a]);

        let super_call = Builder::call(Builder::member(Expression::SuperBase, m), vec![]);
        let method_b = Builder::method(m, MethodKind::Normal, false, Builder::params(vec![]), vec![
            Builder::return_stmt(Some(Builder::bin(BinaryOp::Add, super_call, Builder::num(2.0)))),
        ]);
        let decl_b = Builder::class_decl(class_b, Some(b.ident("A")), None, vec![method_b]);

        let instance = Builder::new_expr(b.ident("B"), vec![]);
        let call = Builder::call(Builder::member(instance, m), vec![]);
        Builder::script(vec![decl_a, decl_b, Builder::return_stmt(Some(call))], false)
    };
    (interner, script)
}

/// `let t=0; Promise.resolve().then(()=>t=1); t` then, after a microtask
/// checkpoint, `t`. Split across two scripts since a `Promise` reaction only
/// runs once the embedder drains the job queue between them; communicates
/// through an implicit global (`t = 0`, no declaration) since declarative
/// top-level bindings don't survive across separate `Agent::run` calls —
/// see `engine::tests` module doc comment.
pub fn promise_reaction() -> (Interner, Script, Script) {
    let mut interner = Interner::default();
    let mut b = Builder::new(&mut interner);
    let before = Builder::script(
        vec![
            Builder::expr_stmt(Builder::assign(b.ident("t"), Builder::num(0.0))),
            Builder::expr_stmt(Builder::call(
                Builder::member(
                    Builder::call(Builder::member(b.ident("Promise"), b.sym("resolve")), vec![]),
                    b.sym("then"),
                ),
                vec![Builder::arrow(
                    Builder::params(vec![]),
                    vec![Builder::expr_stmt(Builder::assign(b.ident("t"), Builder::num(1.0)))],
                )],
            )),
            Builder::return_stmt(Some(b.ident("t"))),
        ],
        false,
    );
    let after = Builder::script(vec![Builder::return_stmt(Some(b.ident("t")))], false);
    (interner, before, after)
}

/// `try { null.x } catch(e){ e instanceof TypeError }` — member access on
/// `null` throws `TypeError`, checked with `instanceof`.
pub fn null_deref_type_error() -> (Interner, Script) {
    let mut interner = Interner::default();
    let script = {
        let mut b = Builder::new(&mut interner);
        let result = b.sym("result");
        let e = b.sym("e");
        let throwing = Builder::expr_stmt(Builder::member(Builder::null(), b.sym("x")));
        let catch_body = vec![Builder::expr_stmt(Builder::assign(
            b.ident("result"),
            Builder::bin(BinaryOp::InstanceOf, b.ident("e"), b.ident("TypeError")),
        ))];
        let try_stmt = Builder::try_stmt(vec![throwing], Some((Some(e), catch_body)), None);
        Builder::script(
            vec![Builder::var_decl(VarKind::Let, result, None), try_stmt, Builder::return_stmt(Some(b.ident("result")))],
            false,
        )
    };
    (interner, script)
}

/// Every demo name `cli --demo <NAME>` accepts, in the order SPEC_FULL.md §8
/// lists its scenarios.
pub const NAMES: &[&str] = &["fibonacci", "closures", "freeze", "super", "promise", "null-deref"];
