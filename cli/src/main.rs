//! `esjs`: a thin front end over [`esjs_engine`].
//!
//! `esjs_engine` deliberately has no lexer/parser (see its crate doc comment
//! and `SPEC_FULL.md` §1) — there is nothing in this workspace that turns
//! `.js` source text into a [`esjs_engine::ast::Script`]. Until an embedder
//! supplies one, this binary runs one of the fixed programs in
//! [`esjs_engine::demos`] by name instead of a file path, the same programs
//! `engine::tests::scenarios` asserts against. `--list` prints the available
//! names; everything else (argument parsing via `clap`, error rendering via
//! `colored`) is the thin glue `SPEC_FULL.md` §1 describes.

use clap::Parser;
use colored::Colorize;
use esjs_engine::agent::{Agent, RunOutcome};
use esjs_engine::demos;
use esjs_engine::value::JsValue;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "esjs", about = "Run one of esjs_engine's fixed demo programs")]
struct Args {
    /// Which demo program to run.
    #[arg(long, default_value = "fibonacci")]
    demo: String,

    /// List the available demo names and exit.
    #[arg(long)]
    list: bool,

    /// Print each demo's compiled bytecode before running it.
    #[arg(long)]
    print_ir: bool,

    /// Override the call-stack depth limit (spec §4.F stack overflow check).
    #[arg(long)]
    stack_limit: Option<usize>,
}

pub fn main() -> ExitCode {
    let args = Args::parse();

    if args.list {
        for name in demos::NAMES {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match args.demo.as_str() {
        "fibonacci" => run_one(&args, demos::fibonacci()),
        "closures" => run_one(&args, demos::per_iteration_closures()),
        "freeze" => run_one(&args, demos::frozen_object()),
        "super" => run_one(&args, demos::derived_class_super()),
        "null-deref" => run_one(&args, demos::null_deref_type_error()),
        "promise" => run_promise(&args),
        other => {
            eprintln!("{}", format!("unknown demo {other:?}; pass --list to see the options").red());
            ExitCode::FAILURE
        }
    }
}

fn run_one(args: &Args, (interner, script): (boa_interner::Interner, esjs_engine::ast::Script)) -> ExitCode {
    let mut agent = Agent::new(&interner);
    agent.print_ir = args.print_ir;
    if let Some(limit) = args.stack_limit {
        agent.set_stack_size_limit(limit);
    }
    let outcome = agent.run(&script, &interner);
    agent.run_jobs();
    exit_code(report(&mut agent, outcome))
}

/// The `promise` demo splits into two scripts around a `run_jobs` (spec §6
/// `blockUntilEmpty`) call, the only demo that needs to observe a `Promise`
/// reaction land.
fn run_promise(args: &Args) -> ExitCode {
    let (interner, before, after) = demos::promise_reaction();
    let mut agent = Agent::new(&interner);
    agent.print_ir = args.print_ir;
    if let Some(limit) = args.stack_limit {
        agent.set_stack_size_limit(limit);
    }

    let first = agent.run(&before, &interner);
    if !report(&mut agent, first) {
        return ExitCode::FAILURE;
    }
    agent.run_jobs();
    let second = agent.run(&after, &interner);
    exit_code(report(&mut agent, second))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints `outcome`, returning whether it was a success.
fn report(agent: &mut Agent, outcome: RunOutcome) -> bool {
    for dump in agent.take_ir_dump() {
        println!("{dump}");
    }
    match outcome {
        RunOutcome::Success(value) => {
            println!("{}", format!("{value:?}").green());
            true
        }
        RunOutcome::RuntimeError(thrown) => {
            eprintln!("{}", describe_thrown(agent, &thrown).red());
            false
        }
        RunOutcome::InternalError(err) => {
            eprintln!("{}", format!("internal error: {err}").red());
            false
        }
        RunOutcome::ParseError(err) => {
            eprintln!("{}", format!("parse error: {}", err.reason).red());
            false
        }
    }
}

/// Renders a thrown value as `Name: message` when it looks like an `Error`
/// instance, falling back to its `Debug` form for anything thrown bare
/// (`throw 42;`).
fn describe_thrown(agent: &mut Agent, thrown: &JsValue) -> String {
    let Some(object) = thrown.as_object() else {
        return format!("{thrown:?}");
    };
    let name = object.get_v("name", agent).ok().and_then(|v| v.as_string().map(|s| s.to_std_string_lossy()));
    let message = object.get_v("message", agent).ok().and_then(|v| v.as_string().map(|s| s.to_std_string_lossy()));
    match (name, message) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        _ => format!("{thrown:?}"),
    }
}
