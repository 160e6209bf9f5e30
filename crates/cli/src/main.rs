// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grove` — the CLI surface over the filesystem-backed workflow engine.
//! Every subcommand builds a [`Context`] once, dispatches to a
//! `commands::*` module, and converts any error into a process exit code:
//! 0 on success, non-zero with a one-line message on stderr otherwise.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod context;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use context::Context;
use exit_error::ExitError;

#[derive(Parser, Debug)]
#[command(
    name = "grove",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "A filesystem-backed workflow orchestrator for DAGs of markdown jobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a plan directory and its `.grove-plan.yml`.
    Init(commands::init::InitArgs),
    /// Add a job to a plan.
    Add(commands::add::AddArgs),
    /// Run one job, the next runnable job, or an explicit run set.
    Run(commands::run::RunArgs),
    /// Mark an interactive-agent job completed.
    Complete(commands::complete::CompleteArgs),
    /// Set the active plan.
    Set(commands::plan_pointer::SetArgs),
    /// Unset the active plan.
    Unset,
    /// Print the active plan, if any.
    Current,
    /// Put a plan on hold.
    Hold(commands::plan_status::PlanArgs),
    /// Take a plan off hold.
    Unhold(commands::plan_status::PlanArgs),
    /// Mark a plan as under review.
    Review(commands::plan_status::PlanArgs),
    /// Mark a plan completed, optionally archiving its jobs.
    Finish(commands::plan_status::FinishArgs),
    /// List jobs in a plan.
    List(commands::list::ListArgs),
    /// Show a plan's status summary.
    Status(commands::status::StatusArgs),
    /// Render a plan's dependency graph.
    Graph(commands::graph::GraphArgs),
    /// Structural job edits.
    Jobs(commands::jobs::JobsArgs),
    /// Invoke a recipe action (not implemented by this engine).
    Action(commands::action::ActionArgs),
    /// Read-only plan consistency check.
    Doctor(commands::doctor::DoctorArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
        eprintln!("grove: {err:#}");
        std::process::exit(code);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new()?;
    ctx.install_ctrl_c_handler();

    match cli.command {
        Command::Init(args) => commands::init::run(&ctx, args),
        Command::Add(args) => commands::add::run(&ctx, args),
        Command::Run(args) => commands::run::run(&ctx, args).await,
        Command::Complete(args) => commands::complete::run(&ctx, args),
        Command::Set(args) => commands::plan_pointer::set(&ctx, args),
        Command::Unset => commands::plan_pointer::unset(&ctx),
        Command::Current => commands::plan_pointer::current(&ctx),
        Command::Hold(args) => commands::plan_status::hold(&ctx, args),
        Command::Unhold(args) => commands::plan_status::unhold(&ctx, args),
        Command::Review(args) => commands::plan_status::review(&ctx, args),
        Command::Finish(args) => commands::plan_status::finish(&ctx, args),
        Command::List(args) => commands::list::run(&ctx, args),
        Command::Status(args) => commands::status::run(&ctx, args),
        Command::Graph(args) => commands::graph::run(&ctx, args),
        Command::Jobs(args) => commands::jobs::run(&ctx, args),
        Command::Action(args) => commands::action::run(args),
        Command::Doctor(args) => commands::doctor::run(&ctx, args),
    }
}
