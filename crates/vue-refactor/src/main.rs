//! vue-refactor - structural refactorings for Vue single file components.

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod orchestrator;
mod output;

use cli::Args;
use orchestrator::Orchestrator;
use output::OutputFormatter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logger(args.verbose);

    // Set up miette for nice error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    // Determine workspace
    let workspace = args
        .workspace
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let orchestrator = Orchestrator::new(workspace, &args)?;
    let formatter = OutputFormatter::new(args.output, args.dry_run);

    let report = orchestrator.run(args.command).await?;
    formatter.print_report(&report);
    Ok(ExitCode::SUCCESS)
}

/// Log to stderr so that JSON output on stdout stays parseable.
fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("vue_refactor=debug,vue_editor=debug,vue_script=debug,vue_markup=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
