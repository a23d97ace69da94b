#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "shelf: collection page decision core",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Decode a collection page location",
        long_about = "Parse a location and print its route, canonical filters, encoded query and error handler id.",
        after_help = "EXAMPLES:\n    # Decode a collection page\n    shelf decode '/en-US/firefox/collections/123/my-slug/?page=2'\n\n    # Emit machine-readable output\n    shelf decode '/en-US/firefox/collections/add/' --json"
    )]
    Decode(cmd::decode::DecodeArgs),

    #[command(
        next_help_heading = "Simulate",
        about = "Replay a script of page events",
        long_about = "Run a JSON array of page events through a collection page and print every command it emits.",
        after_help = "EXAMPLES:\n    # Replay a script as the collection owner\n    shelf replay events.json --viewer 123\n\n    # Read the script from stdin\n    cat events.json | shelf replay - --json"
    )]
    Replay(cmd::replay::ReplayArgs),

    #[command(
        next_help_heading = "Simulate",
        about = "Show where a removal lands",
        long_about = "Compute the page the collection shows after one add-on is removed from the current page.",
        after_help = "EXAMPLES:\n    # Last add-on on page 2\n    shelf reconcile --page 2 --count 2 --page-size 1"
    )]
    Reconcile(cmd::reconcile::ReconcileArgs),

    #[command(
        next_help_heading = "Utility",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash completions\n    shelf completions bash > /etc/bash_completion.d/shelf"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("SHELF_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "shelf=debug,info"
        } else {
            "shelf=info,warn"
        })
    });

    let format = env::var("SHELF_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let config = shelf_core::config::resolve_config(&project_root)?;

    match &cli.command {
        Commands::Decode(args) => cmd::decode::run_decode(args, output, &config),
        Commands::Replay(args) => cmd::replay::run_replay(args, output, &config),
        Commands::Reconcile(args) => cmd::reconcile::run_reconcile(args, output),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    if let Err(err) = run(&cli, output) {
        output::render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
