use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use marshal_core::manager::{TargetManager, TargetManagerConfig};
use marshal_core::MarshalError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

/// Marshal - run build and test targets in dependency order
#[derive(Parser)]
#[command(name = "marshal")]
#[command(about = "Run build and test targets in dependency order")]
#[command(version)]
struct Cli {
    /// Targets file (defaults to marshal.yml, marshal.yaml or marshal.toml in the current directory)
    #[arg(short, long, env = "MARSHAL_FILE", global = true)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run targets and their prerequisites
    Run {
        /// Targets to run (defaults to the file's default target)
        targets: Vec<String>,
        /// Define a variable, overriding the environment and the targets file
        #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,
        /// Print the commands that would run without running them
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Run every reached target even if its output is up to date
        #[arg(short = 'B', long)]
        always_make: bool,
    },
    /// Show the execution order for targets without running them
    Plan {
        /// Targets to plan (defaults to the file's default target)
        targets: Vec<String>,
        /// Define a variable, overriding the environment and the targets file
        #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
        defines: Vec<String>,
        /// Treat every target as out of date
        #[arg(short = 'B', long)]
        always_make: bool,
    },
    /// List targets in the targets file
    List,
    /// Show the target dependency graph
    Graph,
    /// Print the JSON schema of the targets file
    Schema,
}

/// Initialize the tracing subscriber for logging.
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` is honored and
/// only warnings are shown by default.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("marshal_core=debug,marshal_cli=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("marshal_core=warn,marshal_cli=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Process exit status for an error, looking through any added context
fn exit_status(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<MarshalError>()
        .map(MarshalError::exit_code)
        .unwrap_or(1);
    u8::try_from(code).unwrap_or(1)
}

async fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    let working_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let manager = TargetManager::new(TargetManagerConfig {
        working_dir,
        config_file: cli.file,
    })
    .context("Failed to load targets")?;
    tracing::debug!("Using targets file {}", manager.config_path.display());

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::Run {
            targets,
            defines,
            dry_run,
            always_make,
        } => commands::run::execute(&manager, &targets, &defines, dry_run, always_make).await,
        Commands::Plan {
            targets,
            defines,
            always_make,
        } => commands::plan::execute(&manager, &targets, &defines, always_make),
        Commands::List => commands::list::execute(&manager),
        Commands::Graph => commands::graph::execute(&manager),
        Commands::Schema => commands::schema::execute(),
    }
}
