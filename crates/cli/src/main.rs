// hsmap command-line interface

mod exit_codes;
mod oracle;
mod project;
mod query;
mod resolve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::*;

#[derive(Parser)]
#[command(name = "hsmap")]
#[command(about = "Reconcile and look up HS customs codes across countries")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log progress (info level); RUST_LOG overrides
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one-to-many candidate tables into one code per product
    Resolve(resolve::ResolveArgs),

    /// Look a product up in every country's resolved table
    Query(query::QueryArgs),

    /// Validate a project config and report which country tables load
    #[command(after_help = "\
Examples:
  hsmap validate project.toml")]
    Validate {
        /// Path to the project TOML config
        config: PathBuf,
    },

    /// Oracle backend diagnostics
    Oracle {
        #[command(subcommand)]
        command: oracle::OracleCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  hsmap-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve(args) => resolve::cmd_resolve(args),
        Commands::Query(args) => query::cmd_query(args),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Oracle { command } => oracle::cmd_oracle(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let project = project::load_project(&config_path)?;
    let config = &project.config;

    println!("{}: {} country(ies)", config.name, config.countries.len());
    for country in &config.countries {
        let candidates = country.candidates.as_deref().unwrap_or("-");
        println!(
            "  {}\tcode column {}\tresolved {}\tcandidates {}",
            country.name, country.foreign_code_column, country.resolved, candidates
        );
    }

    let (engine, warnings) = hsmap_io::load_query_engine(config, &project.base_dir);
    for w in &warnings {
        println!("warning: {w}");
    }
    println!(
        "{} of {} resolved table(s) load",
        engine.countries().count(),
        config.countries.len()
    );

    if engine.is_empty() {
        return Err(CliError {
            code: EXIT_QUERY_NO_DATA,
            message: "no resolved table loads yet".into(),
            hint: Some("run `hsmap resolve` to produce the resolved tables".into()),
        });
    }
    Ok(())
}
