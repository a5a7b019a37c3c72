//! `hsmap query`: look a product up across every loaded country.

use std::path::PathBuf;

use clap::Args;
use hsmap_io::load_query_engine;
use hsmap_recon::{QueryOutcome, QueryResult};

use crate::exit_codes::{EXIT_QUERY_EMPTY, EXIT_QUERY_NOT_FOUND, EXIT_QUERY_NO_DATA};
use crate::project::load_project;
use crate::CliError;

#[derive(Args)]
#[command(after_help = "\
Examples:
  hsmap query project.toml 不锈钢螺栓
  hsmap query project.toml 螺栓 --fuzzy
  hsmap query project.toml 螺栓 --fuzzy --json")]
pub struct QueryArgs {
    /// Path to the project TOML config
    pub config: PathBuf,

    /// Product name (exact) or keyword (with --fuzzy)
    pub product: String,

    /// Case-insensitive substring match instead of exact name
    #[arg(long)]
    pub fuzzy: bool,

    /// Print the outcome as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_query(args: QueryArgs) -> Result<(), CliError> {
    let project = load_project(&args.config)?;

    let (engine, warnings) = load_query_engine(&project.config, &project.base_dir);
    for w in &warnings {
        eprintln!("warning: skipped {w}");
    }
    if engine.is_empty() {
        return Err(CliError {
            code: EXIT_QUERY_NO_DATA,
            message: "no country table could be loaded".into(),
            hint: Some("run `hsmap resolve` first or check the paths in the config".into()),
        });
    }

    let outcome = if args.fuzzy {
        engine.fuzzy_query(&args.product)
    } else {
        engine.exact_query(&args.product)
    };

    if args.json {
        let json_str = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else if let QueryOutcome::Found(ref result) = outcome {
        print_result(result);
    }

    match outcome {
        QueryOutcome::Found(result) => {
            eprintln!("{}", result.status_line());
            Ok(())
        }
        QueryOutcome::NotFound { query } => Err(CliError {
            code: EXIT_QUERY_NOT_FOUND,
            message: format!("no product matches '{query}'"),
            hint: (!args.fuzzy).then(|| "try --fuzzy for a substring match".to_string()),
        }),
        QueryOutcome::EmptyQuery => Err(CliError {
            code: EXIT_QUERY_EMPTY,
            message: "empty query".into(),
            hint: Some("enter a product name".into()),
        }),
    }
}

fn print_result(result: &QueryResult) {
    println!("Domestic codes:");
    for d in &result.domestic {
        println!("  {}  {}", d.code, d.description);
    }
    println!();
    println!("Country codes:");
    for row in &result.rows {
        println!(
            "  {}\t{}\t{}\t{}\t{}",
            row.country, row.product, row.foreign_code, row.foreign_description, row.translated_description
        );
    }
}
