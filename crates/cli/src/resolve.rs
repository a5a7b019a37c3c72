//! `hsmap resolve`: collapse candidate tables into resolved tables.

use std::path::PathBuf;

use clap::Args;
use hsmap_config::{OracleOverrides, ResolvedOracleConfig, Settings};
use hsmap_io::{load_candidates, save_resolved};
use hsmap_oracle::oracle_from_config;
use hsmap_recon::{CachingOracle, CountryConfig, Oracle, ResolutionPipeline, ResolutionRun};

use crate::exit_codes::{EXIT_RESOLVE_FALLBACK, EXIT_RESOLVE_INPUT, EXIT_RESOLVE_WRITE, EXIT_USAGE};
use crate::project::{load_project, Project};
use crate::CliError;

#[derive(Args)]
#[command(after_help = "\
Examples:
  hsmap resolve project.toml
  hsmap resolve project.toml --country 美国 --country 日本
  hsmap resolve project.toml --json --cache
  hsmap resolve project.toml --endpoint http://gpu-box:11434/v1 --model qwen2.5:7b
  hsmap resolve project.toml --fail-on-fallback")]
pub struct ResolveArgs {
    /// Path to the project TOML config
    pub config: PathBuf,

    /// Resolve only these countries (repeatable); default is every country with a candidates table
    #[arg(long = "country")]
    pub countries: Vec<String>,

    /// Print the run reports as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the run reports as JSON to a file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Reuse oracle answers for identical option sets
    #[arg(long)]
    pub cache: bool,

    /// Exit non-zero if any group fell back to the digit-count rule
    #[arg(long)]
    pub fail_on_fallback: bool,

    /// Disable the oracle; every ambiguous group takes the fallback path
    #[arg(long)]
    pub no_oracle: bool,

    /// Override the oracle endpoint (OpenAI-compatible base URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the oracle model
    #[arg(long)]
    pub model: Option<String>,

    /// Override the per-call oracle timeout
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ResolveArgs {
    fn overrides(&self) -> OracleOverrides {
        OracleOverrides {
            provider: self.no_oracle.then_some(hsmap_config::OracleProvider::None),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

pub fn cmd_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let project = load_project(&args.config)?;
    let targets = select_countries(&project, &args.countries)?;

    let settings = Settings::load();
    let resolved = ResolvedOracleConfig::with_overrides(&settings.oracle, &args.overrides());
    log::info!(
        "oracle: provider={} model={} endpoint={} status={}",
        resolved.provider.name(),
        resolved.model,
        resolved.endpoint,
        resolved.status.as_str()
    );
    let base = oracle_from_config(&resolved);

    let runs = if args.cache {
        let cached = CachingOracle::new(base);
        let runs = resolve_countries(&project, &targets, &cached)?;
        log::info!("oracle cache: {} hit(s)", cached.hits());
        runs
    } else {
        resolve_countries(&project, &targets, &base)?
    };

    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&runs)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    let fallbacks: usize = runs.iter().map(|r| r.summary.fallback).sum();
    if args.fail_on_fallback && fallbacks > 0 {
        return Err(CliError {
            code: EXIT_RESOLVE_FALLBACK,
            message: format!("{fallbacks} group(s) fell back to the digit-count rule"),
            hint: Some("check the oracle with `hsmap oracle doctor`".into()),
        });
    }

    Ok(())
}

/// Countries to resolve, in config order.
fn select_countries<'a>(
    project: &'a Project,
    requested: &[String],
) -> Result<Vec<&'a CountryConfig>, CliError> {
    if requested.is_empty() {
        let all: Vec<_> = project
            .config
            .countries
            .iter()
            .filter(|c| c.candidates.is_some())
            .collect();
        if all.is_empty() {
            return Err(CliError {
                code: EXIT_USAGE,
                message: "no country has a candidates table configured".into(),
                hint: Some("add `candidates = \"...\"` to a [[countries]] entry".into()),
            });
        }
        return Ok(all);
    }

    requested
        .iter()
        .map(|name| {
            project.config.country(name).map_err(|e| CliError {
                code: EXIT_USAGE,
                message: e.to_string(),
                hint: None,
            })
        })
        .collect()
}

/// Resolve each target in order. A country whose candidates table cannot be
/// loaded is skipped with a warning; the rest still run.
fn resolve_countries(
    project: &Project,
    targets: &[&CountryConfig],
    oracle: &dyn Oracle,
) -> Result<Vec<ResolutionRun>, CliError> {
    let pipeline = ResolutionPipeline::new(oracle);
    let mut runs = Vec::with_capacity(targets.len());
    let mut skipped = Vec::new();

    for country in targets {
        let records = match load_candidates(&project.config, country, &project.base_dir) {
            Ok(records) => records,
            Err(w) => {
                log::warn!("resolve: skipping {w}");
                eprintln!("warning: skipped {w}");
                skipped.push(w);
                continue;
            }
        };

        let run = pipeline.run(&country.name, records);

        let path = save_resolved(&run, &project.config, country, &project.base_dir).map_err(|e| {
            CliError {
                code: EXIT_RESOLVE_WRITE,
                message: format!("{}: {e}", country.name),
                hint: None,
            }
        })?;

        let s = &run.summary;
        eprintln!(
            "{}: {} product(s) from {} row(s): {} unique, {} oracle, {} fallback; wrote {}",
            country.name,
            s.total_groups,
            run.meta.input_rows,
            s.unique,
            s.oracle_choice,
            s.fallback,
            path.display(),
        );

        runs.push(run);
    }

    if runs.is_empty() {
        let message = match skipped.as_slice() {
            [only] => only.to_string(),
            _ => format!("none of {} candidate table(s) could be loaded", skipped.len()),
        };
        return Err(CliError {
            code: EXIT_RESOLVE_INPUT,
            message,
            hint: Some("check the candidates paths and column names in the config".into()),
        });
    }

    Ok(runs)
}
