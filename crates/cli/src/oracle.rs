//! `hsmap oracle`: inspect the disambiguation backend configuration.

use clap::Subcommand;
use hsmap_config::{OracleDiagnostics, OracleStatus, ResolvedOracleConfig};
use hsmap_oracle::OracleClient;

use crate::exit_codes::{EXIT_ORACLE_DISABLED, EXIT_ORACLE_MISSING_KEY, EXIT_ORACLE_UNREACHABLE};
use crate::CliError;

#[derive(Subcommand)]
pub enum OracleCommands {
    /// Show the resolved oracle configuration
    #[command(after_help = "\
Examples:
  hsmap oracle doctor
  hsmap oracle doctor --json
  hsmap oracle doctor --test")]
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,

        /// Send one short prompt to the backend (requires network)
        #[arg(long)]
        test: bool,
    },
}

pub fn cmd_oracle(cmd: OracleCommands) -> Result<(), CliError> {
    match cmd {
        OracleCommands::Doctor { json, test } => cmd_oracle_doctor(json, test),
    }
}

fn cmd_oracle_doctor(json: bool, test: bool) -> Result<(), CliError> {
    let config = ResolvedOracleConfig::load();
    let diag = OracleDiagnostics::from_resolved(&config);

    let test_result = if test && config.status.is_ready() {
        Some(ping_backend(&config))
    } else {
        None
    };

    if json {
        let mut value = serde_json::to_value(&diag)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        value["schema_version"] = serde_json::json!(1);
        value["test"] = match &test_result {
            None => serde_json::json!("skipped"),
            Some(Ok(answer)) => serde_json::json!({ "ok": true, "answer": answer }),
            Some(Err(e)) => serde_json::json!({ "ok": false, "error": e.to_string() }),
        };
        let json_str = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print!("{diag}");
        match &test_result {
            None if test => println!("Test:              skipped (oracle not ready)"),
            None => println!("Test:              skipped (use --test)"),
            Some(Ok(answer)) => println!("Test:              ok ({answer})"),
            Some(Err(e)) => println!("Test:              failed ({e})"),
        }

        match config.status {
            OracleStatus::Disabled => {
                println!();
                println!("The oracle is disabled; ambiguous groups use the digit-count fallback.");
                println!("  Set oracle.provider in {}", diag.settings_path);
            }
            OracleStatus::MissingKey => {
                println!();
                println!(
                    "Fix: set HSMAP_{}_KEY or store the key in the keychain",
                    diag.provider.to_uppercase()
                );
            }
            OracleStatus::Ready => {}
        }
    }

    match config.status {
        OracleStatus::Disabled => Err(CliError {
            code: EXIT_ORACLE_DISABLED,
            message: "oracle is disabled".into(),
            hint: None,
        }),
        OracleStatus::MissingKey => Err(CliError {
            code: EXIT_ORACLE_MISSING_KEY,
            message: format!(
                "oracle misconfigured: {}",
                config.blocking_reason.as_deref().unwrap_or("missing API key")
            ),
            hint: None,
        }),
        OracleStatus::Ready => match test_result {
            Some(Err(e)) => Err(CliError {
                code: EXIT_ORACLE_UNREACHABLE,
                message: format!("oracle test failed: {e}"),
                hint: Some(format!("is the backend at {} running?", config.endpoint)),
            }),
            _ => Ok(()),
        },
    }
}

fn ping_backend(config: &ResolvedOracleConfig) -> Result<String, hsmap_recon::OracleError> {
    let client = OracleClient::new(config)?;
    client.complete("只回答数字1。")
}
