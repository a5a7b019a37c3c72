//! Loading and saving per-country tables named by a `ReconConfig`.
//!
//! A country whose file is absent or unreadable, or whose table misses a
//! required column, is excluded with a warning. Other countries still load.

use std::path::{Path, PathBuf};

use hsmap_recon::{
    CandidateRecord, ColumnNames, CountryConfig, DatasetIndex, QueryEngine, ReconConfig,
    ResolutionRun,
};

use crate::schema::{records_from_table, resolved_table, SchemaMode};
use crate::table::Table;

/// A country that was left out of the active set, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub country: String,
    pub message: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.country, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Csv,
    Excel,
}

fn format_for(path: &Path) -> Result<TableFormat, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(TableFormat::Csv),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(TableFormat::Excel),
        other => Err(format!("unsupported table format '.{other}' ({})", path.display())),
    }
}

/// Read a table, picking the reader by file extension.
pub fn read_table(path: &Path) -> Result<Table, String> {
    match format_for(path)? {
        TableFormat::Csv => crate::csv::import(path),
        TableFormat::Excel => crate::xlsx::import(path),
    }
}

/// Write a table, picking the writer by file extension (`.csv` or `.xlsx`).
pub fn write_table(table: &Table, path: &Path) -> Result<(), String> {
    match format_for(path)? {
        TableFormat::Csv => crate::csv::export(table, path),
        TableFormat::Excel => {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if !ext.eq_ignore_ascii_case("xlsx") {
                return Err(format!("can only write .xlsx workbooks ({})", path.display()));
            }
            crate::xlsx::export(table, path)
        }
    }
}

/// Resolve a config-relative path.
pub fn resolve_path(base_dir: &Path, file: &str) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Load one country's table as typed records.
pub fn load_country_records(
    path: &Path,
    country: &CountryConfig,
    columns: &ColumnNames,
    mode: SchemaMode,
) -> Result<Vec<CandidateRecord>, LoadWarning> {
    let warn = |message: String| LoadWarning {
        country: country.name.clone(),
        message,
    };

    if !path.exists() {
        return Err(warn(format!("file not found: {}", path.display())));
    }

    let table = read_table(path).map_err(|e| warn(format!("cannot read {}: {e}", path.display())))?;
    records_from_table(&country.name, &table, columns, &country.foreign_code_column, mode)
        .map_err(|e| warn(e.to_string()))
}

/// Build the active index set from every country's resolved table.
///
/// Countries keep config order. Failures become warnings, never errors.
pub fn load_query_engine(config: &ReconConfig, base_dir: &Path) -> (QueryEngine, Vec<LoadWarning>) {
    let mut indexes = Vec::new();
    let mut warnings = Vec::new();

    for country in &config.countries {
        let path = resolve_path(base_dir, &country.resolved);
        match load_country_records(&path, country, &config.columns, SchemaMode::Resolved) {
            Ok(records) => {
                log::info!("loaded {}: {} record(s)", country.name, records.len());
                indexes.push(DatasetIndex::new(country.name.clone(), records));
            }
            Err(w) => {
                log::warn!("skipping {w}");
                warnings.push(w);
            }
        }
    }

    (QueryEngine::new(indexes), warnings)
}

/// Load a country's raw candidate table for resolution.
pub fn load_candidates(
    config: &ReconConfig,
    country: &CountryConfig,
    base_dir: &Path,
) -> Result<Vec<CandidateRecord>, LoadWarning> {
    let file = country.candidates.as_deref().ok_or_else(|| LoadWarning {
        country: country.name.clone(),
        message: "no candidates table configured".into(),
    })?;
    let path = resolve_path(base_dir, file);
    load_country_records(&path, country, &config.columns, SchemaMode::Candidate)
}

/// Persist a run as the country's resolved table.
pub fn save_resolved(
    run: &ResolutionRun,
    config: &ReconConfig,
    country: &CountryConfig,
    base_dir: &Path,
) -> Result<PathBuf, String> {
    let path = resolve_path(base_dir, &country.resolved);
    let table = resolved_table(run, &config.columns, &country.foreign_code_column);
    write_table(&table, &path)?;
    Ok(path)
}
