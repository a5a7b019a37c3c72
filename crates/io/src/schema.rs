//! Typed schema for mapping tables.
//!
//! Headers are checked once at load time; after that every row is a
//! `CandidateRecord` and nothing looks columns up by name.

use hsmap_recon::{CandidateRecord, ColumnNames, ReconError, ResolutionRun};

use crate::table::Table;

/// Which columns a table must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Raw one-to-many table fed to resolution. The two description columns
    /// added by upstream enrichment may be absent and read as empty.
    Candidate,
    /// Resolved table served to queries. All six columns are required.
    Resolved,
}

struct ColumnIndex {
    product: usize,
    domestic_code: usize,
    domestic_description: Option<usize>,
    foreign_code: usize,
    foreign_description: usize,
    translated_description: Option<usize>,
    /// Columns outside the schema, in table order.
    extra: Vec<usize>,
}

fn index_columns(
    country: &str,
    table: &Table,
    columns: &ColumnNames,
    foreign_code_column: &str,
    mode: SchemaMode,
) -> Result<ColumnIndex, ReconError> {
    let mut missing = Vec::new();
    let mut required = |name: &str| match table.column(name) {
        Some(i) => i,
        None => {
            missing.push(name.to_string());
            usize::MAX
        }
    };

    let product = required(&columns.product);
    let domestic_code = required(&columns.domestic_code);
    let foreign_code = required(foreign_code_column);
    let foreign_description = required(&columns.foreign_description);
    let (domestic_description, translated_description) = match mode {
        SchemaMode::Resolved => (
            Some(required(&columns.domestic_description)),
            Some(required(&columns.translated_description)),
        ),
        SchemaMode::Candidate => (
            table.column(&columns.domestic_description),
            table.column(&columns.translated_description),
        ),
    };

    if !missing.is_empty() {
        return Err(ReconError::MissingColumns {
            country: country.to_string(),
            columns: missing,
        });
    }

    let known = [
        columns.product.as_str(),
        columns.domestic_code.as_str(),
        columns.domestic_description.as_str(),
        foreign_code_column,
        columns.foreign_description.as_str(),
        columns.translated_description.as_str(),
        columns.selection_method.as_str(),
    ];
    let extra = (0..table.headers.len())
        .filter(|&i| !known.contains(&table.headers[i].as_str()))
        .collect();

    Ok(ColumnIndex {
        product,
        domestic_code,
        domestic_description,
        foreign_code,
        foreign_description,
        translated_description,
        extra,
    })
}

/// Validate headers and convert rows into records, in table order.
/// Rows with a blank product name are skipped.
pub fn records_from_table(
    country: &str,
    table: &Table,
    columns: &ColumnNames,
    foreign_code_column: &str,
    mode: SchemaMode,
) -> Result<Vec<CandidateRecord>, ReconError> {
    let idx = index_columns(country, table, columns, foreign_code_column, mode)?;
    let optional = |row: usize, col: Option<usize>| {
        col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default()
    };

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;

    for row in 0..table.rows.len() {
        let product = table.cell(row, idx.product).trim();
        if product.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(CandidateRecord {
            product: product.to_string(),
            domestic_code: table.cell(row, idx.domestic_code).trim().to_string(),
            domestic_description: optional(row, idx.domestic_description),
            foreign_code: table.cell(row, idx.foreign_code).trim().to_string(),
            foreign_description: table.cell(row, idx.foreign_description).trim().to_string(),
            translated_description: optional(row, idx.translated_description),
            extra: idx
                .extra
                .iter()
                .map(|&c| (table.headers[c].clone(), table.cell(row, c).to_string()))
                .collect(),
        });
    }

    if skipped > 0 {
        log::warn!("{country}: skipped {skipped} row(s) with a blank product name");
    }

    Ok(records)
}

/// Render a resolution run as a resolved table: the six record columns, any
/// extra source columns in first-seen order, then the selection-method column.
pub fn resolved_table(run: &ResolutionRun, columns: &ColumnNames, foreign_code_column: &str) -> Table {
    let mut extra_headers: Vec<&str> = Vec::new();
    for (r, _) in run.resolved_records() {
        for (header, _) in &r.extra {
            if !extra_headers.contains(&header.as_str()) {
                extra_headers.push(header);
            }
        }
    }

    let mut headers = vec![
        columns.product.clone(),
        columns.domestic_code.clone(),
        columns.domestic_description.clone(),
        foreign_code_column.to_string(),
        columns.foreign_description.clone(),
        columns.translated_description.clone(),
    ];
    headers.extend(extra_headers.iter().map(|h| h.to_string()));
    headers.push(columns.selection_method.clone());

    let rows = run
        .resolved_records()
        .map(|(r, method)| {
            let mut row = vec![
                r.product.clone(),
                r.domestic_code.clone(),
                r.domestic_description.clone(),
                r.foreign_code.clone(),
                r.foreign_description.clone(),
                r.translated_description.clone(),
            ];
            row.extend(extra_headers.iter().map(|&h| {
                r.extra
                    .iter()
                    .find(|(name, _)| name == h)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            }));
            row.push(method.as_str().to_string());
            row
        })
        .collect();

    Table::new(headers, rows)
}
