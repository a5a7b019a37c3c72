use serde::Serialize;

use crate::digits::is_decimal_digit;
use crate::oracle::OracleError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One candidate mapping row for a single country.
///
/// Codes are opaque strings: leading zeros and punctuation are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecord {
    pub product: String,
    pub domestic_code: String,
    pub domestic_description: String,
    pub foreign_code: String,
    pub foreign_description: String,
    pub translated_description: String,
    /// Source columns outside the known schema, as (header, value) pairs in
    /// table order. Written back unchanged next to the typed columns.
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl CandidateRecord {
    /// Number of decimal digits in the foreign code (the specificity proxy).
    pub fn foreign_code_digits(&self) -> usize {
        self.foreign_code.chars().filter(|&c| is_decimal_digit(c)).count()
    }
}

/// All candidate rows sharing one product name, in first-seen order.
///
/// Non-empty by construction: a group is always created from its first record.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    product: String,
    records: Vec<CandidateRecord>,
}

impl ProductGroup {
    pub fn new(first: CandidateRecord) -> Self {
        Self {
            product: first.product.clone(),
            records: vec![first],
        }
    }

    /// Append a record. The record's product must equal the group's.
    pub fn push(&mut self, record: CandidateRecord) {
        debug_assert_eq!(record.product, self.product);
        self.records.push(record);
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub(crate) fn first(&self) -> &CandidateRecord {
        &self.records[0]
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Unique,
    OracleChoice,
    FallbackBySpecificity,
}

impl SelectionMethod {
    /// Literal written to the selection-method column of a resolved table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique option",
            Self::OracleChoice => "model selection",
            Self::FallbackBySpecificity => "fallback by code-digit-count",
        }
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a multi-candidate group ended up on the fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The oracle call itself failed.
    OracleFailed(String),
    /// The response contained no digit run.
    NoNumber,
    /// The last digit run was not a valid 1-based option index.
    OutOfRange(usize),
}

impl FallbackReason {
    pub fn from_oracle_error(err: &OracleError) -> Self {
        Self::OracleFailed(err.to_string())
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OracleFailed(msg) => write!(f, "oracle failed: {msg}"),
            Self::NoNumber => write!(f, "no number in oracle response"),
            Self::OutOfRange(n) => write!(f, "oracle answered {n}, outside option range"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub product: String,
    pub record: CandidateRecord,
    pub method: SelectionMethod,
    /// Number of candidates in the group.
    pub candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Raw oracle answer, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_response: Option<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub total_groups: usize,
    pub unique: usize,
    pub oracle_choice: usize,
    pub fallback: usize,
    /// Products that hit the fallback path, in group order.
    pub fallback_products: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionMeta {
    pub country: String,
    pub engine_version: String,
    pub run_at: String,
    pub input_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionRun {
    pub meta: ResolutionMeta,
    pub summary: ResolutionSummary,
    pub results: Vec<ResolutionResult>,
}

impl ResolutionRun {
    /// The resolved table: one record per product, in group order.
    pub fn resolved_records(&self) -> impl Iterator<Item = (&CandidateRecord, SelectionMethod)> {
        self.results.iter().map(|r| (&r.record, r.method))
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// One country's answer for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRow {
    pub country: String,
    pub product: String,
    pub foreign_code: String,
    pub foreign_description: String,
    pub translated_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DomesticCode {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Sorted by country name; ties keep scan order.
    pub rows: Vec<CountryRow>,
    /// Deduplicated, first-seen order.
    pub domestic: Vec<DomesticCode>,
}

impl QueryResult {
    pub fn status_line(&self) -> String {
        format!(
            "found {} domestic code(s) and {} country row(s)",
            self.domestic.len(),
            self.rows.len()
        )
    }
}

/// Explicit query states: a miss is never an ambiguous empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Found(QueryResult),
    NotFound { query: String },
    EmptyQuery,
}

impl QueryOutcome {
    pub fn found(&self) -> Option<&QueryResult> {
        match self {
            Self::Found(r) => Some(r),
            _ => None,
        }
    }
}
