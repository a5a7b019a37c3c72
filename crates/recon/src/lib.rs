//! `hsmap-recon`: HS code reconciliation engine.
//!
//! Pure engine crate: collapses one-to-many candidate tables into one-to-one
//! resolved tables and answers aggregated lookups over them.
//! No CLI, file or network dependencies.

pub mod config;
mod digits;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod model;
pub mod oracle;
pub mod query;
pub mod resolver;

pub use config::{ColumnNames, CountryConfig, ReconConfig};
pub use engine::{group_by_product, ResolutionPipeline};
pub use error::ReconError;
pub use evidence::compute_summary;
pub use index::DatasetIndex;
pub use model::{
    CandidateRecord, CountryRow, DomesticCode, FallbackReason, ProductGroup, QueryOutcome,
    QueryResult, ResolutionMeta, ResolutionResult, ResolutionRun, ResolutionSummary,
    SelectionMethod,
};
pub use oracle::{
    extract_last_number, render_prompt, CachingOracle, DisabledOracle, Oracle, OracleError,
    OracleOption,
};
pub use query::QueryEngine;
pub use resolver::AmbiguityResolver;
