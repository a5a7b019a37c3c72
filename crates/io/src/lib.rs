// Tabular snapshots: CSV and Excel mapping tables

pub mod catalog;
pub mod csv;
pub mod schema;
pub mod table;
pub mod xlsx;

pub use catalog::{
    load_candidates, load_query_engine, read_table, resolve_path, save_resolved, write_table,
    LoadWarning,
};
pub use schema::{records_from_table, resolved_table, SchemaMode};
pub use table::Table;
