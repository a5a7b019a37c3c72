use std::collections::HashMap;

use crate::evidence::compute_summary;
use crate::model::{CandidateRecord, ProductGroup, ResolutionMeta, ResolutionRun};
use crate::oracle::Oracle;
use crate::resolver::AmbiguityResolver;

/// Group rows by product name. Group order is first-seen order, and rows
/// keep their source order within a group.
pub fn group_by_product(records: Vec<CandidateRecord>) -> Vec<ProductGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProductGroup> = Vec::new();

    for record in records {
        match positions.get(&record.product) {
            Some(&idx) => groups[idx].push(record),
            None => {
                positions.insert(record.product.clone(), groups.len());
                groups.push(ProductGroup::new(record));
            }
        }
    }

    groups
}

/// Offline batch: one country's candidate table in, its resolved table out.
pub struct ResolutionPipeline<O> {
    resolver: AmbiguityResolver<O>,
}

impl<O: Oracle> ResolutionPipeline<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            resolver: AmbiguityResolver::new(oracle),
        }
    }

    /// Resolve every group sequentially. Never drops a product: each group
    /// yields exactly one result.
    pub fn run(&self, country: &str, records: Vec<CandidateRecord>) -> ResolutionRun {
        let input_rows = records.len();
        let groups = group_by_product(records);
        log::info!(
            "{country}: resolving {} product(s) from {input_rows} row(s)",
            groups.len()
        );

        let results: Vec<_> = groups.iter().map(|g| self.resolver.resolve(g)).collect();
        let summary = compute_summary(&results);

        log::info!(
            "{country}: {} unique, {} model selection, {} fallback",
            summary.unique,
            summary.oracle_choice,
            summary.fallback
        );

        ResolutionRun {
            meta: ResolutionMeta {
                country: country.to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                input_rows,
            },
            summary,
            results,
        }
    }
}
