use crate::model::{ResolutionResult, ResolutionSummary, SelectionMethod};

/// Compute summary statistics from resolution results.
pub fn compute_summary(results: &[ResolutionResult]) -> ResolutionSummary {
    let mut summary = ResolutionSummary {
        total_groups: results.len(),
        ..Default::default()
    };

    for r in results {
        match r.method {
            SelectionMethod::Unique => summary.unique += 1,
            SelectionMethod::OracleChoice => summary.oracle_choice += 1,
            SelectionMethod::FallbackBySpecificity => {
                summary.fallback += 1;
                summary.fallback_products.push(r.product.clone());
            }
        }
    }

    summary
}
