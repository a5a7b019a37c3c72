use std::collections::HashSet;

use crate::index::DatasetIndex;
use crate::model::{CandidateRecord, CountryRow, DomesticCode, QueryOutcome, QueryResult};

/// Aggregated lookup over every loaded country. Read-only; no oracle calls.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    /// Scan order = load order.
    indexes: Vec<DatasetIndex>,
}

impl QueryEngine {
    pub fn new(indexes: Vec<DatasetIndex>) -> Self {
        Self { indexes }
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(|i| i.country())
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Exact product-name lookup: at most one row per country.
    pub fn exact_query(&self, product: &str) -> QueryOutcome {
        let product = product.trim();
        if product.is_empty() {
            return QueryOutcome::EmptyQuery;
        }

        let hits = self
            .indexes
            .iter()
            .filter_map(|idx| idx.exact(product).map(|r| (idx.country(), r)));

        finish(product, hits)
    }

    /// Case-insensitive substring lookup: every matching row of every country.
    pub fn fuzzy_query(&self, keyword: &str) -> QueryOutcome {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return QueryOutcome::EmptyQuery;
        }

        let needle = keyword.to_lowercase();
        let hits = self
            .indexes
            .iter()
            .flat_map(|idx| idx.scan_folded(&needle).map(move |r| (idx.country(), r)));

        finish(keyword, hits)
    }
}

fn finish<'a>(
    query: &str,
    hits: impl Iterator<Item = (&'a str, &'a CandidateRecord)>,
) -> QueryOutcome {
    let mut result = QueryResult::default();
    let mut seen: HashSet<DomesticCode> = HashSet::new();

    for (country, record) in hits {
        let domestic = DomesticCode {
            code: record.domestic_code.clone(),
            description: record.domestic_description.clone(),
        };
        if seen.insert(domestic.clone()) {
            result.domestic.push(domestic);
        }
        result.rows.push(CountryRow {
            country: country.to_string(),
            product: record.product.clone(),
            foreign_code: record.foreign_code.clone(),
            foreign_description: record.foreign_description.clone(),
            translated_description: record.translated_description.clone(),
        });
    }

    if result.rows.is_empty() {
        return QueryOutcome::NotFound { query: query.to_string() };
    }

    // Stable: rows of one country keep scan order.
    result.rows.sort_by(|a, b| a.country.cmp(&b.country));
    QueryOutcome::Found(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(product: &str, dom: &str, dom_desc: &str, code: &str) -> CandidateRecord {
        CandidateRecord {
            product: product.into(),
            domestic_code: dom.into(),
            domestic_description: dom_desc.into(),
            foreign_code: code.into(),
            foreign_description: format!("{code} desc"),
            translated_description: format!("{code} 译"),
            extra: Vec::new(),
        }
    }

    fn engine() -> QueryEngine {
        QueryEngine::new(vec![
            DatasetIndex::new(
                "C",
                vec![rec("不锈钢螺栓", "7318150000", "螺栓", "C-1")],
            ),
            DatasetIndex::new(
                "A",
                vec![
                    rec("不锈钢螺栓", "7318150000", "螺栓", "A-1"),
                    rec("镀锌螺栓", "7318150001", "镀锌螺栓", "A-2"),
                ],
            ),
            DatasetIndex::new("B", vec![rec("镀锌螺栓", "7318150001", "镀锌螺栓", "B-1")]),
        ])
    }

    #[test]
    fn exact_sorts_by_country_and_dedups_domestic() {
        let outcome = engine().exact_query("不锈钢螺栓");
        let result = outcome.found().unwrap();
        let countries: Vec<_> = result.rows.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(countries, vec!["A", "C"]);
        assert_eq!(
            result.domestic,
            vec![DomesticCode { code: "7318150000".into(), description: "螺栓".into() }]
        );
    }

    #[test]
    fn exact_miss_is_not_found() {
        assert_eq!(
            engine().exact_query("螺母"),
            QueryOutcome::NotFound { query: "螺母".into() }
        );
    }

    #[test]
    fn blank_queries_are_empty() {
        assert_eq!(engine().exact_query("  "), QueryOutcome::EmptyQuery);
        assert_eq!(engine().fuzzy_query("\t"), QueryOutcome::EmptyQuery);
        assert_eq!(engine().fuzzy_query(""), QueryOutcome::EmptyQuery);
    }

    #[test]
    fn fuzzy_returns_every_matching_row_sorted() {
        let outcome = engine().fuzzy_query("螺栓");
        let result = outcome.found().unwrap();
        let pairs: Vec<_> = result
            .rows
            .iter()
            .map(|r| (r.country.as_str(), r.foreign_code.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "A-1"), ("A", "A-2"), ("B", "B-1"), ("C", "C-1")]);
        // Domestic pairs in first-seen scan order (C scanned first).
        let codes: Vec<_> = result.domestic.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["7318150000", "7318150001"]);
    }

    #[test]
    fn fuzzy_two_countries_two_products() {
        let engine = QueryEngine::new(vec![
            DatasetIndex::new("B", vec![rec("镀锌螺栓", "1", "x", "b")]),
            DatasetIndex::new("A", vec![rec("不锈钢螺栓", "2", "y", "a")]),
        ]);
        let result = engine.fuzzy_query("螺栓");
        let rows = &result.found().unwrap().rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "A");
        assert_eq!(rows[0].product, "不锈钢螺栓");
        assert_eq!(rows[1].country, "B");
    }

    #[test]
    fn fuzzy_is_case_insensitive_literal() {
        let engine = QueryEngine::new(vec![DatasetIndex::new(
            "US",
            vec![rec("USB Cable (1m)", "8544", "电缆", "8544.42")],
        )]);
        assert!(engine.fuzzy_query("usb cable").found().is_some());
        assert!(engine.fuzzy_query("(1m)").found().is_some());
        assert!(matches!(engine.fuzzy_query("hdmi"), QueryOutcome::NotFound { .. }));
    }

    #[test]
    fn identical_domestic_pairs_from_two_countries_appear_once() {
        let engine = QueryEngine::new(vec![
            DatasetIndex::new("JP", vec![rec("茶叶", "0902", "绿茶", "0902.10")]),
            DatasetIndex::new("VN", vec![rec("茶叶", "0902", "绿茶", "0902.10.10")]),
        ]);
        let result = engine.exact_query("茶叶");
        assert_eq!(result.found().unwrap().domestic.len(), 1);
        assert_eq!(result.found().unwrap().rows.len(), 2);
    }
}
