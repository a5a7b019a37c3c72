use std::collections::HashMap;

use crate::model::CandidateRecord;

/// One country's resolved table. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    country: String,
    records: Vec<CandidateRecord>,
    /// Product name to the index of its first row.
    by_product: HashMap<String, usize>,
    /// Lowercased product names, parallel to `records`.
    folded: Vec<String>,
}

impl DatasetIndex {
    pub fn new(country: impl Into<String>, records: Vec<CandidateRecord>) -> Self {
        let mut by_product = HashMap::new();
        for (i, r) in records.iter().enumerate() {
            by_product.entry(r.product.clone()).or_insert(i);
        }
        let folded = records.iter().map(|r| r.product.to_lowercase()).collect();

        Self {
            country: country.into(),
            records,
            by_product,
            folded,
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// First record for an exact product name. Duplicates are tolerated;
    /// the earliest row wins.
    pub fn exact(&self, product: &str) -> Option<&CandidateRecord> {
        self.by_product.get(product).map(|&i| &self.records[i])
    }

    /// Records whose product name contains `needle`, in table order.
    /// `needle` must already be lowercased.
    pub fn scan_folded<'a, 'n>(
        &'a self,
        needle: &'n str,
    ) -> impl Iterator<Item = &'a CandidateRecord> + 'n
    where
        'a: 'n,
    {
        self.folded
            .iter()
            .zip(&self.records)
            .filter(move |(name, _)| name.contains(needle))
            .map(|(_, r)| r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(product: &str, code: &str) -> CandidateRecord {
        CandidateRecord {
            product: product.into(),
            domestic_code: "84713000".into(),
            domestic_description: "便携式计算机".into(),
            foreign_code: code.into(),
            foreign_description: String::new(),
            translated_description: String::new(),
            extra: Vec::new(),
        }
    }

    #[test]
    fn exact_takes_first_duplicate() {
        let idx = DatasetIndex::new("US", vec![rec("Laptop", "8471.30.01"), rec("Laptop", "8471.30.99")]);
        assert_eq!(idx.exact("Laptop").unwrap().foreign_code, "8471.30.01");
        assert!(idx.exact("laptop").is_none());
        assert!(idx.exact("Tablet").is_none());
    }

    #[test]
    fn scan_is_case_insensitive_and_returns_all() {
        let idx = DatasetIndex::new(
            "US",
            vec![rec("Gaming Laptop", "1"), rec("Desktop", "2"), rec("LAPTOP bag", "3")],
        );
        let codes: Vec<_> = idx.scan_folded("laptop").map(|r| r.foreign_code.as_str()).collect();
        assert_eq!(codes, vec!["1", "3"]);
    }

    #[test]
    fn scan_borrows_needle_only_for_the_iteration() {
        let idx = DatasetIndex::new("CN", vec![rec("不锈钢螺栓", "1"), rec("螺栓垫圈", "2"), rec("铁钉", "3")]);
        let hits: Vec<&CandidateRecord> = {
            let needle = String::from("螺栓");
            idx.scan_folded(&needle).collect()
        };
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].product, "螺栓垫圈");
    }
}
