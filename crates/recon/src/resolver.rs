use crate::model::{CandidateRecord, FallbackReason, ProductGroup, ResolutionResult, SelectionMethod};
use crate::oracle::{extract_last_number, Oracle, OracleOption};

/// Collapses one product's candidate group to a single record.
///
/// Stateless between groups: the outcome depends only on the group and on
/// what the oracle answers.
pub struct AmbiguityResolver<O> {
    oracle: O,
}

impl<O: Oracle> AmbiguityResolver<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn resolve(&self, group: &ProductGroup) -> ResolutionResult {
        let records = group.records();

        if records.len() == 1 {
            return ResolutionResult {
                product: group.product().to_string(),
                record: group.first().clone(),
                method: SelectionMethod::Unique,
                candidates: 1,
                fallback_reason: None,
                oracle_response: None,
            };
        }

        let options: Vec<OracleOption<'_>> = records
            .iter()
            .map(|r| OracleOption {
                code: &r.foreign_code,
                description: &r.foreign_description,
            })
            .collect();

        let (choice, response) = match self.oracle.choose(group.product(), &options) {
            Ok(text) => {
                log::debug!("oracle answer for '{}': {}", group.product(), text.trim());
                let choice = match extract_last_number(&text) {
                    Some(n) if (1..=records.len()).contains(&n) => Ok(n - 1),
                    Some(n) => Err(FallbackReason::OutOfRange(n)),
                    None => Err(FallbackReason::NoNumber),
                };
                (choice, Some(text))
            }
            Err(e) => (Err(FallbackReason::from_oracle_error(&e)), None),
        };

        match choice {
            Ok(idx) => ResolutionResult {
                product: group.product().to_string(),
                record: records[idx].clone(),
                method: SelectionMethod::OracleChoice,
                candidates: records.len(),
                fallback_reason: None,
                oracle_response: response,
            },
            Err(reason) => {
                log::warn!("'{}': {reason}; falling back to code digit count", group.product());
                ResolutionResult {
                    product: group.product().to_string(),
                    record: fallback_by_specificity(records).clone(),
                    method: SelectionMethod::FallbackBySpecificity,
                    candidates: records.len(),
                    fallback_reason: Some(reason),
                    oracle_response: response,
                }
            }
        }
    }
}

/// Deterministic fallback: stable ascending sort by digit count of the
/// foreign code, first element wins. Ties keep source order.
///
/// The fewest digits wins even though the prompt asks the oracle to prefer
/// longer codes.
pub fn fallback_by_specificity(records: &[CandidateRecord]) -> &CandidateRecord {
    let mut order: Vec<(usize, &CandidateRecord)> =
        records.iter().map(|r| (r.foreign_code_digits(), r)).collect();
    order.sort_by_key(|(digits, _)| *digits);
    order[0].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;
    use proptest::prelude::*;
    use std::cell::Cell;

    fn rec(product: &str, code: &str, desc: &str) -> CandidateRecord {
        CandidateRecord {
            product: product.into(),
            domestic_code: "7318150000".into(),
            domestic_description: "螺钉及螺栓".into(),
            foreign_code: code.into(),
            foreign_description: desc.into(),
            translated_description: String::new(),
            extra: Vec::new(),
        }
    }

    fn group(records: Vec<CandidateRecord>) -> ProductGroup {
        let mut iter = records.into_iter();
        let mut g = ProductGroup::new(iter.next().unwrap());
        for r in iter {
            g.push(r);
        }
        g
    }

    struct Fixed {
        answer: Result<String, OracleError>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn ok(s: &str) -> Self {
            Self { answer: Ok(s.into()), calls: Cell::new(0) }
        }
        fn err(e: OracleError) -> Self {
            Self { answer: Err(e), calls: Cell::new(0) }
        }
    }

    impl Oracle for Fixed {
        fn choose(&self, _p: &str, _o: &[OracleOption<'_>]) -> Result<String, OracleError> {
            self.calls.set(self.calls.get() + 1);
            self.answer.clone()
        }
    }

    fn three() -> ProductGroup {
        group(vec![
            rec("螺栓", "7318.15.2000", "Bolts, threaded"),
            rec("螺栓", "7318.15", "Screws and bolts"),
            rec("螺栓", "731815", "Bolts"),
        ])
    }

    #[test]
    fn single_candidate_is_unique_without_call() {
        let oracle = Fixed::ok("2");
        let resolver = AmbiguityResolver::new(&oracle);
        let r0 = rec("垫圈", "7318.21", "Washers");
        let result = resolver.resolve(&group(vec![r0.clone()]));
        assert_eq!(result.method, SelectionMethod::Unique);
        assert_eq!(result.record, r0);
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn oracle_choice_by_last_number() {
        let oracle = Fixed::ok("<think>option 3 looks close but</think> 1");
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.method, SelectionMethod::OracleChoice);
        assert_eq!(result.record.foreign_code, "7318.15.2000");
        assert_eq!(oracle.calls.get(), 1);
        assert!(result.oracle_response.is_some());
    }

    #[test]
    fn full_width_answer_is_an_oracle_choice() {
        let oracle = Fixed::ok("我选择第１个");
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.method, SelectionMethod::OracleChoice);
        assert_eq!(result.record.foreign_code, "7318.15.2000");
        assert!(result.fallback_reason.is_none());
    }

    #[test]
    fn out_of_range_falls_back() {
        let oracle = Fixed::ok("4");
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.method, SelectionMethod::FallbackBySpecificity);
        assert_eq!(result.fallback_reason, Some(FallbackReason::OutOfRange(4)));
        // 7318.15 and 731815 both have 6 digits; the earlier row wins.
        assert_eq!(result.record.foreign_code, "7318.15");
    }

    #[test]
    fn zero_falls_back() {
        let oracle = Fixed::ok("0");
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.fallback_reason, Some(FallbackReason::OutOfRange(0)));
    }

    #[test]
    fn no_number_falls_back() {
        let oracle = Fixed::ok("无法判断");
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.method, SelectionMethod::FallbackBySpecificity);
        assert_eq!(result.fallback_reason, Some(FallbackReason::NoNumber));
    }

    #[test]
    fn oracle_failure_falls_back() {
        let oracle = Fixed::err(OracleError::Timeout);
        let result = AmbiguityResolver::new(&oracle).resolve(&three());
        assert_eq!(result.method, SelectionMethod::FallbackBySpecificity);
        assert!(matches!(result.fallback_reason, Some(FallbackReason::OracleFailed(_))));
        assert!(result.oracle_response.is_none());
    }

    #[test]
    fn fallback_prefers_fewest_digits() {
        let records = vec![
            rec("p", "8501.10.40.00", "a"),
            rec("p", "8501.10", "b"),
            rec("p", "8501104", "c"),
        ];
        assert_eq!(fallback_by_specificity(&records).foreign_description, "b");
    }

    proptest! {
        #[test]
        fn fallback_is_first_minimum(digit_counts in prop::collection::vec(1usize..12, 1..8)) {
            let records: Vec<CandidateRecord> = digit_counts
                .iter()
                .enumerate()
                .map(|(i, n)| rec("p", &"9".repeat(*n), &i.to_string()))
                .collect();
            let min = *digit_counts.iter().min().unwrap();
            let expected = digit_counts.iter().position(|n| *n == min).unwrap();

            let chosen = fallback_by_specificity(&records);
            prop_assert_eq!(&chosen.foreign_description, &expected.to_string());
            // Stable under repetition.
            prop_assert_eq!(fallback_by_specificity(&records), chosen);
        }

        #[test]
        fn multi_candidate_always_selects_a_member(n in 2usize..6, answer in ".{0,12}") {
            let records: Vec<CandidateRecord> =
                (0..n).map(|i| rec("p", &format!("{i:0>4}"), "d")).collect();
            let g = group(records.clone());
            let oracle = Fixed::ok(&answer);
            let result = AmbiguityResolver::new(&oracle).resolve(&g);
            prop_assert!(records.contains(&result.record));
            prop_assert!(matches!(
                result.method,
                SelectionMethod::OracleChoice | SelectionMethod::FallbackBySpecificity
            ));
        }
    }
}
