//! The matching engine: an ordered rule registry tried first-to-last.

use crate::domain::Leg;
use crate::rules::Rule;

/// Sentinel name returned when no rule matches. A normal outcome, not an
/// error.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Result of one classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Name of the first matching rule, or [`UNCLASSIFIED`].
    pub name: String,
    /// `order[i]` is the 1-based slot rank input leg `i` occupies in the
    /// matched configuration. Empty (unspecified) when unclassified.
    pub order: Vec<usize>,
}

impl Classification {
    pub fn unclassified() -> Self {
        Self { name: UNCLASSIFIED.to_string(), order: Vec::new() }
    }

    pub fn is_unclassified(&self) -> bool {
        self.name == UNCLASSIFIED
    }
}

/// An immutable, ordered registry of combination rules.
///
/// Registration order is match order. All mutable state of a match attempt
/// (binding maps, permutation buffer) lives on the `classify` call stack, so
/// one `Classifier` may serve any number of threads concurrently.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classifies an ordered set of observed legs.
    ///
    /// Rules are tried in registration order and the first match wins. The
    /// winning slot order is inverted into per-input ranks: input leg `i`
    /// receives the 1-based position it occupies in the matched
    /// configuration. Which of several structurally equivalent orderings is
    /// reported is deterministic (first validating permutation in
    /// lexicographic order).
    pub fn classify(&self, legs: &[Leg]) -> Classification {
        for rule in &self.rules {
            if let Some(slots) = rule.matches(legs) {
                let mut order = vec![0; legs.len()];
                for (rank, &index) in slots.iter().enumerate() {
                    order[index] = rank + 1;
                }
                return Classification { name: rule.name.clone(), order };
            }
        }
        Classification::unclassified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Date, InstrumentType, Leg};
    use crate::rules::{ExpirySpec, LegConstraint, RatioSpec, RuleKind, ValueSpec};

    fn slot(instrument: InstrumentType, positive: bool) -> LegConstraint {
        LegConstraint {
            instrument,
            ratio: RatioSpec::Sign(positive),
            strike: ValueSpec::Group('A'),
            expiration: ExpirySpec::Value(ValueSpec::Group('B')),
        }
    }

    fn synthetic() -> Rule {
        Rule::new(
            "Synthetic",
            RuleKind::Fixed {
                legs: vec![slot(InstrumentType::Call, true), slot(InstrumentType::Put, false)],
            },
        )
    }

    fn legs() -> [Leg; 2] {
        let exp = Date::new(2024, 6, 1);
        [
            Leg::new(InstrumentType::Call, 1.0, 100.0, exp),
            Leg::new(InstrumentType::Put, -1.0, 100.0, exp),
        ]
    }

    #[test]
    fn reports_one_based_ranks_per_input_leg() {
        let classifier = Classifier::new(vec![synthetic()]);

        let result = classifier.classify(&legs());
        assert_eq!(result.name, "Synthetic");
        assert_eq!(result.order, vec![1, 2]);

        let mut swapped = legs();
        swapped.swap(0, 1);
        let result = classifier.classify(&swapped);
        assert_eq!(result.name, "Synthetic");
        assert_eq!(result.order, vec![2, 1]);
    }

    #[test]
    fn first_registered_match_wins() {
        let mut duplicate = synthetic();
        duplicate.name = "SyntheticCopy".to_string();
        let classifier = Classifier::new(vec![synthetic(), duplicate]);
        assert_eq!(classifier.classify(&legs()).name, "Synthetic");

        let reversed = {
            let mut duplicate = synthetic();
            duplicate.name = "SyntheticCopy".to_string();
            Classifier::new(vec![duplicate, synthetic()])
        };
        assert_eq!(reversed.classify(&legs()).name, "SyntheticCopy");
    }

    #[test]
    fn no_match_is_the_unclassified_sentinel() {
        let classifier = Classifier::new(vec![synthetic()]);
        let lone_future = [Leg::new(InstrumentType::Future, 1.0, 0.0, Date::new(2024, 6, 1))];
        let result = classifier.classify(&lone_future);
        assert!(result.is_unclassified());
        assert_eq!(result.name, UNCLASSIFIED);
        assert!(result.order.is_empty());
    }

    #[test]
    fn empty_registry_classifies_nothing() {
        let classifier = Classifier::default();
        assert!(classifier.is_empty());
        assert!(classifier.classify(&legs()).is_unclassified());
    }

    #[test]
    fn invalid_sentinel_leg_never_matches() {
        let classifier = Classifier::new(vec![synthetic()]);
        let mut with_sentinel = legs().to_vec();
        with_sentinel[1] = Leg::invalid();
        assert!(classifier.classify(&with_sentinel).is_unclassified());
    }
}
