//! Rule definitions and the match search.
//!
//! The three cardinalities are a closed set: `Fixed` and `Multiple` share
//! the permutation/block machinery and differ only in their precheck;
//! `More` applies a single constraint to an unbounded homogeneous set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Date, InstrumentType, Leg};
use crate::rules::binding::BindingState;
use crate::rules::constraint::{ExpirySpec, LegConstraint};

/// Cardinality-specific shape of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Exactly one observed leg per constraint slot.
    Fixed { legs: Vec<LegConstraint> },
    /// A repeating block: the leg count must be a nonzero multiple of the
    /// constraint count, and every block must validate independently under
    /// one permutation.
    Multiple { legs: Vec<LegConstraint> },
    /// One constraint applied to every leg of a set of at least `min_count`.
    More { leg: LegConstraint, min_count: usize },
}

/// A named combination rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(name: impl Into<String>, kind: RuleKind) -> Self {
        Self { name: name.into(), kind }
    }

    /// Attempts to match the observed legs against this rule.
    ///
    /// On success returns the winning slot order: element `i` is the index
    /// of the input leg occupying slot `i` of the matched configuration.
    /// `More` rules report the identity order.
    pub fn matches(&self, legs: &[Leg]) -> Option<Vec<usize>> {
        match &self.kind {
            RuleKind::Fixed { legs: slots } => {
                if slots.is_empty() || legs.len() != slots.len() {
                    return None;
                }
                permutation_search(slots, legs)
            }
            RuleKind::Multiple { legs: slots } => {
                if !multiple_precheck(slots, legs) {
                    return None;
                }
                permutation_search(slots, legs)
            }
            RuleKind::More { leg: slot, min_count } => more_match(slot, *min_count, legs),
        }
    }
}

/// Cheap rejection for repeating-block rules: the leg count must be a
/// nonzero multiple of the block size, and every required instrument type
/// must occur somewhere among the observed legs.
fn multiple_precheck(slots: &[LegConstraint], legs: &[Leg]) -> bool {
    if slots.is_empty() || legs.is_empty() || legs.len() % slots.len() != 0 {
        return false;
    }
    let observed: HashSet<InstrumentType> = legs.iter().map(|leg| leg.instrument).collect();
    slots.iter().all(|slot| observed.contains(&slot.instrument))
}

/// Lexicographic permutation search. The first index permutation of the
/// observed legs under which every block validates wins; exhausting the
/// space is failure. Factorial in the leg count, which stays in the low
/// tens at most.
fn permutation_search(slots: &[LegConstraint], legs: &[Leg]) -> Option<Vec<usize>> {
    let mut order: Vec<usize> = (0..legs.len()).collect();
    loop {
        if blocks_match(slots, legs, &order) {
            return Some(order);
        }
        if !next_permutation(&mut order) {
            return None;
        }
    }
}

/// Validates one ordering: the permuted legs split into consecutive
/// constraint-sized blocks, each checked against the constraint list from a
/// freshly reset binding state. No tagged or offset state carries across a
/// block boundary.
fn blocks_match(slots: &[LegConstraint], legs: &[Leg], order: &[usize]) -> bool {
    order.chunks(slots.len()).all(|block| block_matches(slots, legs, block))
}

fn block_matches(slots: &[LegConstraint], legs: &[Leg], block: &[usize]) -> bool {
    let mut strikes = BindingState::new();
    let mut expirations: BindingState<Date> = BindingState::new();

    for (slot, &index) in slots.iter().zip(block) {
        let leg = &legs[index];

        if slot.instrument != leg.instrument {
            return false;
        }
        if !slot.ratio.accepts(leg.ratio) {
            return false;
        }
        if !strikes.bind(slot.strike, leg.strike) {
            return false;
        }

        let expiry_ok = match slot.expiration {
            // A span measures from the last bound expiration and does not
            // rebind it.
            ExpirySpec::Span(dur) => match expirations.last() {
                Some(base) => base.matches_span(dur, leg.expiration),
                None => false,
            },
            ExpirySpec::Value(spec) => expirations.bind(spec, leg.expiration),
        };
        if !expiry_ok {
            return false;
        }
    }

    true
}

/// Unbounded rule: every leg must pass the instrument and ratio tests;
/// strike and expiration constraints are not evaluated. Identity order.
fn more_match(slot: &LegConstraint, min_count: usize, legs: &[Leg]) -> Option<Vec<usize>> {
    if legs.len() < min_count {
        return None;
    }
    let all_qualify = legs
        .iter()
        .all(|leg| slot.instrument.admits(leg.instrument) && slot.ratio.accepts(leg.ratio));
    all_qualify.then(|| (0..legs.len()).collect())
}

/// Advances `seq` to its lexicographic successor in place. Returns false
/// once the sequence is the final (descending) permutation.
fn next_permutation(seq: &mut [usize]) -> bool {
    if seq.len() < 2 {
        return false;
    }
    let mut pivot = seq.len() - 1;
    while pivot > 0 && seq[pivot - 1] >= seq[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }
    let mut swap = seq.len() - 1;
    while seq[swap] <= seq[pivot - 1] {
        swap -= 1;
    }
    seq.swap(pivot - 1, swap);
    seq[pivot..].reverse();
    true
}
