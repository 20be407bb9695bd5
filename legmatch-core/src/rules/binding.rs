//! Grouped-tag / relative-offset constraint resolution.
//!
//! One generic resolver serves both strike (numeric) and expiration (date)
//! constraints: both are totally ordered and equality-comparable. State is
//! scoped to a single match attempt — one block of one permutation — and is
//! rebuilt from scratch for the next attempt.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::rules::constraint::{Offset, ValueSpec};

/// Per-attempt binding state for one constraint domain.
#[derive(Debug, Clone)]
pub struct BindingState<T> {
    groups: HashMap<char, T>,
    last: Option<T>,
}

impl<T: PartialOrd + Copy> BindingState<T> {
    pub fn new() -> Self {
        Self { groups: HashMap::new(), last: None }
    }

    /// Binds `value` to `spec`, returning whether the slot is satisfied.
    ///
    /// Group tags bind the first value seen and demand equality afterwards.
    /// Offsets compare against the previously bound value: `Zero` demands
    /// equality, `Positive` strictly greater, `Negative` strictly less. The
    /// first slot of an attempt has nothing to compare against and passes.
    ///
    /// The last bound value is updated after every slot, whichever branch
    /// was taken.
    pub fn bind(&mut self, spec: ValueSpec, value: T) -> bool {
        let satisfied = match spec {
            ValueSpec::Group(tag) => match self.groups.entry(tag) {
                Entry::Occupied(entry) => *entry.get() == value,
                Entry::Vacant(entry) => {
                    entry.insert(value);
                    true
                }
            },
            ValueSpec::Offset(offset) => match (offset, self.last) {
                (_, None) => true,
                (Offset::Zero, Some(prev)) => value == prev,
                (Offset::Positive, Some(prev)) => value > prev,
                (Offset::Negative, Some(prev)) => value < prev,
            },
        };
        self.last = Some(value);
        satisfied
    }

    /// The most recently bound value, if any.
    pub fn last(&self) -> Option<T> {
        self.last
    }
}

impl<T: PartialOrd + Copy> Default for BindingState<T> {
    fn default() -> Self {
        Self::new()
    }
}
