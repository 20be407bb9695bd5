//! Per-slot leg constraints — the building blocks of rule definitions.

use serde::{Deserialize, Serialize};

use crate::domain::{Duration, InstrumentType};

/// Ratio requirement for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RatioSpec {
    /// The observed ratio must equal this value exactly. No tolerance.
    Exact(f64),
    /// Sign-only: `true` requires a positive ratio, `false` a non-positive
    /// one.
    Sign(bool),
}

impl RatioSpec {
    pub fn accepts(&self, ratio: f64) -> bool {
        match *self {
            RatioSpec::Exact(value) => ratio == value,
            RatioSpec::Sign(positive) => (ratio > 0.0) == positive,
        }
    }
}

/// Direction of a relative-offset constraint. Only the sign is modeled;
/// offset magnitudes play no role in comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Offset {
    Positive,
    Negative,
    Zero,
}

/// Constraint on a totally ordered slot value (strike or expiration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueSpec {
    /// Tagged group: every slot carrying the same tag must bind an equal
    /// value within one match attempt.
    Group(char),
    /// Relative offset against the immediately preceding bound value.
    Offset(Offset),
}

/// Expiration constraint: grouped/offset like strikes, or a calendar span
/// measured from the last bound expiration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExpirySpec {
    Value(ValueSpec),
    Span(Duration),
}

/// One slot of a rule definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegConstraint {
    pub instrument: InstrumentType,
    pub ratio: RatioSpec,
    pub strike: ValueSpec,
    pub expiration: ExpirySpec,
}
