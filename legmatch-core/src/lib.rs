//! legmatch core — classify observed instrument legs into named multi-leg
//! combinations.
//!
//! The crate is a small constraint-satisfaction engine:
//! - Domain types (observed legs, calendar dates, durations)
//! - Per-slot constraint model (ratio, grouped/offset strike and expiration)
//! - One generic grouped/offset resolver shared by strikes and expirations
//! - Fixed / Multiple / More rule cardinalities with lexicographic
//!   permutation search
//! - `Classifier`: immutable ordered rule registry, first match wins
//! - TOML rule-catalog loader

pub mod catalog;
pub mod classifier;
pub mod domain;
pub mod rules;

pub use catalog::{load_catalog, parse_catalog, CatalogError};
pub use classifier::{Classification, Classifier, UNCLASSIFIED};
pub use domain::{Date, Duration, InstrumentType, Leg, Period};
pub use rules::{ExpirySpec, LegConstraint, Offset, RatioSpec, Rule, RuleKind, ValueSpec};
