//! Rule model: per-slot constraints, the generic grouped/offset resolver,
//! and the cardinality variants with their match search.

pub mod binding;
pub mod combination;
pub mod constraint;

pub use binding::BindingState;
pub use combination::{Rule, RuleKind};
pub use constraint::{ExpirySpec, LegConstraint, Offset, RatioSpec, ValueSpec};
