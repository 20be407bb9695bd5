//! Domain types for legmatch.

pub mod date;
pub mod leg;

pub use date::{Date, Duration, Period};
pub use leg::{InstrumentType, Leg};
