//! Observed instrument legs and the textual leg-record parser.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::date::Date;

/// Instrument type tag.
///
/// `Option` appears in rule definitions, where it admits either a call or a
/// put for unbounded ("more") rules. `Unknown` is the sentinel carried by
/// legs parsed from malformed records; no rule ever accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Call,
    Future,
    Option,
    Put,
    Underlying,
    Unknown,
}

impl InstrumentType {
    /// The single-letter tag used by rule resources and leg records.
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'C' => Self::Call,
            'F' => Self::Future,
            'O' => Self::Option,
            'P' => Self::Put,
            'U' => Self::Underlying,
            _ => Self::Unknown,
        }
    }

    /// True for types that carry a meaningful strike.
    pub fn has_strike(self) -> bool {
        matches!(self, Self::Call | Self::Option | Self::Put)
    }

    /// Instrument test used by unbounded rules: `Option` admits either
    /// option side; everything else requires an exact match.
    pub fn admits(self, observed: InstrumentType) -> bool {
        self == observed
            || (self == Self::Option && matches!(observed, Self::Call | Self::Put))
    }
}

/// A single observed position: one leg of a potential combination.
///
/// The ratio sign encodes direction (buy positive, sell negative). The
/// strike is meaningful only for option types and is zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub instrument: InstrumentType,
    pub ratio: f64,
    pub strike: f64,
    pub expiration: Date,
}

impl Leg {
    pub fn new(instrument: InstrumentType, ratio: f64, strike: f64, expiration: Date) -> Self {
        Self { instrument, ratio, strike, expiration }
    }

    /// The sentinel produced for malformed records. Fails every rule's
    /// instrument check, so a request containing one typically classifies
    /// as "Unclassified".
    pub fn invalid() -> Self {
        Self {
            instrument: InstrumentType::Unknown,
            ratio: 0.0,
            strike: 0.0,
            expiration: Date::new(0, 1, 1),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.instrument != InstrumentType::Unknown
    }

    /// Parses one whitespace-separated leg record:
    /// `<type> <ratio> [<strike>] <YYYY-MM-DD>`, where the strike column is
    /// present only for option types (C/O/P).
    ///
    /// Total: a malformed record yields [`Leg::invalid`] rather than an
    /// error.
    pub fn parse(record: &str) -> Leg {
        Self::try_parse(record).unwrap_or_else(Leg::invalid)
    }

    fn try_parse(record: &str) -> Option<Leg> {
        let mut fields = record.split_whitespace();

        let type_field = fields.next()?;
        let mut type_chars = type_field.chars();
        let letter = type_chars.next()?;
        if type_chars.next().is_some() {
            return None;
        }
        let instrument = InstrumentType::from_letter(letter);
        if instrument == InstrumentType::Unknown {
            return None;
        }

        let ratio: f64 = fields.next()?.parse().ok()?;

        let strike: f64 = if instrument.has_strike() {
            fields.next()?.parse().ok()?
        } else {
            0.0
        };

        let expiration = NaiveDate::parse_from_str(fields.next()?, "%Y-%m-%d").ok()?;

        Some(Leg::new(instrument, ratio, strike, expiration.into()))
    }
}
