//! Rule catalog loading — the declarative TOML resource describing every
//! known combination.
//!
//! Format:
//!
//! ```toml
//! [[combination]]
//! name = "Straddle"
//! cardinality = "fixed"
//! legs = [
//!     { type = "C", ratio = "+", strike = "A", expiration = "A" },
//!     { type = "P", ratio = "+", strike = "A", expiration = "A" },
//! ]
//! ```
//!
//! Leg fields: `type` is one of C/F/O/P/U; `ratio` is `"+"`, `"-"`, or a
//! numeric literal; exactly one of `strike` (group tag letter) /
//! `strike_offset` (`"+"`, `"-"`, `"0"` — repeated sign characters are
//! accepted, only the sign is kept); exactly one of `expiration` (group tag)
//! / `expiration_offset` (offset string, or a duration like `"3m"` or
//! `"1q"`). Rules with `cardinality = "more"` carry `mincount` and a single
//! leg.
//!
//! Loading is all-or-nothing: any structural violation fails the whole
//! catalog and no usable registry is produced.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::classifier::Classifier;
use crate::domain::{Duration, InstrumentType};
use crate::rules::{ExpirySpec, LegConstraint, Offset, RatioSpec, Rule, RuleKind, ValueSpec};

/// Structural failures while loading the rule catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("rule '{rule}': unknown cardinality '{value}'")]
    UnknownCardinality { rule: String, value: String },

    #[error("rule '{rule}': no legs")]
    EmptyLegs { rule: String },

    #[error("rule '{rule}': unknown instrument type '{value}'")]
    UnknownInstrument { rule: String, value: String },

    #[error("rule '{rule}': bad ratio spec '{value}'")]
    BadRatio { rule: String, value: String },

    #[error("rule '{rule}': leg needs exactly one of 'strike' / 'strike_offset'")]
    MissingStrike { rule: String },

    #[error("rule '{rule}': bad strike spec '{value}'")]
    BadStrike { rule: String, value: String },

    #[error("rule '{rule}': leg needs exactly one of 'expiration' / 'expiration_offset'")]
    MissingExpiration { rule: String },

    #[error("rule '{rule}': bad expiration spec '{value}'")]
    BadExpiration { rule: String, value: String },

    #[error("rule '{rule}': 'more' cardinality requires 'mincount'")]
    MissingMinCount { rule: String },

    #[error("rule '{rule}': 'more' cardinality takes exactly one leg")]
    MoreLegCount { rule: String },
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default, rename = "combination")]
    combinations: Vec<RawCombination>,
}

#[derive(Debug, Deserialize)]
struct RawCombination {
    name: String,
    cardinality: String,
    mincount: Option<usize>,
    legs: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    #[serde(rename = "type")]
    instrument: String,
    ratio: String,
    strike: Option<String>,
    strike_offset: Option<String>,
    expiration: Option<String>,
    expiration_offset: Option<String>,
}

/// Loads a rule catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<Classifier, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Parses a rule catalog from a TOML string.
pub fn parse_catalog(content: &str) -> Result<Classifier, CatalogError> {
    let raw: RawCatalog = toml::from_str(content)?;
    let mut rules = Vec::with_capacity(raw.combinations.len());
    for combination in &raw.combinations {
        rules.push(convert_rule(combination)?);
    }
    Ok(Classifier::new(rules))
}

fn convert_rule(raw: &RawCombination) -> Result<Rule, CatalogError> {
    if raw.legs.is_empty() {
        return Err(CatalogError::EmptyLegs { rule: raw.name.clone() });
    }

    let mut legs = Vec::with_capacity(raw.legs.len());
    for leg in &raw.legs {
        legs.push(convert_leg(&raw.name, leg)?);
    }

    let kind = match raw.cardinality.as_str() {
        "fixed" => RuleKind::Fixed { legs },
        "multiple" => RuleKind::Multiple { legs },
        "more" => {
            if legs.len() != 1 {
                return Err(CatalogError::MoreLegCount { rule: raw.name.clone() });
            }
            let min_count = raw
                .mincount
                .ok_or_else(|| CatalogError::MissingMinCount { rule: raw.name.clone() })?;
            RuleKind::More { leg: legs[0], min_count }
        }
        other => {
            return Err(CatalogError::UnknownCardinality {
                rule: raw.name.clone(),
                value: other.to_string(),
            })
        }
    };

    Ok(Rule::new(raw.name.clone(), kind))
}

fn convert_leg(rule: &str, raw: &RawLeg) -> Result<LegConstraint, CatalogError> {
    let instrument = single_letter(&raw.instrument)
        .map(InstrumentType::from_letter)
        .filter(|ty| *ty != InstrumentType::Unknown)
        .ok_or_else(|| CatalogError::UnknownInstrument {
            rule: rule.to_string(),
            value: raw.instrument.clone(),
        })?;

    let ratio = match raw.ratio.as_str() {
        "+" => RatioSpec::Sign(true),
        "-" => RatioSpec::Sign(false),
        literal => literal.parse().map(RatioSpec::Exact).map_err(|_| CatalogError::BadRatio {
            rule: rule.to_string(),
            value: raw.ratio.clone(),
        })?,
    };

    let strike = match (&raw.strike, &raw.strike_offset) {
        (Some(tag), None) => {
            let tag = single_letter(tag).ok_or_else(|| CatalogError::BadStrike {
                rule: rule.to_string(),
                value: tag.clone(),
            })?;
            ValueSpec::Group(tag)
        }
        (None, Some(spec)) => {
            let offset = parse_offset(spec).ok_or_else(|| CatalogError::BadStrike {
                rule: rule.to_string(),
                value: spec.clone(),
            })?;
            ValueSpec::Offset(offset)
        }
        _ => return Err(CatalogError::MissingStrike { rule: rule.to_string() }),
    };

    let expiration = match (&raw.expiration, &raw.expiration_offset) {
        (Some(tag), None) => {
            let tag = single_letter(tag).ok_or_else(|| CatalogError::BadExpiration {
                rule: rule.to_string(),
                value: tag.clone(),
            })?;
            ExpirySpec::Value(ValueSpec::Group(tag))
        }
        (None, Some(spec)) => match parse_offset(spec) {
            Some(offset) => ExpirySpec::Value(ValueSpec::Offset(offset)),
            None => {
                let dur = Duration::parse(spec).ok_or_else(|| CatalogError::BadExpiration {
                    rule: rule.to_string(),
                    value: spec.clone(),
                })?;
                ExpirySpec::Span(dur)
            }
        },
        _ => return Err(CatalogError::MissingExpiration { rule: rule.to_string() }),
    };

    Ok(LegConstraint { instrument, ratio, strike, expiration })
}

fn single_letter(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let letter = chars.next()?;
    chars.next().is_none().then_some(letter)
}

/// `"+"`/`"++"`… is positive, `"-"`/`"--"`… negative, `"0"` zero. Anything
/// else is not an offset (the caller may then try a duration).
fn parse_offset(s: &str) -> Option<Offset> {
    if s == "0" {
        Some(Offset::Zero)
    } else if !s.is_empty() && s.chars().all(|c| c == '+') {
        Some(Offset::Positive)
    } else if !s.is_empty() && s.chars().all(|c| c == '-') {
        Some(Offset::Negative)
    } else {
        None
    }
}
