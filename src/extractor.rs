//! Apartment number extraction from free-text payment comments.
//!
//! Payers are asked to put their apartment number first in the comment,
//! optionally followed by the card they paid with (`"кв:155 4441114420563932"`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Longest unit number accepted, in decimal digits.
///
/// Longer leading runs are usually card or phone numbers typed first.
pub const MAX_UNIT_DIGITS: usize = 4;

static DIGIT_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// A unit number resolved for a transaction, plus the raw token that followed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitReference {
    /// Apartment number. `0` marks an unresolved transaction.
    pub unit: u32,

    /// Second digit run of the comment, conventionally a card suffix.
    pub secondary_token: String,
}

impl UnitReference {
    pub fn new(unit: u32, secondary_token: impl Into<String>) -> Self {
        UnitReference {
            unit,
            secondary_token: secondary_token.into(),
        }
    }

    /// Returns `true` for the "unknown unit" sentinel.
    pub fn is_unresolved(&self) -> bool {
        self.unit == 0
    }
}

/// The comment carries no usable unit number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound;

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comment does not contain a unit number")
    }
}

impl std::error::Error for NotFound {}

/// Extracts the unit number and secondary token from a comment.
///
/// The first run of digits is the unit; it is rejected when its canonical
/// rendering is longer than [`MAX_UNIT_DIGITS`]. The second run, if any,
/// is passed through untouched.
pub fn extract(comment: &str) -> Result<UnitReference, NotFound> {
    let mut runs = DIGIT_RUNS.find_iter(comment).map(|m| m.as_str());

    let first = runs.next().ok_or(NotFound)?;
    let unit: u32 = first.parse().map_err(|_| NotFound)?;
    if unit.to_string().len() > MAX_UNIT_DIGITS {
        return Err(NotFound);
    }

    let secondary_token = runs.next().unwrap_or_default().to_string();
    Ok(UnitReference {
        unit,
        secondary_token,
    })
}
