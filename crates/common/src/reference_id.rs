//! Public tracking codes for fault reports.
//!
//! A reference ID has the fixed shape `FRMS-<YYYY>-<XXXXXX>`: the calendar
//! year of submission followed by six upper-case alphanumeric characters.
//! Reporters copy it from confirmations and use it to look up progress
//! without signing in, so the format must never change.
//!
//! Uniqueness is probabilistic. The storage layer carries a unique index on
//! the column and callers retry generation when it reports a collision.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use rand::{CryptoRng, Rng, distributions::Alphanumeric, rngs::OsRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix shared by every reference ID.
pub const REFERENCE_PREFIX: &str = "FRMS";

/// Number of random characters after the year.
pub const SUFFIX_LEN: usize = 6;

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^FRMS-[0-9]{4}-[A-Z0-9]{6}$").expect("reference ID pattern is a valid regex")
});

/// A string that does not have the reference ID shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid reference ID: {0}")]
pub struct InvalidReferenceId(pub String);

/// Human-shareable fault tracking code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceId(String);

impl ReferenceId {
    /// Generate a reference ID for the current instant.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate a reference ID stamped with the year of `now`.
    #[must_use]
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        Self::generate_with(now, &mut OsRng)
    }

    /// Generate a reference ID with an explicit clock reading and RNG.
    pub fn generate_with<R>(now: DateTime<Utc>, rng: &mut R) -> Self
    where
        R: Rng + CryptoRng,
    {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_uppercase())
            .collect();

        Self(format!("{REFERENCE_PREFIX}-{:04}-{suffix}", now.year()))
    }

    /// Parse and validate a candidate reference ID.
    ///
    /// Only the exact upper-case form is accepted.
    pub fn parse(value: &str) -> Result<Self, InvalidReferenceId> {
        if REFERENCE_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidReferenceId(value.to_string()))
        }
    }

    /// Whether `value` has the reference ID shape.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        REFERENCE_PATTERN.is_match(value)
    }

    /// The year segment.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0
            .get(5..9)
            .and_then(|y| y.parse().ok())
            .unwrap_or_default()
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReferenceId {
    type Err = InvalidReferenceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReferenceId {
    type Error = InvalidReferenceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReferenceId> for String {
    fn from(value: ReferenceId) -> Self {
        value.0
    }
}

impl AsRef<str> for ReferenceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
