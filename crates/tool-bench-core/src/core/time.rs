// crates/tool-bench-core/src/core/time.rs
// ============================================================================
// Module: Tool Bench Time Model
// Description: Canonical creation timestamps for experiments.
// Purpose: Provide millisecond-precision UTC timestamps with an RFC 3339 wire form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Experiments record a single creation timestamp. Values are held as unix
//! epoch milliseconds so they round-trip exactly through storage, and are
//! rendered as RFC 3339 strings on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp conversion errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Value falls outside the representable calendar range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
    /// RFC 3339 formatting failed.
    #[error("timestamp format failed: {0}")]
    Format(String),
    /// RFC 3339 parsing failed.
    #[error("timestamp parse failed: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC timestamp with millisecond precision.
///
/// # Invariants
/// - Stored as unix epoch milliseconds; sub-millisecond precision is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Captures the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self(i64::try_from(nanos / NANOS_PER_MILLI).unwrap_or(i64::MAX))
    }

    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }

    /// Renders the timestamp as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the value is outside the calendar range.
    pub fn to_rfc3339(self) -> Result<String, TimestampError> {
        let datetime =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * NANOS_PER_MILLI)
                .map_err(|_| TimestampError::OutOfRange(self.0))?;
        datetime.format(&Rfc3339).map_err(|err| TimestampError::Format(err.to_string()))
    }

    /// Parses an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] when the input is not valid RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimestampError> {
        let datetime = OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|err| TimestampError::Parse(err.to_string()))?;
        let millis = datetime.unix_timestamp_nanos() / NANOS_PER_MILLI;
        i64::try_from(millis)
            .map(Self)
            .map_err(|_| TimestampError::Parse("timestamp exceeds i64 millis".to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = self.to_rfc3339().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
