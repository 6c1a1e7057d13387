use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid RFC 3339 timestamp '{value}': {source}")]
pub struct TimestampError {
    value: String,
    source: chrono::ParseError,
}

/// An ISO-8601 timestamp kept as text and ordered lexicographically.
///
/// Lexicographic order matches chronological order as long as every value
/// uses the same UTC format, which is what the notification service emits.
/// The empty timestamp is the minimum and means "nothing yet".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Arc<str>);

impl Default for Timestamp {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

impl Timestamp {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// Like [`Timestamp::new`], but rejects text that is not RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimestampError> {
        DateTime::parse_from_rfc3339(value).map_err(|source| TimestampError {
            value: value.to_string(),
            source,
        })?;
        Ok(Self::new(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.0).ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
