//! Validated version filenames.
//!
//! Every committed version is named `tree_<YYYYMMDD_HHMMSS_ffffff>.png`
//! with a microsecond-resolution UTC timestamp. Zero padding makes
//! lexicographic order equal creation order, which is what the history
//! listing and rollback arithmetic rely on.

use std::fmt;

use chrono::{DateTime, Utc};

/// A validated version filename.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionName(String);

impl VersionName {
    /// Filename prefix shared by all versions.
    pub const PREFIX: &'static str = "tree_";
    /// Filename suffix shared by all versions.
    pub const SUFFIX: &'static str = ".png";

    /// Mint a new version name from a UTC timestamp.
    ///
    /// Two mints within the same microsecond produce the same name; the
    /// later write then overwrites the earlier one. The single
    /// active-writer assumption keeps this out of reach in practice.
    pub fn mint(at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}{}",
            Self::PREFIX,
            at.format("%Y%m%d_%H%M%S_%6f"),
            Self::SUFFIX
        ))
    }

    /// Parse and validate a version filename.
    ///
    /// Returns `None` unless the name is exactly
    /// `tree_<8 digits>_<6 digits>_<6 digits>.png`.
    pub fn parse(name: &str) -> Option<Self> {
        let middle = name
            .strip_prefix(Self::PREFIX)?
            .strip_suffix(Self::SUFFIX)?;
        let mut parts = middle.split('_');
        for expected_len in [8usize, 6, 6] {
            let part = parts.next()?;
            if part.len() != expected_len || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Self(name.to_string()))
    }

    /// The filename as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying filename.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
