//! Accept rules for gating file types.
//!
//! A rule is written the same way as an HTML `accept` token:
//! - `.png` matches filenames ending in `.png` (case-insensitive)
//! - `image/*` matches any MIME type in the `image/` family
//! - `application/pdf` matches that exact MIME type

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One file-type acceptance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AcceptRule {
    /// Filename suffix including the leading dot (e.g. `.png`).
    Extension(String),
    /// MIME family without the trailing `/*` (e.g. `image`).
    MimeWildcard(String),
    /// Exact MIME type (e.g. `application/pdf`).
    MimeExact(String),
}

/// Error returned when a token cannot be parsed as an accept rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptRuleError {
    Empty,
    /// `.` alone, or a wildcard with no family (`/*`).
    Incomplete(String),
}

impl fmt::Display for AcceptRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptRuleError::Empty => write!(f, "accept rule is empty"),
            AcceptRuleError::Incomplete(token) => write!(f, "incomplete accept rule '{token}'"),
        }
    }
}

impl std::error::Error for AcceptRuleError {}

impl AcceptRule {
    /// Returns true if the file described by `name` and `mime_type` satisfies this rule.
    pub fn matches(&self, name: &str, mime_type: &str) -> bool {
        match self {
            AcceptRule::Extension(ext) => name.to_lowercase().ends_with(&ext.to_lowercase()),
            AcceptRule::MimeWildcard(family) => mime_type
                .strip_prefix(family.as_str())
                .is_some_and(|rest| rest.starts_with('/')),
            AcceptRule::MimeExact(mime) => mime_type == mime,
        }
    }

    /// Parses an HTML-style comma-separated accept string (`"image/*, .pdf"`).
    ///
    /// Whitespace around tokens is trimmed and empty tokens are skipped.
    ///
    /// # Errors
    /// Returns the first token that is not a valid rule.
    pub fn parse_list(accept: &str) -> Result<Vec<AcceptRule>, AcceptRuleError> {
        accept
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Describes a rule list for user-facing messages (`"image/*, .pdf"`).
    pub fn describe(rules: &[AcceptRule]) -> String {
        rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for AcceptRule {
    type Err = AcceptRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(AcceptRuleError::Empty);
        }

        if token.starts_with('.') {
            if token.len() == 1 {
                return Err(AcceptRuleError::Incomplete(token.to_string()));
            }
            return Ok(AcceptRule::Extension(token.to_string()));
        }

        if let Some(family) = token.strip_suffix("/*") {
            if family.is_empty() {
                return Err(AcceptRuleError::Incomplete(token.to_string()));
            }
            return Ok(AcceptRule::MimeWildcard(family.to_string()));
        }

        Ok(AcceptRule::MimeExact(token.to_string()))
    }
}

impl TryFrom<String> for AcceptRule {
    type Error = AcceptRuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcceptRule> for String {
    fn from(rule: AcceptRule) -> Self {
        rule.to_string()
    }
}

impl fmt::Display for AcceptRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptRule::Extension(ext) => write!(f, "{ext}"),
            AcceptRule::MimeWildcard(family) => write!(f, "{family}/*"),
            AcceptRule::MimeExact(mime) => write!(f, "{mime}"),
        }
    }
}
