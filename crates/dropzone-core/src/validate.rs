//! Per-file validation against an [`UploadConfig`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::accept::AcceptRule;
use crate::config::UploadConfig;
use crate::file::HostFile;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Why a file was refused. Both variants are recoverable and user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// File is larger than `max_size`.
    SizeExceeded { limit_bytes: u64 },
    /// File matched none of the accept rules.
    TypeRejected { accepted: String },
}

impl ValidationError {
    /// Limit expressed in megabytes, as shown to the user.
    pub fn limit_mb(limit_bytes: u64) -> f64 {
        limit_bytes as f64 / BYTES_PER_MB
    }

    /// Megabytes rounded to one decimal, ties away from zero (0.25 -> 0.3).
    fn limit_mb_display(limit_bytes: u64) -> f64 {
        (Self::limit_mb(limit_bytes) * 10.0).round() / 10.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::SizeExceeded { limit_bytes } => write!(
                f,
                "File size must be less than {:.1}MB",
                Self::limit_mb_display(*limit_bytes)
            ),
            ValidationError::TypeRejected { accepted } => {
                write!(f, "File type not accepted. Accepted types: {accepted}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks one file against the size limit, then the accept rules.
///
/// # Errors
/// Returns the first failed check; size is checked before type.
pub fn validate<F: HostFile + ?Sized>(
    file: &F,
    config: &UploadConfig,
) -> Result<(), ValidationError> {
    if let Some(limit) = config.max_size
        && file.size() > limit
    {
        return Err(ValidationError::SizeExceeded { limit_bytes: limit });
    }

    if !config.accept.is_empty()
        && !config
            .accept
            .iter()
            .any(|rule| rule.matches(file.name(), file.mime_type()))
    {
        return Err(ValidationError::TypeRejected {
            accepted: AcceptRule::describe(&config.accept),
        });
    }

    Ok(())
}
