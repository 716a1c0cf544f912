//! Host file handles.
//!
//! The session never reads file bytes. It only needs the name, byte size and
//! declared MIME type that the host environment reports for a selection.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// MIME type used when neither the extension nor the content identifies a file.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A file handle supplied by the host environment.
pub trait HostFile {
    /// File name as reported by the host (no directory components).
    fn name(&self) -> &str;
    /// Size in bytes.
    fn size(&self) -> u64;
    /// Declared MIME type (e.g. "image/png").
    fn mime_type(&self) -> &str;
    /// Backing path, when the host has one.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Returns true if the declared MIME type is in the `image/` family.
    fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }
}

/// Metadata-only file handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

impl HostFile for FileMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// A regular file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    size: u64,
    mime_type: String,
}

impl LocalFile {
    /// Opens a user-supplied path (as typed or dropped into a terminal).
    ///
    /// # Errors
    /// Returns an error if the path cannot be stat'ed or is not a regular file.
    pub fn open(input: &str) -> Result<Self> {
        let path = normalize_input_path(input);
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Cannot read file: {}", path.display()))?;
        if !metadata.is_file() {
            bail!("Not a regular file: {}", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_type_for_extension(&name)
            .map(str::to_string)
            .or_else(|| sniff_mime_type(&path))
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        Ok(Self {
            path,
            name,
            size: metadata.len(),
            mime_type,
        })
    }
}

impl HostFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Normalizes user-provided file paths.
///
/// Handles common drag-and-drop shell escaping (`\ `, `\(`, `\)`) and
/// expands `~/` to the HOME directory when available.
#[must_use]
pub fn normalize_input_path(path: &str) -> PathBuf {
    let unescaped = path
        .trim()
        .replace("\\ ", " ")
        .replace("\\(", "(")
        .replace("\\)", ")");

    if let Some(rest) = unescaped.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }

    PathBuf::from(unescaped)
}

/// Returns the MIME type implied by a file name's extension, if known.
#[must_use]
pub fn mime_type_for_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension().and_then(|e| e.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        "json" => Some("application/json"),
        "zip" => Some("application/zip"),
        "txt" | "md" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}

/// Detects a MIME type from the file's leading magic bytes.
fn sniff_mime_type(path: &Path) -> Option<String> {
    let mut file = File::open(path).ok()?;
    let mut buffer = [0u8; 4096];
    let bytes_read = file.read(&mut buffer).ok()?;
    if bytes_read == 0 {
        return None;
    }

    infer::get(&buffer[..bytes_read]).map(|kind| kind.mime_type().to_string())
}
