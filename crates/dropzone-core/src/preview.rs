//! Preview resources for image candidates.
//!
//! A provider mints a short-lived URI that lets the presentation layer show a
//! file's bytes, and revokes it when the owning candidate goes away. Revocation
//! is tied to [`PreviewHandle`]'s `Drop`, so each minted URI is released
//! exactly once on every path that discards its candidate.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::file::HostFile;

/// URI scheme prefix used by [`BlobRegistry`].
pub const BLOB_URI_PREFIX: &str = "blob:dropzone/";

/// Capability to mint and revoke preview URIs.
pub trait PreviewProvider: Send + Sync {
    /// Mints a new preview URI for `file`.
    ///
    /// # Errors
    /// Returns an error if the provider cannot expose this file.
    fn mint(&self, file: &dyn HostFile) -> Result<String>;

    /// Releases a URI previously returned by [`PreviewProvider::mint`].
    fn revoke(&self, uri: &str);
}

/// Owns one minted preview URI and revokes it on drop.
pub struct PreviewHandle {
    uri: String,
    provider: Arc<dyn PreviewProvider>,
}

impl PreviewHandle {
    /// Mints a preview for `file` through `provider`.
    ///
    /// # Errors
    /// Propagates the provider's mint failure; nothing is held in that case.
    pub fn acquire(provider: &Arc<dyn PreviewProvider>, file: &dyn HostFile) -> Result<Self> {
        let uri = provider.mint(file)?;
        tracing::debug!(uri = %uri, file = file.name(), "preview minted");
        Ok(Self {
            uri,
            provider: Arc::clone(provider),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        tracing::debug!(uri = %self.uri, "preview revoked");
        self.provider.revoke(&self.uri);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

/// What a blob URI points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub name: String,
    pub mime_type: String,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: HashMap<String, BlobEntry>,
    minted: usize,
    revoked: usize,
}

/// In-memory object-URL registry (`blob:dropzone/<uuid>` → file).
///
/// Hosts resolve a URI back to the file's path to render it. Counters make the
/// acquire/release pairing observable.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    inner: Mutex<RegistryInner>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up a live URI.
    pub fn resolve(&self, uri: &str) -> Option<BlobEntry> {
        self.lock().entries.get(uri).cloned()
    }

    /// Number of minted URIs not yet revoked.
    pub fn live(&self) -> usize {
        self.lock().entries.len()
    }

    /// Total URIs minted over the registry's lifetime.
    pub fn minted(&self) -> usize {
        self.lock().minted
    }

    /// Total URIs revoked over the registry's lifetime.
    pub fn revoked(&self) -> usize {
        self.lock().revoked
    }
}

impl PreviewProvider for BlobRegistry {
    fn mint(&self, file: &dyn HostFile) -> Result<String> {
        let uri = format!("{BLOB_URI_PREFIX}{}", uuid::Uuid::new_v4());
        let entry = BlobEntry {
            name: file.name().to_string(),
            mime_type: file.mime_type().to_string(),
            path: file.path().map(std::path::Path::to_path_buf),
        };

        let mut inner = self.lock();
        inner.entries.insert(uri.clone(), entry);
        inner.minted += 1;
        Ok(uri)
    }

    fn revoke(&self, uri: &str) {
        let mut inner = self.lock();
        if inner.entries.remove(uri).is_some() {
            inner.revoked += 1;
        } else {
            tracing::warn!(uri, "revoke of unknown preview uri ignored");
        }
    }
}
