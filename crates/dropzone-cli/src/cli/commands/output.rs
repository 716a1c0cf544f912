//! Session report rendering shared by `stage` and `replay`.

use anyhow::{Context, Result};
use dropzone_core::{BlobRegistry, HostFile, SessionSnapshot, UploadSession};
use serde::Serialize;

/// Preview acquire/release counters at report time.
#[derive(Debug, Serialize)]
pub struct PreviewLedger {
    pub minted: usize,
    pub revoked: usize,
    pub live: usize,
}

impl PreviewLedger {
    pub fn of(registry: &BlobRegistry) -> Self {
        Self {
            minted: registry.minted(),
            revoked: registry.revoked(),
            live: registry.live(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub session: SessionSnapshot,
    pub previews: PreviewLedger,
}

impl Report {
    pub fn new<F: HostFile>(session: &UploadSession<F>, registry: &BlobRegistry) -> Self {
        Self {
            session: session.snapshot(),
            previews: PreviewLedger::of(registry),
        }
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            let out = serde_json::to_string_pretty(self).context("serialize report")?;
            println!("{out}");
            return Ok(());
        }

        let session = &self.session;
        println!("Candidates ({}):", session.candidates.len());
        for c in &session.candidates {
            let preview = c.preview.as_deref().unwrap_or("-");
            println!(
                "  {}  {}  {}  {}  {}",
                c.id,
                c.name,
                format_size(c.size),
                c.mime_type,
                preview
            );
        }

        if !session.validation_errors.is_empty() {
            println!("Errors:");
            for message in &session.validation_errors {
                println!("  {message}");
            }
        }

        if session.is_drag_active {
            println!("Drag: active");
        }

        println!(
            "Previews: {} minted, {} revoked, {} live",
            self.previews.minted, self.previews.revoked, self.previews.live
        );
        Ok(())
    }
}

/// Formats a byte count for display ("512 B", "1.5 KB", "2.0 MB").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in UNITS.iter().skip(1) {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = *next;
    }
    format!("{value:.1} {unit}")
}
