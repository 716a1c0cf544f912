//! `dropzone stage` and `dropzone check`.

use std::sync::Arc;

use anyhow::{Result, bail};
use dropzone_core::{
    BlobRegistry, HostFile, LocalFile, PreviewProvider, UploadConfig, UploadSession, validate,
};

use super::output::{Report, format_size};

fn open_all(paths: &[String]) -> Result<Vec<LocalFile>> {
    paths.iter().map(|p| LocalFile::open(p)).collect()
}

/// Submits the paths as a single selection batch and prints the session.
///
/// Without `multiple` only the first path is opened, matching what
/// `submit_batch` considers.
pub fn stage(upload: UploadConfig, paths: &[String], json: bool) -> Result<()> {
    let considered = if upload.multiple { paths } else { &paths[..paths.len().min(1)] };
    let files = open_all(considered)?;

    let registry = Arc::new(BlobRegistry::new());
    let provider: Arc<dyn PreviewProvider> = Arc::clone(&registry) as _;
    let mut session = UploadSession::with_previews(upload, provider);

    let outcome = session.submit_batch(files);
    tracing::info!(
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected,
        "batch staged"
    );

    Report::new(&session, &registry).print(json)
}

/// Validates each path independently and reports per-file results.
pub fn check(upload: &UploadConfig, paths: &[String]) -> Result<()> {
    let files = open_all(paths)?;

    let mut rejected = 0usize;
    for file in &files {
        match validate(file, upload) {
            Ok(()) => println!(
                "ok        {} ({}, {})",
                file.name(),
                format_size(file.size()),
                file.mime_type()
            ),
            Err(e) => {
                rejected += 1;
                println!("rejected  {}: {e}", file.name());
            }
        }
    }

    if rejected > 0 {
        bail!("{rejected} of {} file(s) rejected", files.len());
    }
    Ok(())
}
