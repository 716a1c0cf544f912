//! Upload session state.
//!
//! Owns the pending file selection: validates each batch, keeps preview
//! handles for image candidates, and tracks the drop-target drag state.
//! One session per user interaction surface; nothing here is global.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::UploadConfig;
use crate::drag::{DragEvent, DragResponse, DragState};
use crate::file::HostFile;
use crate::picker::{FilePicker, PickerRequest};
use crate::preview::{PreviewHandle, PreviewProvider};
use crate::validate::{ValidationError, validate};

/// Opaque candidate identifier, unique within a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A file accepted into the pending-upload set.
#[derive(Debug)]
pub struct UploadCandidate<F> {
    pub id: CandidateId,
    pub file: F,
    preview: Option<PreviewHandle>,
}

impl<F> UploadCandidate<F> {
    /// Preview URI, present only for image files with a working provider.
    pub fn preview_uri(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::uri)
    }
}

/// A file refused by the most recent batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub file_name: String,
    pub error: ValidationError,
}

/// Summary of one [`UploadSession::submit_batch`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub accepted: Vec<CandidateId>,
    pub rejected: usize,
}

/// Read-only view of a candidate for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateView {
    pub id: CandidateId,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Read-only view of the whole session for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub candidates: Vec<CandidateView>,
    pub is_drag_active: bool,
    pub validation_errors: Vec<String>,
}

/// Pending-upload session.
pub struct UploadSession<F> {
    config: UploadConfig,
    previews: Option<Arc<dyn PreviewProvider>>,
    candidates: Vec<UploadCandidate<F>>,
    drag: DragState,
    rejections: Vec<Rejection>,
}

impl<F: HostFile> UploadSession<F> {
    /// Creates a session that never mints previews.
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            previews: None,
            candidates: Vec::new(),
            drag: DragState::Idle,
            rejections: Vec::new(),
        }
    }

    /// Creates a session that mints previews for image candidates.
    pub fn with_previews(config: UploadConfig, previews: Arc<dyn PreviewProvider>) -> Self {
        Self {
            previews: Some(previews),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn candidates(&self) -> &[UploadCandidate<F>] {
        &self.candidates
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag.is_active()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Rejections from the most recent batch, in submission order.
    pub fn validation_errors(&self) -> &[Rejection] {
        &self.rejections
    }

    /// User-facing messages for the most recent batch's rejections.
    pub fn error_messages(&self) -> Vec<String> {
        self.rejections
            .iter()
            .map(|r| r.error.to_string())
            .collect()
    }

    /// Validates and stages one selection or drop batch.
    ///
    /// Without `multiple`, only the first file is considered and an accepted
    /// file replaces every held candidate. A batch that accepts nothing leaves
    /// the candidates untouched. Errors replace those of the previous batch.
    pub fn submit_batch(&mut self, files: impl IntoIterator<Item = F>) -> BatchOutcome {
        let limit = if self.config.multiple { usize::MAX } else { 1 };

        let mut accepted = Vec::new();
        let mut rejections = Vec::new();
        for file in files.into_iter().take(limit) {
            match validate(&file, &self.config) {
                Ok(()) => accepted.push(file),
                Err(error) => {
                    tracing::info!(file = file.name(), %error, "file rejected");
                    rejections.push(Rejection {
                        file_name: file.name().to_string(),
                        error,
                    });
                }
            }
        }

        let rejected = rejections.len();
        self.rejections = rejections;

        if accepted.is_empty() {
            return BatchOutcome {
                accepted: Vec::new(),
                rejected,
            };
        }

        if !self.config.multiple {
            // Old previews are released before the replacement is minted.
            self.clear_all();
        }

        let mut ids = Vec::with_capacity(accepted.len());
        for file in accepted {
            let candidate = self.stage(file);
            ids.push(candidate.id.clone());
            self.candidates.push(candidate);
        }

        BatchOutcome {
            accepted: ids,
            rejected,
        }
    }

    fn stage(&self, file: F) -> UploadCandidate<F> {
        let preview = match &self.previews {
            Some(provider) if file.is_image() => match PreviewHandle::acquire(provider, &file) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(file = file.name(), error = %e, "preview unavailable");
                    None
                }
            },
            _ => None,
        };

        let candidate = UploadCandidate {
            id: CandidateId::generate(),
            file,
            preview,
        };
        tracing::debug!(id = %candidate.id, file = candidate.file.name(), "candidate staged");
        candidate
    }

    /// Removes one candidate and releases its preview.
    ///
    /// Returns false (and changes nothing) if `id` is not held.
    pub fn remove_candidate(&mut self, id: &CandidateId) -> bool {
        let Some(index) = self.candidates.iter().position(|c| &c.id == id) else {
            return false;
        };
        let removed = self.candidates.remove(index);
        tracing::debug!(id = %removed.id, file = removed.file.name(), "candidate removed");
        true
    }

    /// Releases every preview and empties the candidates. Errors are kept.
    pub fn clear_all(&mut self) {
        if !self.candidates.is_empty() {
            tracing::debug!(count = self.candidates.len(), "candidates cleared");
        }
        self.candidates.clear();
    }

    /// Removes and returns every candidate, keeping their previews alive.
    ///
    /// The caller owns the returned previews; they are revoked when the
    /// candidates are dropped.
    pub fn take_candidates(&mut self) -> Vec<UploadCandidate<F>> {
        std::mem::take(&mut self.candidates)
    }

    /// Applies one drag event from the drop target.
    pub fn handle_drag(&mut self, event: DragEvent<F>) -> DragResponse {
        self.drag = self.drag.next(&event);
        if let DragEvent::Drop(files) = event {
            self.submit_batch(files);
        }
        DragResponse::HANDLED
    }

    /// Asks the host to present its native file picker.
    pub fn open_picker(&self, picker: &mut dyn FilePicker) {
        let request = PickerRequest {
            accept: self.config.accept.clone(),
            multiple: self.config.multiple,
        };
        tracing::debug!(
            accept = %request.accept_attribute(),
            multiple = request.multiple,
            "picker requested"
        );
        picker.open(&request);
    }

    /// Returns a serializable view of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateView {
                    id: c.id.clone(),
                    name: c.file.name().to_string(),
                    size: c.file.size(),
                    mime_type: c.file.mime_type().to_string(),
                    preview: c.preview_uri().map(str::to_string),
                })
                .collect(),
            is_drag_active: self.is_drag_active(),
            validation_errors: self.error_messages(),
        }
    }
}

impl<F> fmt::Debug for UploadSession<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSession")
            .field("config", &self.config)
            .field("candidates", &self.candidates.len())
            .field("drag", &self.drag)
            .field("rejections", &self.rejections)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileMeta;
    use crate::preview::BlobRegistry;

    fn png(name: &str, size: u64) -> FileMeta {
        FileMeta::new(name, size, "image/png")
    }

    fn text(name: &str, size: u64) -> FileMeta {
        FileMeta::new(name, size, "text/plain")
    }

    fn session(
        accept: &str,
        max_size: Option<u64>,
        multiple: bool,
    ) -> (UploadSession<FileMeta>, Arc<BlobRegistry>) {
        let registry = Arc::new(BlobRegistry::new());
        let provider: Arc<dyn PreviewProvider> = Arc::clone(&registry) as _;
        let config = UploadConfig::new(accept, max_size, multiple).unwrap();
        (UploadSession::with_previews(config, provider), registry)
    }

    fn names(session: &UploadSession<FileMeta>) -> Vec<&str> {
        session
            .candidates()
            .iter()
            .map(|c| c.file.name.as_str())
            .collect()
    }

    #[test]
    fn test_mixed_batch_keeps_valid_image_and_reports_rejection() {
        let (mut s, registry) = session("image/*", Some(2_000_000), true);

        let outcome = s.submit_batch(vec![png("a.png", 1_000_000), text("b.txt", 500)]);

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(names(&s), vec!["a.png"]);
        assert!(s.candidates()[0].preview_uri().is_some());
        assert_eq!(registry.minted(), 1);
        assert_eq!(
            s.error_messages(),
            vec!["File type not accepted. Accepted types: image/*".to_string()]
        );
        assert_eq!(s.validation_errors()[0].file_name, "b.txt");
    }

    #[test]
    fn test_oversized_single_file_leaves_candidates_empty() {
        let (mut s, registry) = session("", Some(1_000_000), false);

        s.submit_batch(vec![FileMeta::new("big.jpg", 5_000_000, "image/jpeg")]);

        assert!(s.candidates().is_empty());
        assert_eq!(
            s.error_messages(),
            vec!["File size must be less than 1.0MB".to_string()]
        );
        assert_eq!(registry.minted(), 0);
    }

    #[test]
    fn test_multiple_appends_in_submission_order() {
        let (mut s, _registry) = session("", None, true);
        s.submit_batch(vec![png("1.png", 1), png("2.png", 1)]);
        s.submit_batch(vec![text("3.txt", 1), png("4.png", 1), text("5.txt", 1)]);

        assert_eq!(names(&s), vec!["1.png", "2.png", "3.txt", "4.png", "5.txt"]);

        let mut ids: Vec<_> = s.candidates().iter().map(|c| c.id.clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_single_mode_replaces_and_revokes_previous_preview_once() {
        let (mut s, registry) = session("", None, false);

        s.submit_batch(vec![png("first.png", 1)]);
        let first_uri = s.candidates()[0].preview_uri().unwrap().to_string();

        s.submit_batch(vec![png("second.png", 1), png("ignored.png", 1)]);

        assert_eq!(names(&s), vec!["second.png"]);
        assert!(registry.resolve(&first_uri).is_none());
        assert_eq!(registry.minted(), 2);
        assert_eq!(registry.revoked(), 1);
        assert_eq!(registry.live(), 1);
    }

    #[test]
    fn test_single_mode_only_considers_first_file() {
        let (mut s, _registry) = session("image/*", None, false);

        s.submit_batch(vec![text("bad.txt", 1), png("good.png", 1)]);

        assert!(s.candidates().is_empty());
        assert_eq!(s.validation_errors().len(), 1);
    }

    #[test]
    fn test_all_rejected_batch_preserves_candidates_in_single_mode() {
        let (mut s, registry) = session("image/*", None, false);
        s.submit_batch(vec![png("keep.png", 1)]);

        s.submit_batch(vec![text("nope.txt", 1)]);

        assert_eq!(names(&s), vec!["keep.png"]);
        assert_eq!(registry.revoked(), 0);
        assert_eq!(s.validation_errors().len(), 1);
    }

    #[test]
    fn test_new_batch_replaces_previous_errors() {
        let (mut s, _registry) = session("image/*", None, true);
        s.submit_batch(vec![text("a.txt", 1), text("b.txt", 1)]);
        assert_eq!(s.validation_errors().len(), 2);

        s.submit_batch(vec![png("ok.png", 1)]);
        assert!(s.validation_errors().is_empty());
    }

    #[test]
    fn test_non_image_gets_no_preview() {
        let (mut s, registry) = session("", None, true);
        s.submit_batch(vec![text("notes.txt", 1)]);

        assert_eq!(s.candidates()[0].preview_uri(), None);
        assert_eq!(registry.minted(), 0);
    }

    #[test]
    fn test_failed_preview_still_stages_image() {
        use std::sync::atomic::{AtomicBool, Ordering};

        #[derive(Default)]
        struct NoSurface {
            revoked: AtomicBool,
        }

        impl PreviewProvider for NoSurface {
            fn mint(&self, _file: &dyn HostFile) -> anyhow::Result<String> {
                anyhow::bail!("no display surface")
            }

            fn revoke(&self, _uri: &str) {
                self.revoked.store(true, Ordering::SeqCst);
            }
        }

        let provider = Arc::new(NoSurface::default());
        let config = UploadConfig::new("image/*", None, true).unwrap();
        let mut s = UploadSession::with_previews(config, Arc::clone(&provider) as _);

        let outcome = s.submit_batch(vec![png("a.png", 1), png("b.png", 1)]);

        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(names(&s), vec!["a.png", "b.png"]);
        assert!(s.candidates().iter().all(|c| c.preview_uri().is_none()));
        assert!(s.validation_errors().is_empty());

        let first = s.candidates()[0].id.clone();
        assert!(s.remove_candidate(&first));
        s.clear_all();
        drop(s);
        assert!(!provider.revoked.load(Ordering::SeqCst));
    }

    #[test]
    fn test_remove_candidate_preserves_order_and_revokes() {
        let (mut s, registry) = session("", None, true);
        s.submit_batch(vec![png("a.png", 1), png("b.png", 1), png("c.png", 1)]);
        let middle = s.candidates()[1].id.clone();

        assert!(s.remove_candidate(&middle));

        assert_eq!(names(&s), vec!["a.png", "c.png"]);
        assert_eq!(registry.revoked(), 1);
        assert_eq!(registry.live(), 2);
    }

    #[test]
    fn test_remove_unknown_id_changes_nothing() {
        let (mut s, registry) = session("image/*", None, true);
        s.submit_batch(vec![png("a.png", 1), text("b.txt", 1)]);
        let before = s.snapshot();

        assert!(!s.remove_candidate(&CandidateId::from("missing")));

        let after = s.snapshot();
        assert_eq!(before, after);
        assert_eq!(registry.revoked(), 0);
    }

    #[test]
    fn test_clear_all_revokes_everything_and_keeps_errors() {
        let (mut s, registry) = session("image/*", None, true);
        s.submit_batch(vec![png("a.png", 1), png("b.png", 1), text("c.txt", 1)]);

        s.clear_all();

        assert!(s.candidates().is_empty());
        assert_eq!(registry.minted(), 2);
        assert_eq!(registry.revoked(), 2);
        assert_eq!(registry.live(), 0);
        assert_eq!(s.validation_errors().len(), 1);

        s.clear_all();
        assert_eq!(registry.revoked(), 2);
    }

    #[test]
    fn test_dropping_session_revokes_outstanding_previews() {
        let (mut s, registry) = session("", None, true);
        s.submit_batch(vec![png("a.png", 1), png("b.png", 1)]);

        drop(s);

        assert_eq!(registry.live(), 0);
        assert_eq!(registry.revoked(), 2);
    }

    #[test]
    fn test_take_candidates_transfers_preview_ownership() {
        let (mut s, registry) = session("", None, true);
        s.submit_batch(vec![png("a.png", 1)]);

        let taken = s.take_candidates();
        assert!(s.candidates().is_empty());
        assert_eq!(registry.live(), 1);

        drop(taken);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_drag_sequence_then_drop_stages_file() {
        let (mut s, _registry) = session("image/*", None, false);

        let events = [
            DragEvent::Enter,
            DragEvent::Over,
            DragEvent::Over,
            DragEvent::Leave,
            DragEvent::Enter,
        ];
        for event in events {
            let response = s.handle_drag(event);
            assert!(response.prevent_default);
        }
        assert!(s.is_drag_active());

        s.handle_drag(DragEvent::Drop(vec![png("drop.png", 1)]));

        assert!(!s.is_drag_active());
        assert_eq!(names(&s), vec!["drop.png"]);
    }

    #[test]
    fn test_over_does_not_change_state() {
        let (mut s, _registry) = session("", None, false);
        s.handle_drag(DragEvent::Over);
        assert!(!s.is_drag_active());

        s.handle_drag(DragEvent::Enter);
        s.handle_drag(DragEvent::Over);
        assert!(s.is_drag_active());
    }

    #[test]
    fn test_session_without_provider_stages_images_without_preview() {
        let mut s = UploadSession::new(UploadConfig::default());
        s.submit_batch(vec![png("a.png", 1)]);
        assert_eq!(s.candidates()[0].preview_uri(), None);
    }

    #[test]
    fn test_open_picker_delegates_config() {
        #[derive(Default)]
        struct Recorder(Vec<PickerRequest>);

        impl FilePicker for Recorder {
            fn open(&mut self, request: &PickerRequest) {
                self.0.push(request.clone());
            }
        }

        let (s, _registry) = session("image/*,.pdf", None, true);
        let mut picker = Recorder::default();
        s.open_picker(&mut picker);

        assert_eq!(picker.0.len(), 1);
        assert_eq!(picker.0[0].accept_attribute(), "image/*,.pdf");
        assert!(picker.0[0].multiple);
        assert!(s.candidates().is_empty());
    }

    #[test]
    fn test_snapshot_serializes_for_presentation() {
        let (mut s, _registry) = session("image/*", None, true);
        s.submit_batch(vec![png("a.png", 7), text("b.txt", 1)]);

        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["candidates"][0]["name"], "a.png");
        assert_eq!(json["candidates"][0]["type"], "image/png");
        assert_eq!(json["candidates"][0]["size"], 7);
        let preview = json["candidates"][0]["preview"].as_str().unwrap();
        assert!(preview.starts_with("blob:"));
        assert_eq!(json["is_drag_active"], false);
        assert_eq!(json["validation_errors"].as_array().unwrap().len(), 1);
    }
}
