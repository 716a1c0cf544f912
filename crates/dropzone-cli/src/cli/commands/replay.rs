//! `dropzone replay`: drives a session from a scripted event log.
//!
//! Script format (JSON):
//!
//! ```json
//! {
//!   "config": { "accept": ["image/*"], "max_size": 2000000, "multiple": true },
//!   "events": [
//!     { "kind": "enter" },
//!     { "kind": "drop", "files": [{ "name": "a.png", "size": 10, "type": "image/png" }] },
//!     { "kind": "remove", "index": 0 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dropzone_core::{
    BlobRegistry, DragEvent, FileMeta, FilePicker, PickerRequest, PreviewProvider, UploadConfig,
    UploadSession,
};
use serde::Deserialize;

use super::output::Report;

#[derive(Debug, Deserialize)]
pub struct Script {
    /// Replaces the config file's `[upload]` table when present.
    #[serde(default)]
    pub config: Option<UploadConfig>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Enter,
    Over,
    Leave,
    Drop { files: Vec<FileMeta> },
    /// A file-picker selection.
    Select { files: Vec<FileMeta> },
    /// Removes the candidate at this position; out of range is a no-op.
    Remove { index: usize },
    Clear,
    OpenPicker,
}

/// Picker that only records that it was asked to open.
#[derive(Default)]
struct ScriptPicker {
    opened: usize,
}

impl FilePicker for ScriptPicker {
    fn open(&mut self, request: &PickerRequest) {
        self.opened += 1;
        tracing::info!(
            accept = %request.accept_attribute(),
            multiple = request.multiple,
            "file picker opened"
        );
    }
}

pub fn load(path: &Path) -> Result<Script> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script {}", path.display()))
}

pub fn run(script: Script, upload: UploadConfig, json: bool) -> Result<()> {
    let registry = Arc::new(BlobRegistry::new());
    let provider: Arc<dyn PreviewProvider> = Arc::clone(&registry) as _;
    let mut session = UploadSession::with_previews(upload, provider);
    let mut picker = ScriptPicker::default();

    for (step, event) in script.events.into_iter().enumerate() {
        tracing::debug!(step, ?event, "replay event");
        apply(&mut session, &mut picker, event);
    }

    Report::new(&session, &registry).print(json)?;
    if !json && picker.opened > 0 {
        println!("Picker opened {} time(s)", picker.opened);
    }
    Ok(())
}

fn apply(session: &mut UploadSession<FileMeta>, picker: &mut ScriptPicker, event: ScriptEvent) {
    match event {
        ScriptEvent::Enter => {
            session.handle_drag(DragEvent::Enter);
        }
        ScriptEvent::Over => {
            session.handle_drag(DragEvent::Over);
        }
        ScriptEvent::Leave => {
            session.handle_drag(DragEvent::Leave);
        }
        ScriptEvent::Drop { files } => {
            session.handle_drag(DragEvent::Drop(files));
        }
        ScriptEvent::Select { files } => {
            session.submit_batch(files);
        }
        ScriptEvent::Remove { index } => {
            let Some(id) = session.candidates().get(index).map(|c| c.id.clone()) else {
                tracing::debug!(index, "remove index out of range");
                return;
            };
            session.remove_candidate(&id);
        }
        ScriptEvent::Clear => session.clear_all(),
        ScriptEvent::OpenPicker => session.open_picker(picker),
    }
}
