//! Core dropzone library (upload session, validation, previews, config).

pub mod accept;
pub mod config;
pub mod drag;
pub mod file;
pub mod picker;
pub mod preview;
pub mod session;
pub mod validate;

pub use accept::{AcceptRule, AcceptRuleError};
pub use config::{Config, UploadConfig};
pub use drag::{DragEvent, DragResponse, DragState};
pub use file::{FileMeta, HostFile, LocalFile};
pub use picker::{FilePicker, PickerRequest};
pub use preview::{BlobRegistry, PreviewHandle, PreviewProvider};
pub use session::{
    BatchOutcome, CandidateId, CandidateView, Rejection, SessionSnapshot, UploadCandidate,
    UploadSession,
};
pub use validate::{ValidationError, validate};
