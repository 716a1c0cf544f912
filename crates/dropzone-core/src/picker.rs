//! Native file-picker delegation.

use crate::accept::AcceptRule;

/// What the session asks the host's picker to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRequest {
    pub accept: Vec<AcceptRule>,
    pub multiple: bool,
}

impl PickerRequest {
    /// Accept rules in HTML `accept` attribute form (`"image/*,.pdf"`).
    pub fn accept_attribute(&self) -> String {
        self.accept
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Host capability that presents a native file-selection affordance.
///
/// The selection arrives later through
/// [`UploadSession::submit_batch`](crate::session::UploadSession::submit_batch).
pub trait FilePicker {
    fn open(&mut self, request: &PickerRequest);
}
