//! Error types for the session state layer.
//!
//! Strongly-typed errors for the upload tracker: validation rejections
//! (size, type) and operations against unknown or not-yet-processed files.
//!
//! Transport failures deliberately have no error type here; they are
//! converted to local state (`Status::Error`, per-file `Errored`) by the
//! session reducer rather than propagated.

use thiserror::Error;

/// Errors from upload submission and tracker operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// File exceeds the configured size limit
    #[error("file size {size} exceeds {max} byte limit")]
    TooLarge {
        /// Size of the rejected file in bytes
        size: u64,
        /// Configured maximum in bytes
        max: u64,
    },

    /// File matches no pattern in the allow-list
    #[error("file type {mime:?} not supported")]
    UnsupportedType {
        /// MIME type of the rejected file
        mime: String,
    },

    /// Operation referenced a file id not in the tracker
    #[error("unknown file id {id:?}")]
    UnknownFile {
        /// The id that was looked up
        id: String,
    },

    /// Analysis requested for a file that has not finished processing
    #[error("file {id:?} is not processed; analysis unavailable")]
    NotProcessed {
        /// The id of the non-terminal or errored file
        id: String,
    },
}

impl UploadError {
    /// Returns true if this error is a submission-time validation rejection.
    ///
    /// Validation rejections are reported to the user as a batch and the
    /// file never enters the tracker. The other variants indicate a caller
    /// racing against deletion or terminal-state transitions.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::UnsupportedType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_type_rejections_are_validation() {
        assert!(UploadError::TooLarge { size: 10, max: 5 }.is_validation());
        assert!(UploadError::UnsupportedType { mime: "application/zip".into() }.is_validation());
    }

    #[test]
    fn tracker_lookups_are_not_validation() {
        assert!(!UploadError::UnknownFile { id: "file-1-0".into() }.is_validation());
        assert!(!UploadError::NotProcessed { id: "file-1-0".into() }.is_validation());
    }

    #[test]
    fn messages_name_the_violated_rule() {
        let size = UploadError::TooLarge { size: 10_485_760, max: 5_242_880 }.to_string();
        assert!(size.contains("size"), "size rejection should name the size rule: {size}");

        let kind = UploadError::UnsupportedType { mime: "application/pdf".into() }.to_string();
        assert!(kind.contains("type"), "type rejection should name the type rule: {kind}");
    }
}
