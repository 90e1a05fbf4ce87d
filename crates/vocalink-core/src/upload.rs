//! Per-file upload tracker.
//!
//! Each accepted file walks a small state machine:
//!
//! ```text
//! ┌──────────────────┐ progress=100 ┌───────────┐
//! │ Uploading(0..100)│─────────────>│ Processed │
//! └──────────────────┘              └───────────┘
//!          │ upload failure
//!          ▼
//!     ┌─────────┐
//!     │ Errored │
//!     └─────────┘
//! ```
//!
//! Progress is a simulated fixed-step signal advanced by an external
//! per-file timer; the real upload channel is owned by the backend. The
//! tracker itself is pure: the runtime owns the timers and must cancel them
//! on deletion so a late tick can never resurrect a deleted entry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::UploadError;

/// Progress added per simulated upload tick.
pub const PROGRESS_STEP: u8 = 20;

/// Default maximum accepted file size (50 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// One entry in the upload allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypePattern {
    /// Exact MIME type, e.g. `application/pdf`.
    Exact(String),
    /// MIME prefix from a `image/*` style pattern, stored with the
    /// trailing slash (`image/`).
    Prefix(String),
    /// Filename suffix from a `.docx` style pattern.
    Extension(String),
}

impl TypePattern {
    /// Parse an allow-list entry: `type/sub`, `type/*`, or `.ext`.
    pub fn parse(pattern: &str) -> Self {
        if let Some(prefix) = pattern.strip_suffix("/*") {
            Self::Prefix(format!("{prefix}/"))
        } else if pattern.starts_with('.') {
            Self::Extension(pattern.to_lowercase())
        } else {
            Self::Exact(pattern.to_string())
        }
    }

    /// Whether a file's MIME type or name matches this pattern.
    pub fn matches(&self, mime: &str, name: &str) -> bool {
        match self {
            Self::Exact(exact) => mime == exact,
            Self::Prefix(prefix) => mime.starts_with(prefix),
            Self::Extension(ext) => name.to_lowercase().ends_with(ext),
        }
    }
}

/// Validation policy applied to submitted files.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum accepted size in bytes.
    pub max_size: u64,
    /// Accepted type patterns.
    pub allowed_types: Vec<TypePattern>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: ["image/*", "application/pdf", "text/*", ".docx", ".doc"]
                .iter()
                .map(|p| TypePattern::parse(p))
                .collect(),
        }
    }
}

impl UploadPolicy {
    /// Check one descriptor against the policy.
    ///
    /// The error names the specific rule violated: size before type.
    pub fn validate(&self, file: &FileDescriptor) -> Result<(), UploadError> {
        if file.size > self.max_size {
            return Err(UploadError::TooLarge { size: file.size, max: self.max_size });
        }
        if !self.allowed_types.iter().any(|p| p.matches(&file.mime, &file.name)) {
            return Err(UploadError::UnsupportedType { mime: file.mime.clone() });
        }
        Ok(())
    }
}

/// Descriptor for a file handed over by the embedder (drag-drop or picker).
///
/// Byte content never crosses this boundary; analysis is a backend concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Original filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Reported MIME type.
    pub mime: String,
}

/// Lifecycle phase of a tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    /// Upload in progress.
    Uploading {
        /// Percent complete, 0..100, monotonically non-decreasing.
        progress: u8,
    },
    /// Terminal success. Progress is absent once here.
    Processed {
        /// Completion time.
        at: DateTime<Utc>,
        /// Derived analysis text.
        analysis: String,
    },
    /// Terminal failure. Never coexists with `Processed`.
    Errored {
        /// Failure description.
        message: String,
    },
}

/// A tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFile {
    /// Creation-order id: `file-{epoch_millis}-{seq}`.
    pub id: String,
    /// Original filename.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Reported MIME type.
    pub mime: String,
    /// Download URL once the backend exposes one.
    pub url: Option<String>,
    /// Current lifecycle phase.
    pub phase: UploadPhase,
}

impl UploadFile {
    /// True while the upload is in progress.
    pub fn is_uploading(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading { .. })
    }

    /// Percent complete. `None` once a terminal state is reached.
    pub fn progress(&self) -> Option<u8> {
        match self.phase {
            UploadPhase::Uploading { progress } => Some(progress),
            UploadPhase::Processed { .. } | UploadPhase::Errored { .. } => None,
        }
    }
}

/// Result of submitting a batch of descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Ids of admitted files, in submission order. Each needs a progress
    /// timer.
    pub accepted: Vec<String>,
    /// Rejected filenames with the rule each violated. Never added to the
    /// tracker.
    pub rejected: Vec<(String, UploadError)>,
}

/// Outcome of one progress tick for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Progress advanced; more ticks needed.
    Advanced(u8),
    /// The file just reached `Processed`; cancel its timer.
    Completed,
    /// The file is no longer uploading (deleted or already terminal);
    /// cancel its timer and change nothing.
    Gone,
}

/// Tracks every file in the current session.
#[derive(Debug, Clone)]
pub struct UploadTracker {
    policy: UploadPolicy,
    files: Vec<UploadFile>,
    next_seq: u64,
}

impl UploadTracker {
    /// Create an empty tracker with the given policy.
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy, files: Vec::new(), next_seq: 0 }
    }

    /// Validate and admit a batch of descriptors.
    ///
    /// Partial acceptance is expected: each file is judged independently
    /// and rejections are returned as a batch without entering the tracker.
    /// Accepted files start `Uploading` at progress 0.
    pub fn submit(&mut self, batch: Vec<FileDescriptor>, now: DateTime<Utc>) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::default();

        for descriptor in batch {
            match self.policy.validate(&descriptor) {
                Ok(()) => {
                    let id = format!("file-{}-{}", now.timestamp_millis(), self.next_seq);
                    self.next_seq += 1;
                    self.files.push(UploadFile {
                        id: id.clone(),
                        name: descriptor.name,
                        size: descriptor.size,
                        mime: descriptor.mime,
                        url: None,
                        phase: UploadPhase::Uploading { progress: 0 },
                    });
                    outcome.accepted.push(id);
                },
                Err(error) => outcome.rejected.push((descriptor.name, error)),
            }
        }

        outcome
    }

    /// Advance simulated progress for one file by [`PROGRESS_STEP`].
    ///
    /// At 100 the file transitions to `Processed` with derived analysis
    /// text. A tick for a deleted or terminal file changes nothing and
    /// reports [`TickOutcome::Gone`] so the caller cancels the timer.
    pub fn advance(&mut self, id: &str, now: DateTime<Utc>) -> TickOutcome {
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            warn!(file_id = id, "progress tick for untracked file; ignoring");
            return TickOutcome::Gone;
        };

        let UploadPhase::Uploading { progress } = file.phase else {
            warn!(file_id = id, "progress tick for terminal file; ignoring");
            return TickOutcome::Gone;
        };

        let next = progress.saturating_add(PROGRESS_STEP).min(100);
        if next >= 100 {
            file.phase = UploadPhase::Processed {
                at: now,
                analysis: format!(
                    "AI analysis of {}: This file contains valuable information.",
                    file.name
                ),
            };
            TickOutcome::Completed
        } else {
            file.phase = UploadPhase::Uploading { progress: next };
            TickOutcome::Advanced(next)
        }
    }

    /// Mark an uploading file as failed.
    ///
    /// Returns false (and changes nothing) if the file is unknown or
    /// already terminal; a file is never both processed and errored.
    pub fn fail(&mut self, id: &str, message: impl Into<String>) -> bool {
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        if !file.is_uploading() {
            return false;
        }
        file.phase = UploadPhase::Errored { message: message.into() };
        true
    }

    /// Remove a file unconditionally, mid-upload included.
    ///
    /// Returns true if the file was present. The caller must cancel the
    /// file's progress timer alongside.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    /// Analysis text for a processed file.
    ///
    /// Explicitly rejected for files still uploading or errored.
    pub fn analyze(&self, id: &str) -> Result<&str, UploadError> {
        let file = self
            .files
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| UploadError::UnknownFile { id: id.to_string() })?;

        match &file.phase {
            UploadPhase::Processed { analysis, .. } => Ok(analysis),
            UploadPhase::Uploading { .. } | UploadPhase::Errored { .. } => {
                Err(UploadError::NotProcessed { id: id.to_string() })
            },
        }
    }

    /// All tracked files in submission order.
    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    /// Look up one file by id.
    pub fn get(&self, id: &str) -> Option<&UploadFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Number of files in the `Processed` terminal state.
    pub fn processed_count(&self) -> usize {
        self.files.iter().filter(|f| matches!(f.phase, UploadPhase::Processed { .. })).count()
    }

    /// Ids of files still uploading (their timers are live).
    pub fn uploading_ids(&self) -> Vec<String> {
        self.files.iter().filter(|f| f.is_uploading()).map(|f| f.id.clone()).collect()
    }

    /// Drop every file (session teardown).
    pub fn clear(&mut self) {
        self.files.clear();
    }
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new(UploadPolicy::default())
    }
}
