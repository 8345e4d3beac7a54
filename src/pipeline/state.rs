//! Pipeline state machine vocabulary and per-run record.
//!
//! [`PipelineState`] names the phases one run moves through.  The
//! orchestrator drives the transitions; the enum exists so every phase
//! change is logged with a stable label and so the tests can talk about
//! the machine precisely.
//!
//! ```text
//! Idle ──button press──▶ Capturing ──▶ Captioning ──▶ Composing ──▶ Printing
//!                            │             │              │            │
//!                            └──failure────┴──────────────┴────────────┘
//!                                               │
//!                                               ▼
//!                                           Resetting ──always──▶ Idle
//! ```
//!
//! Every path through the machine ends in `Resetting → Idle`, including the
//! failure paths — the appliance must always come back ready for the next
//! press.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Phases of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Waiting for the next button press.
    #[default]
    Idle,
    /// Camera is taking the photo.
    Capturing,
    /// Vision service is describing the photo.
    Captioning,
    /// Composition service is writing the poem.
    Composing,
    /// Poem is going out to the printer.
    Printing,
    /// Hardware is being re-armed for the next press.
    Resetting,
}

impl PipelineState {
    /// A short stable label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Capturing => "capturing",
            PipelineState::Captioning => "captioning",
            PipelineState::Composing => "composing",
            PipelineState::Printing => "printing",
            PipelineState::Resetting => "resetting",
        }
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Terminal outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// One execution of the full capture → caption → compose → print sequence.
///
/// Created when a button press is accepted, logged once finished, then
/// dropped.  The saved photo file is the only artifact that outlives the
/// run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Timestamp-derived identifier, `YYYYMMDD_HHMMSS`.
    pub id: String,
    /// Where the captured photo is (or would have been) saved.
    pub photo_path: PathBuf,
    /// Caption text; absent until the caption stage completes.
    pub caption: Option<String>,
    /// Poem text; absent until the compose stage completes.
    pub poem: Option<String>,
    /// Terminal status. A run starts `Failed` and is promoted on completion.
    pub status: RunStatus,
}

impl PipelineRun {
    /// Begin a run timestamped "now", with its photo path under `image_dir`.
    pub fn begin(image_dir: &Path) -> Self {
        Self::begin_at(image_dir, Local::now())
    }

    /// Begin a run at an explicit timestamp (useful for tests).
    pub fn begin_at(image_dir: &Path, at: DateTime<Local>) -> Self {
        let id = at.format("%Y%m%d_%H%M%S").to_string();
        let photo_path = image_dir.join(format!("captured_image_{id}.jpg"));
        Self {
            id,
            photo_path,
            caption: None,
            poem: None,
            status: RunStatus::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(PipelineState::Capturing.label(), "capturing");
        assert_eq!(PipelineState::Resetting.label(), "resetting");
        assert_eq!(RunStatus::Succeeded.label(), "succeeded");
        assert_eq!(RunStatus::Failed.label(), "failed");
    }

    #[test]
    fn run_id_is_sortable_timestamp() {
        let dir = Path::new("/tmp/images");
        let earlier = Local.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap();
        let later = Local.with_ymd_and_hms(2024, 11, 2, 6, 41, 0).unwrap();

        let a = PipelineRun::begin_at(dir, earlier);
        let b = PipelineRun::begin_at(dir, later);

        assert_eq!(a.id, "20240309_180507");
        assert!(a.id < b.id);
    }

    #[test]
    fn photo_path_uses_run_id() {
        let run = PipelineRun::begin_at(
            Path::new("/home/pi/images"),
            Local.with_ymd_and_hms(2024, 3, 9, 18, 5, 7).unwrap(),
        );
        assert_eq!(
            run.photo_path,
            Path::new("/home/pi/images/captured_image_20240309_180507.jpg")
        );
    }

    #[test]
    fn new_run_has_no_caption_or_poem() {
        let run = PipelineRun::begin(Path::new("/tmp"));
        assert!(run.caption.is_none());
        assert!(run.poem.is_none());
        assert_eq!(run.status, RunStatus::Failed);
    }
}
