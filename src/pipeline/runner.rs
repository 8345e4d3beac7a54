//! Pipeline orchestrator — drives the button → capture → caption → compose
//! → print loop, and re-arms the hardware after every run.
//!
//! # Control flow
//!
//! ```text
//! serve():
//!   loop {
//!     wait_for_press (blocking, spawn_blocking)   ← at most one run in flight
//!     run_once():
//!       Capturing  → camera.capture_file          ─┐ any stage failure:
//!       Captioning → caption service              ─┤ caught, logged,
//!       Composing  → prompt + poem service        ─┤ run degraded to Failed,
//!       Printing   → printer.print_text           ─┘ later stages skipped
//!     reset():                                     ← unconditional
//!       printer pre-clear  (best effort, failure swallowed)
//!       camera stop → pause → start → warm-up     (failure → ResetError)
//!   }
//! ```
//!
//! The central correctness property: the loop re-enters the trigger wait
//! after every run, whatever failed.  No error from inside a run ever
//! escapes `run_once`, and `reset` failures only terminate the process
//! after `max_reset_failures` consecutive occurrences.
//!
//! Blocking hardware work (camera, printer, button) goes through
//! `tokio::task::spawn_blocking`; the remote service calls are awaited
//! `reqwest` futures with per-request timeouts.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::config::AppConfig;
use crate::hal::{Camera, CameraError, TriggerError, TriggerSource};
use crate::poet::{PoemError, PoemService, PromptContext};
use crate::printer::{PrinterChannel, PrinterError};
use crate::vision::{CaptionError, CaptionService};

use super::state::{PipelineRun, PipelineState, RunStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure inside one run's stages.
///
/// Never escapes the orchestrator: `run_once` converts it into a `Failed`
/// run outcome and a log line with stage context.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("photo capture failed: {0}")]
    Capture(#[from] CameraError),

    #[error("captured photo could not be read back: {0}")]
    PhotoRead(std::io::Error),

    #[error("caption service failed: {0}")]
    Caption(#[from] CaptionError),

    #[error("composition service failed: {0}")]
    Compose(#[from] PoemError),

    #[error("print failed: {0}")]
    Print(#[from] PrinterError),

    /// A blocking task could not be joined (panic in hardware code).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StageError {
    /// The stage this failure belongs to, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Capture(_) => "capture",
            StageError::PhotoRead(_) | StageError::Caption(_) => "caption",
            StageError::Compose(_) => "compose",
            StageError::Print(_) => "print",
            StageError::Internal(_) => "internal",
        }
    }
}

/// A failure of the camera stop/restart during [`Orchestrator::reset`].
///
/// The printer pre-clear is not represented here — its failure is logged
/// and swallowed inside `reset` itself.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("camera reset failed: {0}")]
    Camera(#[from] CameraError),

    #[error("internal error during reset: {0}")]
    Internal(String),
}

/// Fatal conditions that end [`Orchestrator::serve`].
#[derive(Debug, Error)]
pub enum ApplianceError {
    /// The camera failed to come back through this many consecutive resets;
    /// the appliance is presumed wedged and exits rather than failing every
    /// future run silently.
    #[error("camera failed {0} consecutive hardware resets")]
    CameraUnrecoverable(u32),

    #[error("trigger source failed: {0}")]
    Trigger(#[from] TriggerError),

    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Shared hardware handles
// ---------------------------------------------------------------------------

/// Camera handle shared between the orchestrator's blocking tasks.
pub type SharedCamera = Arc<Mutex<dyn Camera>>;

/// Trigger handle; locked only inside the single in-flight wait.
pub type SharedTrigger = Arc<Mutex<dyn TriggerSource>>;

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owns the hardware handles and the service clients for the lifetime of
/// the process, and runs one pipeline at a time against them.
///
/// There is exactly one logical thread of control: `serve` does not re-arm
/// the trigger until the previous run's reset has completed, which is what
/// enforces at-most-one-active-run — no guard flag needed.
pub struct Orchestrator {
    camera: SharedCamera,
    printer: Arc<dyn PrinterChannel>,
    captioner: Arc<dyn CaptionService>,
    poet: Arc<dyn PoemService>,
    trigger: SharedTrigger,
    config: AppConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the process-wide hardware handles.
    ///
    /// # Arguments
    ///
    /// * `camera`    — still camera, already started and warmed up.
    /// * `printer`   — printer output channel.
    /// * `captioner` — remote vision service client.
    /// * `poet`      — remote composition service client.
    /// * `trigger`   — shutter button.
    pub fn new(
        camera: SharedCamera,
        printer: Arc<dyn PrinterChannel>,
        captioner: Arc<dyn CaptionService>,
        poet: Arc<dyn PoemService>,
        trigger: SharedTrigger,
        config: AppConfig,
    ) -> Self {
        Self {
            camera,
            printer,
            captioner,
            poet,
            trigger,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Main serve loop
    // -----------------------------------------------------------------------

    /// Serve button presses until the trigger source closes or the appliance
    /// becomes unrecoverable.
    ///
    /// Spawn on the runtime from `main()`; race it against the shutdown
    /// signal with `tokio::select!`.
    pub async fn serve(&self) -> Result<(), ApplianceError> {
        let mut reset_failures: u32 = 0;
        let rearm_delay = Duration::from_secs_f64(self.config.trigger.rearm_delay_secs);

        loop {
            log::info!("waiting for button press...");

            let trigger = Arc::clone(&self.trigger);
            let wait = tokio::task::spawn_blocking(move || trigger.lock().unwrap().wait_for_press())
                .await
                .map_err(|e| ApplianceError::Internal(e.to_string()))?;

            match wait {
                Ok(()) => {}
                Err(TriggerError::Closed) => {
                    log::info!("trigger source closed; serve loop ending");
                    return Ok(());
                }
                Err(e) => return Err(ApplianceError::Trigger(e)),
            }

            log::info!("button pressed; starting pipeline run");
            let run = self.run_once().await;
            log::info!("run {} finished: {}", run.id, run.status.label());

            // Unconditional hardware re-arm — runs for Succeeded and Failed
            // alike, and its own failure must not take the loop down short
            // of the consecutive-failure bound.
            match self.reset().await {
                Ok(()) => {
                    reset_failures = 0;
                    log::info!("hardware reset completed; ready for next press");
                }
                Err(e) => {
                    reset_failures += 1;
                    log::error!(
                        "hardware reset failed ({reset_failures} consecutive), \
                         appliance may be degraded: {e}"
                    );
                    if reset_failures >= self.config.pipeline.max_reset_failures {
                        return Err(ApplianceError::CameraUnrecoverable(reset_failures));
                    }
                }
            }

            // Settle before re-arming: absorbs switch bounce from the press
            // that started this run.
            tokio::time::sleep(rearm_delay).await;
        }
    }

    // -----------------------------------------------------------------------
    // One run
    // -----------------------------------------------------------------------

    /// Execute one full pipeline run.
    ///
    /// Never returns an error: any stage failure is caught here, logged with
    /// its stage, and recorded as a `Failed` outcome on the returned run.
    pub async fn run_once(&self) -> PipelineRun {
        let image_dir = std::path::Path::new(&self.config.storage.image_dir);
        let mut run = PipelineRun::begin(image_dir);

        match self.execute(&mut run).await {
            Ok(()) => {
                run.status = RunStatus::Succeeded;
                log::info!("run {}: poem printed", run.id);
            }
            Err(e) => {
                run.status = RunStatus::Failed;
                log::error!("run {}: {} stage failed: {e}", run.id, e.stage());
            }
        }

        run
    }

    /// The stage sequence proper.  First failure wins; later stages are
    /// never invoked after one.
    async fn execute(&self, run: &mut PipelineRun) -> Result<(), StageError> {
        // ── Capturing ────────────────────────────────────────────────────
        self.enter(run, PipelineState::Capturing);

        let camera = Arc::clone(&self.camera);
        let photo_path = run.photo_path.clone();
        tokio::task::spawn_blocking(move || camera.lock().unwrap().capture_file(&photo_path))
            .await
            .map_err(|e| StageError::Internal(e.to_string()))??;
        log::info!("run {}: photo saved to {}", run.id, run.photo_path.display());

        // ── Captioning ───────────────────────────────────────────────────
        self.enter(run, PipelineState::Captioning);

        let image = tokio::fs::read(&run.photo_path)
            .await
            .map_err(StageError::PhotoRead)?;
        let caption = self.captioner.caption(&image).await?;
        log::info!("run {}: caption = {caption:?}", run.id);
        run.caption = Some(caption.clone());

        // ── Composing ────────────────────────────────────────────────────
        self.enter(run, PipelineState::Composing);

        let ctx = PromptContext::for_caption(&caption);
        let poem = self.poet.compose_poem(&ctx).await?;
        log::info!("run {}: poem composed ({} chars)", run.id, poem.len());
        run.poem = Some(poem.clone());

        // ── Printing ─────────────────────────────────────────────────────
        self.enter(run, PipelineState::Printing);

        // Leading/trailing blank lines give the operator a tear-off margin.
        let receipt = format!("\n{poem}\n");
        let printer = Arc::clone(&self.printer);
        tokio::task::spawn_blocking(move || printer.print_text(&receipt))
            .await
            .map_err(|e| StageError::Internal(e.to_string()))??;

        Ok(())
    }

    fn enter(&self, run: &PipelineRun, state: PipelineState) {
        log::debug!("run {}: → {}", run.id, state.label());
    }

    // -----------------------------------------------------------------------
    // Hardware reset
    // -----------------------------------------------------------------------

    /// Re-arm the hardware for the next press.
    ///
    /// Camera: stop, pause, restart, warm-up — a failure here is returned as
    /// [`ResetError`] for the serve loop to count.
    ///
    /// Printer: reissue the reset sequence as a best-effort pre-clear —
    /// its failure is logged at `warn` and swallowed, because an unclearable
    /// printer must not stop the appliance from accepting the next press.
    pub async fn reset(&self) -> Result<(), ResetError> {
        log::debug!("hardware: → {}", PipelineState::Resetting.label());

        let restart_pause = Duration::from_secs_f64(self.config.camera.restart_pause_secs);
        let warmup = Duration::from_secs_f64(self.config.camera.warmup_secs);

        // Camera stop → pause → start → warm-up.
        let camera = Arc::clone(&self.camera);
        tokio::task::spawn_blocking(move || camera.lock().unwrap().stop())
            .await
            .map_err(|e| ResetError::Internal(e.to_string()))??;

        tokio::time::sleep(restart_pause).await;

        let camera = Arc::clone(&self.camera);
        tokio::task::spawn_blocking(move || camera.lock().unwrap().start())
            .await
            .map_err(|e| ResetError::Internal(e.to_string()))??;

        tokio::time::sleep(warmup).await;

        // Best-effort printer pre-clear.
        let printer = Arc::clone(&self.printer);
        match tokio::task::spawn_blocking(move || printer.clear()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("printer pre-clear failed (ignored): {e}"),
            Err(e) => log::warn!("printer pre-clear task failed (ignored): {e}"),
        }

        log::debug!("hardware: → {}", PipelineState::Idle.label());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Best-effort camera stop for process shutdown (operator interrupt).
    pub async fn shutdown(&self) {
        let camera = Arc::clone(&self.camera);
        match tokio::task::spawn_blocking(move || camera.lock().unwrap().stop()).await {
            Ok(Ok(())) => log::info!("camera stopped"),
            Ok(Err(e)) => log::warn!("camera stop failed during shutdown: {e}"),
            Err(e) => log::warn!("camera stop task failed during shutdown: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
