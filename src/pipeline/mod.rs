//! Pipeline orchestrator module — the core of the appliance.
//!
//! One button press becomes one [`PipelineRun`] through the state machine in
//! [`state`]; the [`Orchestrator`] in [`runner`] sequences the stages, owns
//! the failure policy, and re-arms the hardware after every run.
//!
//! ```text
//! button press (blocking wait)
//!        │
//!        ▼
//! Orchestrator::serve()          ← single logical thread of control
//!        │
//!        ├─ run_once(): Capturing → Captioning → Composing → Printing
//!        │              (first stage failure degrades the run to Failed)
//!        │
//!        └─ reset():    camera cycle + best-effort printer pre-clear
//!                       (unconditional, success or failure alike)
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{
    ApplianceError, Orchestrator, ResetError, SharedCamera, SharedTrigger, StageError,
};
pub use state::{PipelineRun, PipelineState, RunStatus};
