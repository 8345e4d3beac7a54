//! Remote vision / captioning service.
//!
//! * [`CaptionService`] — async trait the pipeline calls with raw JPEG bytes.
//! * [`ApiCaptioner`] — predictions-API client (Replicate-style wire format).
//! * [`CaptionError`] — error variants for caption operations.

pub mod captioner;

pub use captioner::{ApiCaptioner, CaptionError, CaptionService};
