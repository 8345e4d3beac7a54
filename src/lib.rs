//! Poem camera — a single-button receipt-printer poetry appliance.
//!
//! On a button press the appliance captures a photo, asks a remote vision
//! model for a caption, asks a remote language model for a poem about the
//! scene, prints the poem on a thermal receipt printer, and resets the
//! hardware for the next press.
//!
//! # Modules
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | [`config`]   | Settings (TOML), paths, service credentials             |
//! | [`hal`]      | Still camera and shutter button                         |
//! | [`printer`]  | Receipt printer channel and ESC/POS subset              |
//! | [`vision`]   | Remote caption service client                           |
//! | [`poet`]     | Prompt composition and remote poem service client       |
//! | [`pipeline`] | The orchestrator / state machine tying it all together  |
//! | [`logging`]  | Console + persistent file logging                       |
//!
//! The orchestrator ([`pipeline::Orchestrator`]) is the core: it sequences
//! the stages, converts any stage failure into a `Failed` run outcome, and
//! re-arms the hardware unconditionally after every run so the appliance
//! never gets stuck.

pub mod config;
pub mod hal;
pub mod logging;
pub mod pipeline;
pub mod poet;
pub mod printer;
pub mod vision;
