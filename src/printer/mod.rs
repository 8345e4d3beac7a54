//! Thermal receipt printer support.
//!
//! * [`protocol`] — the ESC/POS command subset and print-job framing.
//! * [`PrinterChannel`] / [`DevicePrinter`] — the output channel.

pub mod channel;
pub mod protocol;

pub use channel::{DevicePrinter, PrinterChannel, PrinterError};
