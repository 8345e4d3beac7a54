//! Printer output channel.
//!
//! [`PrinterChannel`] is the interface the pipeline prints through;
//! [`DevicePrinter`] writes to the line-printer device node.  The device is
//! opened per call and closed on every exit path — the channel holds no
//! file handle between jobs, so a failed print never leaves the device
//! wedged open.
//!
//! [`MockPrinter`] (available under `#[cfg(test)]`) captures jobs in memory
//! for the pipeline tests.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use super::protocol;

// ---------------------------------------------------------------------------
// PrinterError
// ---------------------------------------------------------------------------

/// A failed print or pre-clear, carrying the underlying device fault.
///
/// Device absent, permission denied and buffer faults all land here — the
/// pipeline treats them uniformly.
#[derive(Debug, Error)]
#[error("printer device {device}: {source}")]
pub struct PrinterError {
    /// The device path the channel tried to open.
    pub device: String,
    #[source]
    pub source: std::io::Error,
}

// ---------------------------------------------------------------------------
// PrinterChannel trait
// ---------------------------------------------------------------------------

/// Thread-safe printing interface, stateless per call.
pub trait PrinterChannel: Send + Sync {
    /// Print `text` as one framed job (reset, center, payload, feed, cut).
    fn print_text(&self, text: &str) -> Result<(), PrinterError>;

    /// Send only the reset sequence.  Used as the best-effort pre-clear
    /// during hardware reset.
    fn clear(&self) -> Result<(), PrinterError>;
}

// ---------------------------------------------------------------------------
// DevicePrinter
// ---------------------------------------------------------------------------

/// Production channel writing to a byte-oriented printer device node
/// (`/dev/usb/lp0` on the appliance).
pub struct DevicePrinter {
    device: PathBuf,
}

impl DevicePrinter {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Open the device, write `bytes`, flush, close.
    fn write_job(&self, bytes: &[u8]) -> Result<(), PrinterError> {
        let attempt = || -> std::io::Result<()> {
            let mut dev = std::fs::OpenOptions::new().write(true).open(&self.device)?;
            dev.write_all(bytes)?;
            dev.flush()
            // dev drops (closes) here on success and on error alike
        };

        attempt().map_err(|source| PrinterError {
            device: self.device.display().to_string(),
            source,
        })
    }
}

impl PrinterChannel for DevicePrinter {
    fn print_text(&self, text: &str) -> Result<(), PrinterError> {
        self.write_job(&protocol::frame(text))
    }

    fn clear(&self) -> Result<(), PrinterError> {
        self.write_job(protocol::RESET)
    }
}

// ---------------------------------------------------------------------------
// MockPrinter — test double for pipeline tests
// ---------------------------------------------------------------------------

/// Captures print jobs in memory; can be scripted to fail.
#[cfg(test)]
#[derive(Default)]
pub struct MockPrinter {
    pub print_fails: bool,
    pub clear_fails: bool,
    pub jobs: std::sync::Mutex<Vec<String>>,
    pub clears: std::sync::atomic::AtomicU32,
}

#[cfg(test)]
impl MockPrinter {
    fn fail(&self, what: &str) -> PrinterError {
        PrinterError {
            device: "mock".into(),
            source: std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("simulated {what} failure"),
            ),
        }
    }
}

#[cfg(test)]
impl PrinterChannel for MockPrinter {
    fn print_text(&self, text: &str) -> Result<(), PrinterError> {
        if self.print_fails {
            return Err(self.fail("print"));
        }
        self.jobs.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), PrinterError> {
        self.clears
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.clear_fails {
            return Err(self.fail("clear"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn print_writes_framed_job_to_device() {
        let dir = tempdir().expect("temp dir");
        let device = dir.path().join("lp0");
        std::fs::write(&device, b"").expect("create device file");

        let printer = DevicePrinter::new(&device);
        printer.print_text("hi").expect("print");

        let written = std::fs::read(&device).expect("read back");
        assert_eq!(written, protocol::frame("hi"));
    }

    #[test]
    fn clear_writes_only_the_reset_sequence() {
        let dir = tempdir().expect("temp dir");
        let device = dir.path().join("lp0");
        std::fs::write(&device, b"").expect("create device file");

        let printer = DevicePrinter::new(&device);
        printer.clear().expect("clear");

        let written = std::fs::read(&device).expect("read back");
        assert_eq!(written, protocol::RESET);
    }

    #[test]
    fn missing_device_surfaces_printer_error() {
        let dir = tempdir().expect("temp dir");
        let printer = DevicePrinter::new(dir.path().join("absent"));

        let err = printer.print_text("hi").unwrap_err();
        assert!(err.device.contains("absent"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn channel_is_object_safe() {
        let _: Box<dyn PrinterChannel> = Box::new(DevicePrinter::new("/dev/null"));
    }
}
