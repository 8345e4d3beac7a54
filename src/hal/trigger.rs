//! Shutter button sources.
//!
//! [`TriggerSource`] delivers the blocking "wait for press" primitive the
//! orchestrator arms between runs.  Debounce beyond the post-run re-arm
//! delay is the button wiring's problem, not ours.
//!
//! Two implementations:
//! * [`GpioButton`] — sysfs GPIO, production wiring (active-low momentary
//!   button with a pull-up).
//! * [`StdinTrigger`] — a line on stdin counts as a press, for bench runs
//!   without the hardware attached.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// TriggerError
// ---------------------------------------------------------------------------

/// Errors from the shutter button.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The GPIO line could not be exported or read.
    #[error("GPIO access failed: {0}")]
    Io(#[from] std::io::Error),

    /// The input source reached end-of-stream and can deliver no more
    /// presses (stdin closed).
    #[error("trigger source closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// TriggerSource trait
// ---------------------------------------------------------------------------

/// Blocking shutter-press source.
///
/// `wait_for_press` parks the calling thread until the next press.  The
/// orchestrator runs it through `spawn_blocking`, one wait at a time.
pub trait TriggerSource: Send {
    fn wait_for_press(&mut self) -> Result<(), TriggerError>;
}

// ---------------------------------------------------------------------------
// GpioButton
// ---------------------------------------------------------------------------

/// Momentary button on a sysfs GPIO line.
///
/// The line is exported and set to input on construction.  A press is the
/// falling edge of the active-low input: the poll loop waits for the line
/// to read high (released), then for the transition to low.
pub struct GpioButton {
    value_file: PathBuf,
    poll_interval: Duration,
}

impl GpioButton {
    /// Export `line` and prepare it for polling.
    ///
    /// Re-exporting an already exported line is not an error.
    pub fn new(line: u32, poll_interval: Duration) -> Result<Self, TriggerError> {
        let base = PathBuf::from("/sys/class/gpio");
        let line_dir = base.join(format!("gpio{line}"));

        if !line_dir.exists() {
            std::fs::write(base.join("export"), line.to_string())?;
        }
        std::fs::write(line_dir.join("direction"), "in")?;

        Ok(Self {
            value_file: line_dir.join("value"),
            poll_interval,
        })
    }

    fn read_level(&self) -> Result<bool, TriggerError> {
        let raw = std::fs::read_to_string(&self.value_file)?;
        // Active-low: "0" means pressed.
        Ok(raw.trim() == "0")
    }
}

impl TriggerSource for GpioButton {
    fn wait_for_press(&mut self) -> Result<(), TriggerError> {
        // Wait out a press still in progress from before we armed.
        while self.read_level()? {
            std::thread::sleep(self.poll_interval);
        }
        // Now wait for the falling edge.
        while !self.read_level()? {
            std::thread::sleep(self.poll_interval);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StdinTrigger
// ---------------------------------------------------------------------------

/// Bench trigger: every line read from stdin is one press.
#[derive(Default)]
pub struct StdinTrigger;

impl TriggerSource for StdinTrigger {
    fn wait_for_press(&mut self) -> Result<(), TriggerError> {
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Err(TriggerError::Closed);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedTrigger — test double for pipeline tests
// ---------------------------------------------------------------------------

/// A scripted trigger that fires a fixed number of times, then closes.
#[cfg(test)]
pub struct ScriptedTrigger {
    remaining: u32,
}

#[cfg(test)]
impl ScriptedTrigger {
    pub fn presses(n: u32) -> Self {
        Self { remaining: n }
    }
}

#[cfg(test)]
impl TriggerSource for ScriptedTrigger {
    fn wait_for_press(&mut self) -> Result<(), TriggerError> {
        if self.remaining == 0 {
            return Err(TriggerError::Closed);
        }
        self.remaining -= 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_trigger_fires_then_closes() {
        let mut t = ScriptedTrigger::presses(2);
        assert!(t.wait_for_press().is_ok());
        assert!(t.wait_for_press().is_ok());
        assert!(matches!(t.wait_for_press(), Err(TriggerError::Closed)));
    }

    #[test]
    fn trigger_source_is_object_safe() {
        let _: Box<dyn TriggerSource> = Box::new(ScriptedTrigger::presses(0));
    }
}
