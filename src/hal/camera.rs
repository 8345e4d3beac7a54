//! Still camera interface and the external-command implementation.
//!
//! [`Camera`] is the interface the pipeline drives.  It mirrors the device
//! lifecycle the orchestrator needs: `start` / `stop` around the process
//! lifetime and hardware resets, `capture_file` per run.
//!
//! [`StillCamera`] is the production implementation.  It shells out to an
//! external still-capture command (`rpicam-still` on the target device) so
//! the sensor driver stays out of this crate entirely.  Capture is atomic
//! from the caller's point of view: either a complete image file exists at
//! the requested path after the call, or an error is returned.
//!
//! [`MockCamera`] (available under `#[cfg(test)]`) records calls and returns
//! scripted results — used by the pipeline tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CameraError
// ---------------------------------------------------------------------------

/// All errors that can arise from the camera subsystem.
#[derive(Debug, Error)]
pub enum CameraError {
    /// `capture_file` was called while the camera was stopped.
    #[error("camera is not started")]
    NotStarted,

    /// The configured capture command is malformed (empty, or missing the
    /// `{path}` placeholder).
    #[error("invalid capture command: {0}")]
    BadCommand(String),

    /// The capture command could not be spawned or its output read.
    #[error("capture command failed to run: {0}")]
    Io(#[from] std::io::Error),

    /// The capture command ran but exited unsuccessfully.
    #[error("capture command exited with {status}: {stderr}")]
    CaptureFailed { status: String, stderr: String },

    /// The capture command reported success but produced no file.
    #[error("no image produced at {0}")]
    MissingOutput(PathBuf),
}

// ---------------------------------------------------------------------------
// Camera trait
// ---------------------------------------------------------------------------

/// Thread-movable interface for the still camera.
///
/// The orchestrator holds the camera behind `Arc<Mutex<dyn Camera>>` and
/// runs every call through `spawn_blocking` — implementations may block.
///
/// # Contract
///
/// - `capture_file` either leaves a complete image at `path` or errors.
/// - `start` on a started camera and `stop` on a stopped camera are no-ops.
pub trait Camera: Send {
    /// Power up the sensor. The caller owns the warm-up delay.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Power down the sensor.
    fn stop(&mut self) -> Result<(), CameraError>;

    /// Capture one frame to `path`.
    fn capture_file(&mut self, path: &Path) -> Result<(), CameraError>;
}

// ---------------------------------------------------------------------------
// StillCamera
// ---------------------------------------------------------------------------

/// Production camera that invokes an external capture command per frame.
///
/// The command template comes from [`CameraConfig::capture_command`] and is
/// split on whitespace; the `{path}` token is replaced with the output file.
///
/// [`CameraConfig::capture_command`]: crate::config::CameraConfig
pub struct StillCamera {
    argv: Vec<String>,
    started: bool,
}

impl StillCamera {
    const PATH_PLACEHOLDER: &'static str = "{path}";

    /// Build a camera from a capture command template.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::BadCommand`] when the template is empty or
    /// does not contain a `{path}` token.
    pub fn new(capture_command: &str) -> Result<Self, CameraError> {
        let argv: Vec<String> = capture_command
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if argv.is_empty() {
            return Err(CameraError::BadCommand("empty command".into()));
        }
        if !argv.iter().any(|a| a.contains(Self::PATH_PLACEHOLDER)) {
            return Err(CameraError::BadCommand(format!(
                "missing {} placeholder",
                Self::PATH_PLACEHOLDER
            )));
        }

        Ok(Self {
            argv,
            started: false,
        })
    }

    fn argv_for(&self, path: &Path) -> Vec<String> {
        let path_str = path.to_string_lossy();
        self.argv
            .iter()
            .map(|a| a.replace(Self::PATH_PLACEHOLDER, &path_str))
            .collect()
    }
}

impl Camera for StillCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.started = false;
        Ok(())
    }

    fn capture_file(&mut self, path: &Path) -> Result<(), CameraError> {
        if !self.started {
            return Err(CameraError::NotStarted);
        }

        let argv = self.argv_for(path);
        log::debug!("camera: running {:?}", argv);

        let output = Command::new(&argv[0]).args(&argv[1..]).output()?;

        if !output.status.success() {
            return Err(CameraError::CaptureFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !path.exists() {
            return Err(CameraError::MissingOutput(path.to_path_buf()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockCamera — test double for pipeline tests
// ---------------------------------------------------------------------------

/// Scriptable camera used by unit tests.
///
/// Records every call so tests can assert the reset protocol ran, and can be
/// told to fail `capture_file`, `stop` or `start`.
#[cfg(test)]
#[derive(Default)]
pub struct MockCamera {
    pub capture_fails: bool,
    pub stop_fails: bool,
    pub start_fails: bool,
    pub captures: u32,
    pub starts: u32,
    pub stops: u32,
}

#[cfg(test)]
impl MockCamera {
    pub fn failing_capture() -> Self {
        Self {
            capture_fails: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Camera for MockCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        self.starts += 1;
        if self.start_fails {
            return Err(CameraError::CaptureFailed {
                status: "start".into(),
                stderr: "simulated start failure".into(),
            });
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.stops += 1;
        if self.stop_fails {
            return Err(CameraError::CaptureFailed {
                status: "stop".into(),
                stderr: "simulated stop failure".into(),
            });
        }
        Ok(())
    }

    fn capture_file(&mut self, path: &Path) -> Result<(), CameraError> {
        self.captures += 1;
        if self.capture_fails {
            return Err(CameraError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated capture I/O error",
            )));
        }
        std::fs::write(path, b"\xFF\xD8fakejpeg\xFF\xD9")?;
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
    fn rejects_empty_command() {
        assert!(matches!(
            StillCamera::new("   "),
            Err(CameraError::BadCommand(_))
        ));
    }

    #[test]
    fn rejects_command_without_path_placeholder() {
        assert!(matches!(
            StillCamera::new("rpicam-still -n"),
            Err(CameraError::BadCommand(_))
        ));
    }

    #[test]
    fn capture_before_start_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let mut cam = StillCamera::new("touch {path}").expect("new");
        let err = cam.capture_file(&dir.path().join("x.jpg")).unwrap_err();
        assert!(matches!(err, CameraError::NotStarted));
    }

    #[test]
    fn capture_runs_the_command() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("frame.jpg");

        let mut cam = StillCamera::new("touch {path}").expect("new");
        cam.start().expect("start");
        cam.capture_file(&path).expect("capture");

        assert!(path.exists());
    }

    #[test]
    fn failing_command_surfaces_stderr() {
        let dir = tempdir().expect("temp dir");
        let mut cam = StillCamera::new("false {path}").expect("new");
        cam.start().expect("start");

        let err = cam.capture_file(&dir.path().join("x.jpg")).unwrap_err();
        assert!(matches!(err, CameraError::CaptureFailed { .. }));
    }

    #[test]
    fn successful_command_with_no_output_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let mut cam = StillCamera::new("true {path}").expect("new");
        cam.start().expect("start");

        let err = cam.capture_file(&dir.path().join("x.jpg")).unwrap_err();
        assert!(matches!(err, CameraError::MissingOutput(_)));
    }

    #[test]
    fn stop_then_capture_is_an_error_again() {
        let dir = tempdir().expect("temp dir");
        let mut cam = StillCamera::new("touch {path}").expect("new");
        cam.start().expect("start");
        cam.stop().expect("stop");

        let err = cam.capture_file(&dir.path().join("x.jpg")).unwrap_err();
        assert!(matches!(err, CameraError::NotStarted));
    }
}
