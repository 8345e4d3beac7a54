//! Logging setup: console plus a persistent log file.
//!
//! The appliance is headless — besides the receipt itself, the log is the
//! operator's only feedback — so every record goes both to stderr and to an
//! append-mode file.  Built on `env_logger` with a tee writer; when the log
//! file cannot be opened the appliance degrades to console-only rather than
//! refusing to start.

use std::io::Write;
use std::path::Path;

// ---------------------------------------------------------------------------
// Tee
// ---------------------------------------------------------------------------

/// Writer that duplicates every record to stderr and the log file.
struct Tee {
    file: std::fs::File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

/// Initialise global logging with the default filter `info`.
///
/// Records are mirrored to `log_file` (append mode, created if absent).
/// If the file cannot be opened, a warning goes to stderr and logging
/// continues console-only.
pub fn init(log_file: &Path) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
        }
        Err(e) => {
            eprintln!(
                "warning: could not open log file {} ({e}); logging to console only",
                log_file.display()
            );
        }
    }

    builder.init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tee_writes_to_the_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("poem-camera.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .expect("open");

        let mut tee = Tee { file };
        tee.write_all(b"hello log\n").expect("write");
        tee.flush().expect("flush");

        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "hello log\n");
    }

    #[test]
    fn tee_appends_across_writers() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("poem-camera.log");

        for line in ["first\n", "second\n"] {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .expect("open");
            let mut tee = Tee { file };
            tee.write_all(line.as_bytes()).expect("write");
        }

        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "first\nsecond\n");
    }
}
