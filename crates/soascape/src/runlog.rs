//! Append-only diagnostic log for one reporting run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::SoascapeError;

/// Run-scoped diagnostic log. One writer, append-only; the file is flushed
/// and closed when the log is dropped, on every exit path of a run.
///
/// A run can also operate with a disabled log (when the log file could not
/// be created): entries are still counted but go nowhere.
#[derive(Debug)]
pub struct RunLog {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    entries: usize,
}

impl RunLog {
    /// Creates `<prefix><timestamp>.txt` inside `dir` and writes the opening
    /// line.
    pub fn create(dir: &Path, prefix: &str) -> Result<Self, SoascapeError> {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let path = dir.join(format!("{prefix}{stamp}.txt"));
        let file = File::create(&path).map_err(|err| {
            SoascapeError::Setup(format!(
                "could not create the log file in {}: {err}",
                dir.display()
            ))
        })?;
        let mut writer = BufWriter::new(file);
        let _ = writeln!(writer, "Log open {}", Local::now().format("%H:%M:%S"));
        Ok(Self {
            path: Some(path),
            writer: Some(writer),
            entries: 0,
        })
    }

    /// A log that records nothing. Used when log creation failed; the run
    /// itself must not be aborted by a missing log.
    pub fn disabled() -> Self {
        Self {
            path: None,
            writer: None,
            entries: 0,
        }
    }

    /// Appends one diagnostic line. Write failures are swallowed: logging
    /// must never fail a run.
    pub fn error(&mut self, line: impl AsRef<str>) {
        self.entries += 1;
        if let Some(writer) = self.writer.as_mut() {
            let _ = writeln!(writer, "{}", line.as_ref());
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> usize {
        self.entries
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
