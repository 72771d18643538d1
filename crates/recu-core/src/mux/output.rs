//! Output container file: fresh (collision-free) or resumed by append.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::naming::unique_output_path;

/// Failure to produce the output file at all.
#[derive(Debug, thiserror::Error)]
#[error("cannot create output file {path}: {source}")]
pub struct OutputUnavailable {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Output file of one mux run. A fresh file is created on the first write,
/// so a run that fetches nothing leaves nothing behind.
#[derive(Debug)]
pub(crate) struct SegmentOutput {
    dir: PathBuf,
    basename: String,
    extension: String,
    path: PathBuf,
    file: Option<File>,
}

impl SegmentOutput {
    pub fn fresh(dir: &Path, basename: &str, extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            basename: basename.to_string(),
            extension: extension.to_string(),
            path: unique_output_path(dir, basename, extension),
            file: None,
        }
    }

    /// Reopen `<basename>.<ext>` for append. Falls back to a fresh file when
    /// it is missing or cannot be opened.
    pub fn resume(dir: &Path, basename: &str, extension: &str) -> Self {
        let path = dir.join(format!("{}.{}", basename, extension));
        match OpenOptions::new().append(true).open(&path) {
            Ok(file) => Self {
                dir: dir.to_path_buf(),
                basename: basename.to_string(),
                extension: extension.to_string(),
                path,
                file: Some(file),
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "original file not found, creating new file"
                );
                Self::fresh(dir, basename, extension)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Create the file now if it does not exist yet. Another job may grab the
    /// same name between path selection and creation; pick the next free one.
    pub fn ensure_open(&mut self) -> Result<(), OutputUnavailable> {
        if self.file.is_some() {
            return Ok(());
        }
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path)
            {
                Ok(file) => {
                    self.file = Some(file);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    self.path = unique_output_path(&self.dir, &self.basename, &self.extension);
                }
                Err(source) => {
                    return Err(OutputUnavailable {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
    }

    /// Append one segment. Call [`Self::ensure_open`] first.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.write_all(bytes),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "output not open")),
        }
    }
}
