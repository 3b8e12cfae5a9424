//! Saving finished reports.
//!
//! A [`DownloadSink`] takes a named, typed blob of bytes and makes it
//! available to the user. [`DirectorySink`] writes into a directory through a
//! temporary file that is removed on every failure path; [`MemorySink`] keeps
//! artifacts in memory for in-process callers.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ReportError, Result};

pub const PDF_MIME: &str = "application/pdf";
pub const CSV_MIME: &str = "text/csv;charset=utf-8";
pub const JSON_MIME: &str = "application/json";

/// A rendered report ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: String, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

/// Where a saved artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    /// `None` for sinks that do not touch the filesystem
    pub path: Option<PathBuf>,
    pub size_bytes: usize,
}

pub trait DownloadSink {
    fn save(&self, artifact: &Artifact) -> Result<SavedFile>;
}

impl<S: DownloadSink + ?Sized> DownloadSink for &S {
    fn save(&self, artifact: &Artifact) -> Result<SavedFile> {
        (**self).save(artifact)
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, artifact: &Artifact) -> io::Result<PathBuf> {
        check_filename(&artifact.filename)?;
        std::fs::create_dir_all(&self.dir)?;

        // The temp file lives next to the target so the final rename stays on
        // one filesystem. Dropping it on an early return deletes it.
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&artifact.bytes)?;
        temp.flush()?;

        let target = self.dir.join(&artifact.filename);
        temp.persist(&target).map_err(|e| e.error)?;
        Ok(target)
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, artifact: &Artifact) -> Result<SavedFile> {
        let path = self.write(artifact).map_err(|source| ReportError::Download {
            filename: artifact.filename.clone(),
            source,
        })?;

        log::debug!(
            "Wrote {} ({} bytes, {})",
            path.display(),
            artifact.bytes.len(),
            artifact.mime_type
        );

        Ok(SavedFile {
            filename: artifact.filename.clone(),
            path: Some(path),
            size_bytes: artifact.bytes.len(),
        })
    }
}

/// Rejects names that would escape the target directory.
fn check_filename(filename: &str) -> io::Result<()> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid file name: {:?}", filename),
        ));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemorySink {
    files: RefCell<Vec<Artifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<Artifact> {
        self.files.borrow().clone()
    }

    pub fn take(&self) -> Vec<Artifact> {
        self.files.take()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, artifact: &Artifact) -> Result<SavedFile> {
        self.files.borrow_mut().push(artifact.clone());
        Ok(SavedFile {
            filename: artifact.filename.clone(),
            path: None,
            size_bytes: artifact.bytes.len(),
        })
    }
}
