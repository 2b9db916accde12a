//! A filesystem backed corpus of `AsciiDoc` documents
//!
//! The [`Corpus`] knows where documents live under a root directory. Each
//! [`Document`] is read in full, transformed in memory, and written back
//! only when its text changed.

use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::domain::{Config, ConfigError};

/// Errors that can occur when reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// A document could not be read.
    #[error("Failed to read {}", .0.display())]
    Read(PathBuf, #[source] io::Error),

    /// A document could not be written.
    #[error("Failed to write {}", .0.display())]
    Write(PathBuf, #[source] io::Error),
}

/// A document file and its full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    text: String,
}

impl Document {
    /// Reads the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::Read`] if the file cannot be read as UTF-8
    /// text.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| CorpusError::Read(path.clone(), e))?;
        Ok(Self { path, text })
    }

    /// The path the document was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The full text of the document.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Writes `text` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::Write`] if the file cannot be written.
    pub fn write_to(path: &Path, text: &str) -> Result<(), CorpusError> {
        std::fs::write(path, text).map_err(|e| CorpusError::Write(path.to_path_buf(), e))?;
        tracing::info!("Wrote {}", path.display());
        Ok(())
    }

    /// Replaces the document text and writes it back to its path.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::Write`] if the file cannot be written.
    pub fn replace(&mut self, text: String) -> Result<(), CorpusError> {
        Self::write_to(&self.path, &text)?;
        self.text = text;
        Ok(())
    }
}

/// A documentation corpus rooted at a directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    config: Config,
}

impl Corpus {
    /// Opens the corpus at `root`, loading its configuration file if one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but is invalid.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = Config::load_or_default(&root)?;
        Ok(Self { root, config })
    }

    /// The corpus root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The corpus configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves a configured path against the root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Lists every document under the documentation directory, in sorted
    /// path order.
    ///
    /// Unreadable directory entries are skipped with a debug log.
    #[must_use]
    pub fn discover(&self) -> Vec<PathBuf> {
        let docs_dir = self.resolve(self.config.docs_dir());
        let extension = OsStr::new(self.config.extension());

        let mut paths: Vec<PathBuf> = WalkDir::new(&docs_dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension() == Some(extension))
            .map(walkdir::DirEntry::into_path)
            .collect();
        paths.sort();

        tracing::debug!(
            "Discovered {} document(s) under {}",
            paths.len(),
            docs_dir.display()
        );
        paths
    }
}
