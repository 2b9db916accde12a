//! `AsciiDoc` documentation maintenance
//!
//! Narrow, independent transforms over a corpus of `AsciiDoc` files: list
//! spacing audits and fixes, test-case table conversion, and requirements
//! traceability matrix maintenance.
//!
//! The transforms in [`domain`] work on text and never touch the filesystem;
//! [`storage`] finds documents and reads and writes them.

pub mod domain;
pub use domain::{
    Config, DesignArtifacts, RequirementId, TableOptions, TestCase, Traceability,
};

/// Corpus discovery and document I/O.
pub mod storage;
pub use storage::{Corpus, CorpusError, Document};
