//! Domain models and pure transforms for documentation maintenance.
//!
//! Nothing in this module touches the filesystem. Every transform takes the
//! full text of a document and returns a new text (or a lazy report), so each
//! one can be tested without a corpus on disk.

/// Line classification and the cell tokenizer shared by the transforms.
pub mod markup;

/// Missing-blank-line audit for list openers.
pub mod audit;
pub use audit::{ListIssue, audit};

/// Blank-line insertion before list openers.
pub mod fix;
pub use fix::{Fixed, fix_list_spacing};

/// Wide test-case table parsing and conversion to stacked tables.
pub mod test_table;
pub use test_table::{Conversion, TableOptions, TestCase, convert_test_tables};

/// Requirement identifiers and their extraction pattern.
pub mod requirement_id;
pub use requirement_id::{Error as RequirementIdError, RequirementId, RequirementPattern};

/// Requirement-to-test mapping and traceability matrix maintenance.
pub mod traceability;
pub use traceability::{MatrixUpdate, Traceability};

mod design_artifacts;
pub use design_artifacts::{DesignArtifacts, FallbackRule};

mod config;
pub use config::{Config, ConfigError, TraceabilityPaths};
