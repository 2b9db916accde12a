use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DesignArtifacts, RequirementPattern, TableOptions};

/// Configuration for documentation maintenance.
///
/// This struct holds settings that control where the corpus lives, how test
/// case tables are recognised, and how the traceability matrix is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Directory searched recursively for documents, relative to the root.
    docs_dir: PathBuf,

    /// File extension of documents, without the leading dot.
    extension: String,

    /// The prefix of test case identifiers.
    ///
    /// For example, 'T' matches `**T-001**` in a wide test case table.
    test_id_prefix: String,

    /// The requirement categories that are recognised.
    ///
    /// This is the first component of a requirement identifier.
    /// For example, 'FR' or 'NFR-SEC'.
    ///
    /// If this is empty, all categories are recognised.
    requirement_prefixes: Vec<String>,

    /// Source and target documents for the traceability matrix.
    pub traceability: TraceabilityPaths,

    /// Design artifact lookup used when generating the matrix.
    pub design_artifacts: DesignArtifacts,
}

/// Documents read and written by the traceability matrix commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceabilityPaths {
    /// The requirements specification.
    #[serde(default = "default_requirements")]
    pub requirements: PathBuf,

    /// The test plan referencing requirements.
    #[serde(default = "default_test_plan")]
    pub test_plan: PathBuf,

    /// The traceability matrix document.
    #[serde(default = "default_matrix")]
    pub matrix: PathBuf,
}

impl Default for TraceabilityPaths {
    fn default() -> Self {
        Self {
            requirements: default_requirements(),
            test_plan: default_test_plan(),
            matrix: default_matrix(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            extension: default_extension(),
            test_id_prefix: default_test_id_prefix(),
            requirement_prefixes: Vec::new(),
            traceability: TraceabilityPaths::default(),
            design_artifacts: DesignArtifacts::default(),
        }
    }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Failed to access config file {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    /// The file is not valid TOML for this configuration.
    #[error("Failed to parse config file {}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// The file name of the configuration, relative to the corpus root.
    pub const FILE_NAME: &'static str = ".docsmith.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Loads the configuration for a corpus root.
    ///
    /// A missing configuration file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(Self::FILE_NAME);
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Returns the documentation directory, relative to the root.
    #[must_use]
    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Returns the document file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the prefix of test case identifiers.
    #[must_use]
    pub fn test_id_prefix(&self) -> &str {
        &self.test_id_prefix
    }

    /// Builds the test case table options for this configuration.
    #[must_use]
    pub fn table_options(&self) -> TableOptions {
        TableOptions::new(&self.test_id_prefix)
    }

    /// Builds the requirement identifier pattern for this configuration.
    #[must_use]
    pub fn requirement_pattern(&self) -> RequirementPattern {
        RequirementPattern::new(self.requirement_prefixes.clone())
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("Documentation")
}

fn default_extension() -> String {
    "adoc".to_string()
}

fn default_test_id_prefix() -> String {
    "T".to_string()
}

fn default_requirements() -> PathBuf {
    PathBuf::from("Documentation/srs.adoc")
}

fn default_test_plan() -> PathBuf {
    PathBuf::from("Documentation/test-plan.adoc")
}

fn default_matrix() -> PathBuf {
    PathBuf::from("Documentation/requirements_traceability_matrix.adoc")
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_docs_dir")]
        docs_dir: PathBuf,

        #[serde(default = "default_extension")]
        extension: String,

        #[serde(default = "default_test_id_prefix")]
        test_id_prefix: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        requirement_prefixes: Vec<String>,

        #[serde(default)]
        traceability: TraceabilityPaths,

        #[serde(default)]
        design_artifacts: DesignArtifacts,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                docs_dir,
                extension,
                test_id_prefix,
                requirement_prefixes,
                traceability,
                design_artifacts,
            } => Self {
                docs_dir,
                extension,
                test_id_prefix,
                requirement_prefixes,
                traceability,
                design_artifacts,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            docs_dir: config.docs_dir,
            extension: config.extension,
            test_id_prefix: config.test_id_prefix,
            requirement_prefixes: config.requirement_prefixes,
            traceability: config.traceability,
            design_artifacts: config.design_artifacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"_version = "1"
docs_dir = "docs"
extension = "asciidoc"
test_id_prefix = "TC"
requirement_prefixes = ["FR", "NFR"]

[traceability]
matrix = "docs/rtm.adoc"

[design_artifacts]
default = "TBD"

[[design_artifacts.fallback]]
prefix = "FR-2.1"
artifact = "Sec 8.1 (HLD)"
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.docs_dir(), Path::new("docs"));
        assert_eq!(config.extension(), "asciidoc");
        assert_eq!(config.test_id_prefix(), "TC");
        let pattern = config.requirement_pattern();
        assert!(pattern.is_category_allowed("NFR"));
        assert!(!pattern.is_category_allowed("DDD"));
        assert_eq!(config.traceability.matrix, Path::new("docs/rtm.adoc"));
        assert_eq!(
            config.traceability.test_plan,
            Path::new("Documentation/test-plan.adoc")
        );
        assert_eq!(config.design_artifacts.default, "TBD");
        assert_eq!(config.design_artifacts.fallback.len(), 1);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io(..)));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nextension = 3\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(..)));
        assert!(error.to_string().starts_with("Failed to parse config file"));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn missing_file_in_root_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(Config::FILE_NAME);

        let config = Config {
            test_id_prefix: "TC".to_string(),
            requirement_prefixes: vec!["FR".to_string()],
            ..Config::default()
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
