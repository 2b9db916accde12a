use std::path::{Path, PathBuf};

mod audit;
mod convert;
mod fix;
mod init;
mod rtm;
mod terminal;

use audit::Audit;
use clap::ArgAction;
use convert::Convert;
use fix::Fix;
use init::Init;
use rtm::Rtm;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the documentation project
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Report list items missing the blank line before them
    Audit(Audit),

    /// Insert missing blank lines before lists
    Fix(Fix),

    /// Convert wide test case tables into stacked tables
    Convert(Convert),

    /// Maintain the requirements traceability matrix
    Rtm(Rtm),

    /// Write a default configuration file
    Init(Init),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Audit(command) => command.run(root)?,
            Self::Fix(command) => command.run(root)?,
            Self::Convert(command) => command.run(root)?,
            Self::Rtm(command) => command.run(root)?,
            Self::Init(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// Shortens `path` to be relative to `root` for display.
fn display_path<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["docsmith", "audit", "-vv", "--root", "docs"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("docs"));
        assert!(matches!(cli.command, Command::Audit(_)));
    }

    #[test]
    fn rtm_requires_a_mode() {
        assert!(Cli::try_parse_from(["docsmith", "rtm"]).is_err());
        assert!(Cli::try_parse_from(["docsmith", "rtm", "generate", "--write"]).is_ok());
    }

    #[test]
    fn convert_rejects_output_with_in_place() {
        assert!(
            Cli::try_parse_from(["docsmith", "convert", "a.adoc", "b.adoc", "--in-place"]).is_err()
        );
    }

    #[test]
    fn display_path_strips_root() {
        let root = Path::new("/tmp/project");
        assert_eq!(
            display_path(Path::new("/tmp/project/Documentation/srs.adoc"), root).to_string(),
            "Documentation/srs.adoc"
        );
        assert_eq!(
            display_path(Path::new("other.adoc"), root).to_string(),
            "other.adoc"
        );
    }
}
