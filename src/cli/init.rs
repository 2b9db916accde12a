use std::path::Path;

use anyhow::Context;
use clap::Parser;
use docsmith::Config;
use tracing::instrument;

use super::terminal;

#[derive(Debug, Parser)]
#[command(about = "Write a default configuration file to the project root")]
pub struct Init {}

impl Init {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let path = root.join(Config::FILE_NAME);
        if path.exists() {
            anyhow::bail!(
                "Project already initialized (found existing {})",
                path.display()
            );
        }

        Config::default()
            .save(&path)
            .with_context(|| format!("Failed to create {}", Config::FILE_NAME))?;

        println!(
            "{} {}",
            terminal::outcome("Created"),
            path.display()
        );
        println!();
        println!("Next steps:");
        println!("  docsmith audit");
        println!("  docsmith rtm generate");
        Ok(())
    }
}
