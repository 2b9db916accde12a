use std::{ffi::OsString, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use docsmith::{Document, domain::convert_test_tables, storage::Corpus};
use tracing::instrument;

use super::terminal::{Tally, hint};

#[derive(Debug, Parser)]
#[command(about = "Convert wide test case tables into one stacked table per test case")]
pub struct Convert {
    /// The document to convert
    input: PathBuf,

    /// Where to write the converted document (defaults to INPUT.new)
    #[arg(conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the input document
    #[arg(long)]
    in_place: bool,

    /// Report what would be converted without writing anything
    #[arg(long)]
    dry_run: bool,
}

impl Convert {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let corpus = Corpus::open(&root)?;
        let options = corpus.config().table_options();

        let document = Document::read(self.input.as_path())
            .with_context(|| format!("Cannot convert {}", self.input.display()))?;
        let conversion = convert_test_tables(document.text(), &options);

        if conversion.tables == 0 {
            println!(
                "{}",
                hint(format!("No test case tables found in {}", self.input.display()))
            );
        } else {
            println!(
                "Found {} table(s) with {} test case(s) in {}",
                Tally::Done.paint(conversion.tables),
                conversion.test_cases.len(),
                self.input.display()
            );
        }

        if self.dry_run {
            for case in &conversion.test_cases {
                println!("  {} {}", case.id(), hint(case.requirement()));
            }
            return Ok(());
        }

        let output = self.output_path();
        Document::write_to(&output, &conversion.text)?;
        println!("✓ Output: {}", output.display());

        if !self.in_place {
            println!();
            println!("Review the output. If correct, replace the original:");
            println!("  mv {} {}", output.display(), self.input.display());
        }
        Ok(())
    }

    fn output_path(&self) -> PathBuf {
        if self.in_place {
            return self.input.clone();
        }
        self.output.clone().unwrap_or_else(|| {
            let mut name = OsString::from(self.input.as_os_str());
            name.push(".new");
            PathBuf::from(name)
        })
    }
}
