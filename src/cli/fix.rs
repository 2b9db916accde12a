use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use docsmith::{Document, domain::fix_list_spacing, storage::Corpus};
use tracing::instrument;

use super::{
    display_path,
    terminal::{Tally, hint},
};

#[derive(Debug, Parser)]
#[command(about = "Insert the blank line AsciiDoc needs before a list")]
pub struct Fix {
    /// Show what would be fixed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Fix a single document instead of the whole corpus
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct Totals {
    fixes: usize,
    files_modified: usize,
    failures: usize,
}

impl Fix {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let totals = if let Some(path) = &self.file {
            let document = Document::read(path.as_path())
                .with_context(|| format!("Cannot fix {}", path.display()))?;
            let mut totals = Totals::default();
            self.fix_document(document, &root, &mut totals)?;
            totals
        } else {
            let corpus = Corpus::open(&root)?;
            let paths = corpus.discover();
            println!("Processing {} file(s)...", paths.len());
            println!();
            let totals = self.fix_paths(paths, &root);
            println!();
            totals
        };

        self.print_summary(&totals);
        Ok(())
    }

    /// Fixes every document in `paths`.
    ///
    /// A document that cannot be read or written is logged and counted as a
    /// failure, and the batch carries on.
    fn fix_paths(&self, paths: impl IntoIterator<Item = PathBuf>, root: &Path) -> Totals {
        let mut totals = Totals::default();
        for path in paths {
            let result = Document::read(path)
                .and_then(|document| self.fix_document(document, root, &mut totals));
            if let Err(e) = result {
                tracing::error!("{:#}", anyhow::Error::new(e));
                totals.failures += 1;
            }
        }
        totals
    }

    fn fix_document(
        &self,
        mut document: Document,
        root: &Path,
        totals: &mut Totals,
    ) -> Result<(), docsmith::CorpusError> {
        let fixed = fix_list_spacing(document.text());
        if !fixed.changed() {
            return Ok(());
        }

        let action = if self.dry_run { "Would fix" } else { "Fixed" };
        println!(
            "  {action} {} issue(s) in {}",
            fixed.fixes,
            display_path(document.path(), root)
        );

        if !self.dry_run {
            document.replace(fixed.text)?;
        }
        totals.fixes += fixed.fixes;
        totals.files_modified += 1;
        Ok(())
    }

    fn print_summary(&self, totals: &Totals) {
        if totals.fixes == 0 {
            println!("No list spacing issues to fix ✅");
        } else if self.dry_run {
            println!(
                "DRY RUN: Would fix {} issue(s) in {} file(s)",
                Tally::Found.paint(totals.fixes),
                totals.files_modified
            );
            println!("{}", hint("Run without --dry-run to apply fixes"));
        } else {
            println!(
                "Fixed {} issue(s) in {} file(s)",
                Tally::Done.paint(totals.fixes),
                totals.files_modified
            );
        }

        if totals.failures > 0 {
            println!(
                "Failed to process {} file(s)",
                Tally::Failed.paint(totals.failures)
            );
        }
    }
}
