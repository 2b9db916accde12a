use std::path::{Path, PathBuf};

use clap::Parser;
use docsmith::{
    Document,
    domain::{ListIssue, audit},
    storage::Corpus,
};
use tracing::instrument;

use super::{
    display_path,
    terminal::{Tally, hint},
};

#[derive(Debug, Parser)]
#[command(about = "Report list items that are missing the blank line before them")]
pub struct Audit {
    /// Documents to audit (defaults to every document in the corpus)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Maximum number of issues listed per file
    #[arg(long, value_name = "N", default_value_t = 5)]
    limit: usize,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[derive(Debug)]
struct FileReport {
    path: PathBuf,
    issues: Vec<ListIssue>,
}

impl Audit {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let corpus = Corpus::open(&root)?;
        let paths = if self.paths.is_empty() {
            corpus.discover()
        } else {
            self.paths.clone()
        };

        let (reports, unreadable) = audit_paths(paths);

        let flagged: Vec<&FileReport> = reports.iter().filter(|r| !r.issues.is_empty()).collect();
        let total: usize = flagged.iter().map(|r| r.issues.len()).sum();

        match self.output {
            OutputFormat::Json => Self::output_json(&reports, flagged.len(), total, &root)?,
            OutputFormat::Summary => Self::output_summary(&flagged, total, &root),
            OutputFormat::Table => self.output_table(&flagged, total, unreadable, &root),
        }

        Ok(())
    }

    fn output_json(
        reports: &[FileReport],
        files_with_issues: usize,
        total: usize,
        root: &Path,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let files: Vec<_> = reports
            .iter()
            .map(|report| {
                json!({
                    "path": display_path(&report.path, root).to_string(),
                    "issues": report.issues,
                })
            })
            .collect();

        let output = json!({
            "files": files,
            "files_with_issues": files_with_issues,
            "total_issues": total,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(flagged: &[&FileReport], total: usize, root: &Path) {
        for report in flagged {
            println!(
                "{}\t{}",
                report.issues.len(),
                display_path(&report.path, root)
            );
        }
        println!("files={} issues={total}", flagged.len());
    }

    fn output_table(
        &self,
        flagged: &[&FileReport],
        total: usize,
        unreadable: usize,
        root: &Path,
    ) {
        for report in flagged {
            println!(
                "{}: {} issue(s)",
                display_path(&report.path, root),
                Tally::Found.paint(report.issues.len())
            );
            for issue in report.issues.iter().take(self.limit) {
                println!(
                    "  Line {}: {} list after '{}'",
                    issue.line, issue.kind, issue.context
                );
            }
            if report.issues.len() > self.limit {
                println!(
                    "  {}",
                    hint(format!("... and {} more", report.issues.len() - self.limit))
                );
            }
            println!();
        }

        println!("Summary");
        println!("{}", hint("───────"));
        println!("Files with issues: {}", flagged.len());
        if total == 0 {
            println!("Total issues: 0 ✅");
        } else {
            println!("Total issues: {} ⚠️", Tally::Found.paint(total));
        }
        if unreadable > 0 {
            println!("Unreadable files: {}", Tally::Failed.paint(unreadable));
        }

        if total > 0 {
            println!();
            println!(
                "{}",
                hint("Run 'docsmith fix' to insert the missing blank lines.")
            );
        }
    }
}

/// Audits every readable document in `paths`.
///
/// Unreadable documents are logged and counted, and the batch carries on.
fn audit_paths(paths: impl IntoIterator<Item = PathBuf>) -> (Vec<FileReport>, usize) {
    let mut reports = Vec::new();
    let mut unreadable = 0;
    for path in paths {
        match Document::read(path) {
            Ok(document) => reports.push(FileReport {
                issues: audit(document.text()).collect(),
                path: document.path().to_path_buf(),
            }),
            Err(e) => {
                tracing::error!("{:#}", anyhow::Error::new(e));
                unreadable += 1;
            }
        }
    }
    (reports, unreadable)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn unreadable_file_does_not_stop_the_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let binary = tmp.path().join("binary.adoc");
        let guide = tmp.path().join("guide.adoc");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        fs::write(&guide, "Features:\n* fast\n").unwrap();

        let (reports, unreadable) = audit_paths([
            binary,
            tmp.path().join("missing.adoc"),
            guide.clone(),
        ]);

        assert_eq!(unreadable, 2);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, guide);
        assert_eq!(reports[0].issues.len(), 1);
    }
}
