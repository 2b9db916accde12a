use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use docsmith::{
    Document, Traceability,
    domain::traceability::{
        extract_requirements, extract_test_references, generate_matrix, update_matrix,
    },
    storage::Corpus,
};
use tracing::instrument;

use super::{display_path, terminal::Tally};

#[derive(Debug, Parser)]
#[command(about = "Maintain the requirements traceability matrix")]
pub struct Rtm {
    #[command(subcommand)]
    command: RtmCommand,
}

#[derive(Debug, clap::Subcommand)]
enum RtmCommand {
    /// Rewrite the test case column of the existing matrix
    Update,

    /// Build a complete matrix from the requirements and the test plan
    Generate {
        /// Write the matrix file instead of printing it
        #[arg(long)]
        write: bool,
    },
}

impl Rtm {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let corpus = Corpus::open(&root)?;
        match self.command {
            RtmCommand::Update => Self::update(&corpus),
            RtmCommand::Generate { write } => Self::generate(&corpus, write),
        }
    }

    fn read(corpus: &Corpus, path: &Path) -> anyhow::Result<Document> {
        let path = corpus.resolve(path);
        Document::read(path.as_path())
            .with_context(|| format!("Cannot build traceability from {}", path.display()))
    }

    fn traceability(corpus: &Corpus) -> anyhow::Result<Traceability> {
        let config = corpus.config();
        let plan = Self::read(corpus, &config.traceability.test_plan)?;
        Ok(extract_test_references(
            plan.text(),
            &config.table_options(),
            &config.requirement_pattern(),
        ))
    }

    fn update(corpus: &Corpus) -> anyhow::Result<()> {
        let traceability = Self::traceability(corpus)?;
        for line in counts(None, &traceability) {
            println!("{line}");
        }

        let mut matrix = Self::read(corpus, &corpus.config().traceability.matrix)?;
        let update = update_matrix(matrix.text(), &traceability);

        if update.rows_changed > 0 {
            matrix.replace(update.text)?;
        }
        println!(
            "Updated {} of {} matrix row(s) in {}",
            Tally::Done.paint(update.rows_changed),
            update.rows_matched,
            display_path(matrix.path(), corpus.root())
        );
        Ok(())
    }

    fn generate(corpus: &Corpus, write: bool) -> anyhow::Result<()> {
        let config = corpus.config();
        let srs = Self::read(corpus, &config.traceability.requirements)?;
        let requirements = extract_requirements(srs.text(), &config.requirement_pattern());
        let traceability = Self::traceability(corpus)?;

        let matrix = generate_matrix(&requirements, &traceability, &config.design_artifacts);

        if write {
            let path = corpus.resolve(&config.traceability.matrix);
            Document::write_to(&path, &matrix)?;
            for line in counts(Some(requirements.len()), &traceability) {
                println!("{line}");
            }
            println!("Wrote {}", display_path(&path, corpus.root()));
        } else {
            // stdout carries the matrix itself
            print!("{matrix}");
            for line in counts(Some(requirements.len()), &traceability) {
                eprintln!("{line}");
            }
        }
        Ok(())
    }
}

fn counts(requirements: Option<usize>, traceability: &Traceability) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(count) = requirements {
        lines.push(format!("Found {} requirement(s)", Tally::Done.paint(count)));
    }
    lines.push(format!(
        "Found {} requirement(s) with test cases",
        Tally::Done.paint(traceability.len())
    ));
    lines.push(format!(
        "Total test case mappings: {}",
        traceability.mappings()
    ));
    lines
}
