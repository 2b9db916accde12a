//! Command-line maintenance for `AsciiDoc` documentation corpora.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
