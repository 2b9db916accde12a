/// Document discovery and reading/writing of document files.
pub mod corpus;

pub use corpus::{Corpus, CorpusError, Document};
