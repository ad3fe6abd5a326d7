//! OER Extractor - Knowledge triple extraction pipeline
//!
//! Turns annotated Chinese sentences into (subject, predicate, object)
//! triples: named entities are merged into single tokens, candidate entity
//! pairs are formed, and dependency-path patterns decide which pairs state
//! a fact and what the predicate is.

use oer_core::Result;

/// External annotation engine (segmenter, tagger, recognizer, parser).
///
/// Every layer must return exactly one entry per input lemma. Tags are
/// returned raw; decoding happens on this side of the boundary.
pub trait Annotator: Send + Sync {
    /// Split text into lemmas
    fn segment(&self, text: &str) -> Result<Vec<String>>;

    /// One part-of-speech code per lemma
    fn postag(&self, lemmas: &[String]) -> Result<Vec<String>>;

    /// One BIOES-style tag per lemma, e.g. `B-Ni` or `O`
    fn netag(&self, lemmas: &[String], postags: &[String]) -> Result<Vec<String>>;

    /// One (head, relation label) arc per lemma, heads 1-based with 0 for root
    fn parse(&self, lemmas: &[String], postags: &[String]) -> Result<Vec<(usize, String)>>;
}

pub mod candidate;
pub mod combine;
pub mod document;
pub mod dsnf;
pub mod extractor;
pub mod metrics;
pub mod pipeline;
pub mod tree;

pub use candidate::{CandidateSelector, EntityPair, PairGenerator};
pub use combine::EntityCombiner;
pub use document::{split_sentences, SentenceSplitter};
pub use dsnf::{DsnfPattern, MatchContext, MatchPolicy, PatternLibrary};
pub use extractor::Extractor;
pub use metrics::{evaluate_corpus, EvaluationReport, TripleMetrics};
pub use pipeline::{DocumentReport, Pipeline, SentenceFailure};
pub use tree::DependencyTree;
