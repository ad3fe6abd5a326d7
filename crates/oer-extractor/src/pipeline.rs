//! Annotation-to-triples pipeline
//!
//! Drives an external [`Annotator`] through segmentation, tagging,
//! named-entity recognition and parsing, merging entities before the parse
//! so the parser sees entity-level tokens.

use serde::Serialize;

use oer_core::{
    DependencyArc, DependencyRelation, DocumentConfig, ExtractionResult, NeTag, OerError, Result,
    Sentence, Token,
};

use crate::combine::EntityCombiner;
use crate::document::SentenceSplitter;
use crate::extractor::Extractor;
use crate::Annotator;

/// A sentence that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct SentenceFailure {
    /// Position among the document's sentences
    pub index: usize,
    pub sentence: String,
    pub error: String,
}

/// Outcome of processing a whole document
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentReport {
    /// Results in sentence order
    pub results: Vec<ExtractionResult>,
    pub failures: Vec<SentenceFailure>,
}

impl DocumentReport {
    pub fn triple_count(&self) -> usize {
        self.results.iter().map(|r| r.knowledge.len()).sum()
    }
}

/// Owns an annotator and runs the full extraction flow per sentence
pub struct Pipeline<A: Annotator> {
    annotator: A,
    extractor: Extractor,
    splitter: SentenceSplitter,
}

impl<A: Annotator> Pipeline<A> {
    pub fn new(annotator: A, extractor: Extractor, document: &DocumentConfig) -> Result<Self> {
        Ok(Self {
            annotator,
            extractor,
            splitter: SentenceSplitter::new(document)?,
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Annotate one sentence and extract its triples
    pub fn predict(&self, text: &str) -> Result<ExtractionResult> {
        let sentence = self.annotate(text)?;
        Ok(self.extractor.extract(text, &sentence))
    }

    /// Entity-merged, parsed sentence for `text`
    pub fn annotate(&self, text: &str) -> Result<Sentence> {
        let lemmas = self.annotator.segment(text)?;
        if lemmas.is_empty() {
            return Sentence::new(Vec::new());
        }

        let postags = self.annotator.postag(&lemmas)?;
        OerError::check_aligned("postags", lemmas.len(), postags.len())?;

        let netags: Vec<NeTag> = self
            .annotator
            .netag(&lemmas, &postags)?
            .iter()
            .map(|raw| NeTag::parse(raw))
            .collect();
        OerError::check_aligned("netags", lemmas.len(), netags.len())?;

        let tokens = lemmas
            .into_iter()
            .zip(postags)
            .enumerate()
            .map(|(index, (lemma, postag))| Token::new(index + 1, lemma, postag))
            .collect();
        let merged = EntityCombiner::combine(&Sentence::new(tokens)?, &netags)?;

        let arcs = self
            .annotator
            .parse(&merged.lemmas(), &merged.postags())?
            .into_iter()
            .map(|(head, label)| DependencyArc::new(head, DependencyRelation::parse(&label)))
            .collect();

        merged.with_arcs(arcs)
    }

    /// Split a document into sentences and extract each one.
    ///
    /// A failing sentence is recorded and skipped; it never aborts the rest
    /// of the document.
    pub fn predict_document(&self, text: &str) -> DocumentReport {
        let mut report = DocumentReport::default();

        for (index, sentence) in self.splitter.split(text).into_iter().enumerate() {
            match self.predict(sentence) {
                Ok(result) => report.results.push(result),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping sentence");
                    report.failures.push(SentenceFailure {
                        index,
                        sentence: sentence.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            sentences = report.results.len() + report.failures.len(),
            failures = report.failures.len(),
            triples = report.triple_count(),
            "Document processed"
        );
        report
    }
}
