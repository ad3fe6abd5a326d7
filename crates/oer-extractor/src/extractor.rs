//! Extraction orchestrator
//!
//! Wires candidate selection, pair generation and the pattern library into
//! a single per-sentence call.

use oer_core::{
    AnnotatedSentence, ExtractionResult, ExtractorConfig, KnowledgeTriple, Result, Sentence,
};

use crate::candidate::{CandidateSelector, PairGenerator};
use crate::combine::EntityCombiner;
use crate::dsnf::{MatchPolicy, PatternLibrary};
use crate::tree::DependencyTree;

/// Rule-based knowledge triple extractor
pub struct Extractor {
    config: ExtractorConfig,
    selector: CandidateSelector,
    pairs: PairGenerator,
    patterns: PatternLibrary,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let patterns = PatternLibrary::new(MatchPolicy::from(&config));
        Self::with_patterns(config, patterns)
    }

    /// Use a custom pattern library
    pub fn with_patterns(config: ExtractorConfig, patterns: PatternLibrary) -> Self {
        Self {
            selector: CandidateSelector::new(config.include_generic_nouns),
            pairs: PairGenerator::new(config.max_entity_gap),
            patterns,
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract triples from an entity-merged, parsed sentence.
    ///
    /// Every pattern match is kept, including identical facts licensed by
    /// different patterns. Pattern provenance is dropped unless configured.
    pub fn extract(&self, text: &str, sentence: &Sentence) -> ExtractionResult {
        let candidates = self.selector.select(sentence);
        if candidates.len() < 2 {
            tracing::debug!(candidates = candidates.len(), "Too few entities in sentence");
            return ExtractionResult::new(text, Vec::new());
        }

        let pairs = self.pairs.make_pairs(&candidates, sentence);
        let ctx = self.patterns.context(DependencyTree::new(sentence));

        let knowledge: Vec<KnowledgeTriple> = pairs
            .iter()
            .flat_map(|pair| self.patterns.match_pair(&ctx, pair))
            .collect();

        tracing::debug!(
            candidates = candidates.len(),
            pairs = pairs.len(),
            triples = knowledge.len(),
            "Sentence extracted"
        );

        let result = ExtractionResult::new(text, knowledge);
        if self.config.include_provenance {
            result
        } else {
            result.without_provenance()
        }
    }

    /// Merge entities of a fully annotated sentence, then extract
    pub fn extract_annotated(&self, annotated: &AnnotatedSentence) -> Result<ExtractionResult> {
        let merged = self.combine(annotated)?;
        Ok(self.extract(&annotated.text, &merged))
    }

    /// Entity-merged sentence for annotated input
    pub fn combine(&self, annotated: &AnnotatedSentence) -> Result<Sentence> {
        let sentence = annotated.sentence()?;
        EntityCombiner::combine(&sentence, &annotated.netags())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oer_core::{DependencyRelation as Dep, PatternId, Token};

    fn provenance() -> ExtractorConfig {
        ExtractorConfig {
            include_provenance: true,
            ..ExtractorConfig::default()
        }
    }

    fn obama() -> Sentence {
        Sentence::new(vec![
            Token::new(1, "奥巴马", "nh").with_arc(2, Dep::Sbv),
            Token::new(2, "毕业", "v").with_arc(0, Dep::Hed),
            Token::new(3, "于", "p").with_arc(2, Dep::Cmp),
            Token::new(4, "哈佛大学", "ni").with_arc(3, Dep::Pob),
        ])
        .unwrap()
    }

    #[test]
    fn test_extract_graduated_from() {
        let extractor = Extractor::new(provenance());
        let result = extractor.extract("奥巴马毕业于哈佛大学", &obama());

        assert_eq!(result.sentence, "奥巴马毕业于哈佛大学");
        assert_eq!(result.knowledge.len(), 1);
        assert_eq!(result.knowledge[0].key(), ("奥巴马", "毕业于", "哈佛大学"));
        assert_eq!(result.knowledge[0].pattern, Some(PatternId::SbvCmpPob));
    }

    #[test]
    fn test_provenance_hidden_by_default() {
        let result = Extractor::default().extract("奥巴马毕业于哈佛大学", &obama());
        assert_eq!(result.knowledge.len(), 1);
        assert_eq!(result.knowledge[0].pattern, None);
    }

    #[test]
    fn test_no_entities() {
        let sentence = Sentence::new(vec![
            Token::new(1, "他", "r").with_arc(2, Dep::Sbv),
            Token::new(2, "走", "v").with_arc(0, Dep::Hed),
            Token::new(3, "了", "u").with_arc(2, Dep::Rad),
        ])
        .unwrap();

        let result = Extractor::default().extract("他走了", &sentence);
        assert_eq!(result, ExtractionResult::new("他走了", vec![]));
    }

    #[test]
    fn test_idempotent() {
        let extractor = Extractor::new(provenance());
        let sentence = obama();
        let first = extractor.extract("奥巴马毕业于哈佛大学", &sentence);
        let second = extractor.extract("奥巴马毕业于哈佛大学", &sentence);
        assert_eq!(first, second);
    }
}
