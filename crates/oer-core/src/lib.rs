//! OER Core - Domain models, errors and configuration
//!
//! This crate defines the types shared by the extraction pipeline:
//! - Annotated tokens and sentences (the annotation engine's output)
//! - Closed tag sets for named entities, entity categories and dependencies
//! - Knowledge triples and per-sentence extraction results
//! - Common error types
//! - Configuration management

pub mod config;
pub mod tags;

pub use config::{
    AppConfig, ConfigError, DocumentConfig, ExtractorConfig, LoggingConfig, RuntimeConfig,
};
pub use tags::{DependencyRelation, EntityCategory, NeCategory, NePosition, NeTag};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for OER operations
#[derive(Error, Debug)]
pub enum OerError {
    #[error("Malformed annotation: {field} has {actual} entries, expected {expected}")]
    MalformedAnnotation {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid head {head} for token {token}")]
    InvalidHead { token: usize, head: usize },

    #[error("Token at position {position} has id {id}, ids must be dense from 1")]
    InvalidTokenId { position: usize, id: usize },

    #[error("Sentence has no tokens")]
    EmptySentence,

    #[error("Annotator error: {0}")]
    Annotator(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OerError {
    /// Shape check shared by every annotation boundary
    pub fn check_aligned(field: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::MalformedAnnotation {
                field,
                expected,
                actual,
            })
        }
    }
}

pub type Result<T> = std::result::Result<T, OerError>;

// ============================================================================
// Tokens and Sentences
// ============================================================================

/// A word unit after segmentation, tagging and parsing.
///
/// After entity merging the same shape is used for entities: `postag` holds
/// the entity category code and `lemma` may span several original tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 1-based position within the sentence
    pub id: usize,

    /// Surface text
    pub lemma: String,

    /// Part-of-speech or entity category code
    pub postag: String,

    /// Id of the syntactic governor, 0 for the root
    #[serde(default)]
    pub head: usize,

    /// Relation to the governor
    #[serde(default)]
    pub dependency: DependencyRelation,
}

impl Token {
    /// Create an unparsed token
    pub fn new(id: usize, lemma: impl Into<String>, postag: impl Into<String>) -> Self {
        Self {
            id,
            lemma: lemma.into(),
            postag: postag.into(),
            head: 0,
            dependency: DependencyRelation::default(),
        }
    }

    /// Attach a dependency arc
    pub fn with_arc(mut self, head: usize, dependency: DependencyRelation) -> Self {
        self.head = head;
        self.dependency = dependency;
        self
    }

    /// Entity category of this token, if its postag is one
    pub fn category(&self) -> Option<EntityCategory> {
        EntityCategory::from_postag(&self.postag)
    }

    pub fn is_root(&self) -> bool {
        self.head == 0 || self.head == self.id
    }
}

/// Dependency arc as produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyArc {
    pub head: usize,
    pub relation: DependencyRelation,
}

impl DependencyArc {
    pub fn new(head: usize, relation: DependencyRelation) -> Self {
        Self { head, relation }
    }
}

/// An ordered, immutable token sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Build a sentence, checking that ids are dense from 1 and heads
    /// reference tokens of the same sentence.
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        let len = tokens.len();
        for (position, token) in tokens.iter().enumerate() {
            if token.id != position + 1 {
                return Err(OerError::InvalidTokenId {
                    position,
                    id: token.id,
                });
            }
            if token.head > len {
                return Err(OerError::InvalidHead {
                    token: token.id,
                    head: token.head,
                });
            }
        }
        Ok(Self { tokens })
    }

    /// Replace every token's arc with the parser output
    pub fn with_arcs(self, arcs: Vec<DependencyArc>) -> Result<Self> {
        OerError::check_aligned("arcs", self.tokens.len(), arcs.len())?;
        let tokens = self
            .tokens
            .into_iter()
            .zip(arcs)
            .map(|(token, arc)| token.with_arc(arc.head, arc.relation))
            .collect();
        Self::new(tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Word at a 1-based id
    pub fn get(&self, id: usize) -> Option<&Token> {
        id.checked_sub(1).and_then(|index| self.tokens.get(index))
    }

    /// Governor of a token, `None` for the root
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        if token.is_root() {
            None
        } else {
            self.get(token.head)
        }
    }

    /// Lemmas joined without separators
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.lemma.as_str()).collect()
    }

    pub fn lemmas(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.lemma.clone()).collect()
    }

    pub fn postags(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.postag.clone()).collect()
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in &self.tokens {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}",
                token.id, token.lemma, token.postag, token.head, token.dependency
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Pre-annotated input
// ============================================================================

/// One token with all four annotation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub lemma: String,
    pub postag: String,
    #[serde(default = "outside")]
    pub netag: NeTag,
    #[serde(default)]
    pub head: usize,
    #[serde(default)]
    pub dependency: DependencyRelation,
}

fn outside() -> NeTag {
    NeTag::OUTSIDE
}

/// A sentence whose annotation was produced outside this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    /// Original sentence text
    pub text: String,
    pub tokens: Vec<AnnotatedToken>,
}

impl AnnotatedSentence {
    /// Assemble from parallel annotation layers, checking alignment
    pub fn from_layers(
        text: impl Into<String>,
        lemmas: Vec<String>,
        postags: Vec<String>,
        netags: Vec<NeTag>,
        arcs: Vec<DependencyArc>,
    ) -> Result<Self> {
        let expected = lemmas.len();
        OerError::check_aligned("postags", expected, postags.len())?;
        OerError::check_aligned("netags", expected, netags.len())?;
        OerError::check_aligned("arcs", expected, arcs.len())?;

        let tokens = lemmas
            .into_iter()
            .zip(postags)
            .zip(netags)
            .zip(arcs)
            .map(|(((lemma, postag), netag), arc)| AnnotatedToken {
                lemma,
                postag,
                netag,
                head: arc.head,
                dependency: arc.relation,
            })
            .collect();

        Ok(Self {
            text: text.into(),
            tokens,
        })
    }

    /// Token layer as a sentence with 1-based ids
    pub fn sentence(&self) -> Result<Sentence> {
        let tokens = self
            .tokens
            .iter()
            .enumerate()
            .map(|(index, t)| {
                Token::new(index + 1, &t.lemma, &t.postag).with_arc(t.head, t.dependency.clone())
            })
            .collect();
        Sentence::new(tokens)
    }

    pub fn netags(&self) -> Vec<NeTag> {
        self.tokens.iter().map(|t| t.netag).collect()
    }
}

// ============================================================================
// Knowledge Triples
// ============================================================================

/// Structural pattern that licensed a triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternId {
    #[serde(rename = "SBV_VOB")]
    SbvVob,
    #[serde(rename = "SBV_CMP_POB")]
    SbvCmpPob,
    #[serde(rename = "SBVorFOB_POB_VOB")]
    SbvOrFobPobVob,
    #[serde(rename = "coordinate")]
    Coordinate,
    #[serde(rename = "entity_de_entity_NNT")]
    EntityDeEntity,
}

impl PatternId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SbvVob => "SBV_VOB",
            Self::SbvCmpPob => "SBV_CMP_POB",
            Self::SbvOrFobPobVob => "SBVorFOB_POB_VOB",
            Self::Coordinate => "coordinate",
            Self::EntityDeEntity => "entity_de_entity_NNT",
        }
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (subject, predicate, object) fact extracted from one sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnowledgeTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,

    /// Producing pattern, only serialized when provenance is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternId>,
}

impl KnowledgeTriple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        pattern: PatternId,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            pattern: Some(pattern),
        }
    }

    /// Identity of the fact, ignoring provenance
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.subject, &self.predicate, &self.object)
    }
}

/// Externally visible output for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub sentence: String,
    pub knowledge: Vec<KnowledgeTriple>,
}

impl ExtractionResult {
    pub fn new(sentence: impl Into<String>, knowledge: Vec<KnowledgeTriple>) -> Self {
        Self {
            sentence: sentence.into(),
            knowledge,
        }
    }

    /// Drop pattern provenance from every triple
    pub fn without_provenance(mut self) -> Self {
        for triple in &mut self.knowledge {
            triple.pattern = None;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: usize, lemma: &str, postag: &str, head: usize) -> Token {
        Token::new(id, lemma, postag).with_arc(head, DependencyRelation::Att)
    }

    #[test]
    fn test_sentence_lookup() {
        let sentence = Sentence::new(vec![
            token(1, "奥巴马", "nh", 2),
            Token::new(2, "毕业", "v"),
        ])
        .unwrap();

        assert_eq!(sentence.len(), 2);
        assert_eq!(sentence.get(1).unwrap().lemma, "奥巴马");
        assert!(sentence.get(0).is_none());
        assert!(sentence.get(3).is_none());
        assert!(sentence.get(2).unwrap().is_root());
        assert_eq!(
            sentence.head_of(sentence.get(1).unwrap()).unwrap().lemma,
            "毕业"
        );
        assert_eq!(sentence.text(), "奥巴马毕业");
    }

    #[test]
    fn test_sentence_rejects_sparse_ids() {
        let err = Sentence::new(vec![Token::new(2, "a", "n")]).unwrap_err();
        assert!(matches!(err, OerError::InvalidTokenId { position: 0, id: 2 }));
    }

    #[test]
    fn test_sentence_rejects_out_of_range_head() {
        let err = Sentence::new(vec![token(1, "a", "n", 5)]).unwrap_err();
        assert!(matches!(err, OerError::InvalidHead { token: 1, head: 5 }));
    }

    #[test]
    fn test_with_arcs_checks_alignment() {
        let sentence = Sentence::new(vec![Token::new(1, "a", "n")]).unwrap();
        let err = sentence.with_arcs(vec![]).unwrap_err();
        assert!(matches!(
            err,
            OerError::MalformedAnnotation {
                field: "arcs",
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn test_annotated_sentence_from_layers() {
        let annotated = AnnotatedSentence::from_layers(
            "奥巴马毕业",
            vec!["奥巴马".into(), "毕业".into()],
            vec!["nh".into(), "v".into()],
            vec![NeTag::parse("S-Nh"), NeTag::OUTSIDE],
            vec![
                DependencyArc::new(2, DependencyRelation::Sbv),
                DependencyArc::new(0, DependencyRelation::Hed),
            ],
        )
        .unwrap();

        let sentence = annotated.sentence().unwrap();
        assert_eq!(sentence.get(1).unwrap().dependency, DependencyRelation::Sbv);
        assert_eq!(annotated.netags()[0], NeTag::parse("S-Nh"));

        let err = AnnotatedSentence::from_layers(
            "x",
            vec!["x".into()],
            vec![],
            vec![NeTag::OUTSIDE],
            vec![DependencyArc::new(0, DependencyRelation::Hed)],
        )
        .unwrap_err();
        assert!(matches!(err, OerError::MalformedAnnotation { field: "postags", .. }));
    }

    #[test]
    fn test_annotated_token_defaults() {
        let json = r#"{"lemma": "中国", "postag": "ns"}"#;
        let token: AnnotatedToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.netag, NeTag::OUTSIDE);
        assert_eq!(token.head, 0);
        assert_eq!(token.dependency, DependencyRelation::Hed);
    }

    #[test]
    fn test_extraction_result_serialization() {
        let result = ExtractionResult::new(
            "奥巴马毕业于哈佛大学",
            vec![KnowledgeTriple::new(
                "奥巴马",
                "毕业于",
                "哈佛大学",
                PatternId::SbvCmpPob,
            )],
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["knowledge"][0]["pattern"], "SBV_CMP_POB");

        let json = serde_json::to_value(result.without_provenance()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sentence": "奥巴马毕业于哈佛大学",
                "knowledge": [
                    {"subject": "奥巴马", "predicate": "毕业于", "object": "哈佛大学"}
                ]
            })
        );
    }
}
