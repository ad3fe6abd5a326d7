//! Candidate entities and entity pairs

use oer_core::{Sentence, Token};

/// Two candidate entities of one sentence, `entity1` first in surface order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPair<'s> {
    pub entity1: &'s Token,
    pub entity2: &'s Token,
}

/// Filters a merged sentence down to candidate entities
#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector {
    include_generic_nouns: bool,
}

impl CandidateSelector {
    pub fn new(include_generic_nouns: bool) -> Self {
        Self {
            include_generic_nouns,
        }
    }

    /// Whether a token's category admits it as an entity.
    ///
    /// Proper categories (`nh`, `ni`, `ns`, `nz`, `j`) always qualify;
    /// generic nouns (`n`, `nl`) only when requested.
    pub fn is_entity(token: &Token, include_generic_nouns: bool) -> bool {
        token
            .category()
            .is_some_and(|c| c.is_proper() || (include_generic_nouns && c.is_generic()))
    }

    /// Candidate entities in sentence order
    pub fn select<'s>(&self, sentence: &'s Sentence) -> Vec<&'s Token> {
        sentence
            .tokens()
            .iter()
            .filter(|t| Self::is_entity(t, self.include_generic_nouns))
            .collect()
    }
}

/// Builds bounded-gap entity pairs
#[derive(Debug, Clone, Copy)]
pub struct PairGenerator {
    max_gap: usize,
}

impl PairGenerator {
    pub fn new(max_gap: usize) -> Self {
        Self { max_gap }
    }

    /// All pairs `(i, j)`, `i < j`, with distinct surface text and at most
    /// `max_gap` entities between them.
    pub fn make_pairs<'s>(
        &self,
        candidates: &[&'s Token],
        sentence: &Sentence,
    ) -> Vec<EntityPair<'s>> {
        let mut pairs = Vec::new();

        for (i, &entity1) in candidates.iter().enumerate() {
            for &entity2 in &candidates[i + 1..] {
                if entity1.lemma == entity2.lemma {
                    continue;
                }
                if Self::entities_between(sentence, entity1, entity2) > self.max_gap {
                    continue;
                }
                pairs.push(EntityPair { entity1, entity2 });
            }
        }

        pairs
    }

    /// Entities strictly between two tokens.
    ///
    /// Counted by category with generic nouns included, independent of the
    /// candidate list, so distance does not shrink when generic nouns are
    /// excluded from pairing.
    pub fn entities_between(sentence: &Sentence, entity1: &Token, entity2: &Token) -> usize {
        let (first, second) = if entity1.id < entity2.id {
            (entity1.id, entity2.id)
        } else {
            (entity2.id, entity1.id)
        };

        (first + 1..second)
            .filter_map(|id| sentence.get(id))
            .filter(|t| CandidateSelector::is_entity(t, true))
            .count()
    }
}
