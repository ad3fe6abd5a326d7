//! Dependency Syntax Normal Form (DSNF) patterns
//!
//! Each pattern is a structural template over the dependency tree. Given an
//! entity pair it either licenses one knowledge triple or nothing. Patterns
//! are independent; every match for a pair is kept.
//!
//! Role templates used below:
//!
//! | pattern              | entity1        | entity2                         | predicate            |
//! |----------------------|----------------|---------------------------------|----------------------|
//! | `SBV_VOB`            | SBV of V       | VOB of V (or of a subjectless verb COO V) | adverbs + V          |
//! | `SBV_CMP_POB`        | SBV of V       | POB of C, C is CMP of V         | V + C                |
//! | `SBVorFOB_POB_VOB`   | SBV/FOB of V   | POB of P, P is ADV of V         | P + V + object of V  |
//! | `coordinate`         | COO of X       | inherits X's triple             | X's predicate        |
//! | `entity_de_entity`   | ATT chain to entity2, with genitive particle | particle + chain |
//!
//! For `entity_de_entity` the predicate is the genitive particle followed by
//! any attribute nouns between the two entities, in surface order: "美国的总统
//! 奥巴马" gives (美国, 的总统, 奥巴马), "美国的奥巴马" gives (美国, 的, 奥巴马).

use oer_core::{DependencyRelation, ExtractorConfig, KnowledgeTriple, PatternId, Token};

use crate::candidate::EntityPair;
use crate::tree::{Anchor, DependencyTree};

const SUBJECT: &[DependencyRelation] = &[DependencyRelation::Sbv];
const SUBJECT_OR_FRONTED_OBJECT: &[DependencyRelation] =
    &[DependencyRelation::Sbv, DependencyRelation::Fob];
const OBJECT: &[DependencyRelation] = &[DependencyRelation::Vob];
const PREPOSITION_OBJECT: &[DependencyRelation] = &[DependencyRelation::Pob];

/// Postag of adverbs (including negation) folded into predicates
const ADVERB_POSTAG: &str = "d";

/// Path policy applied by every pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Attribute links an entity may climb to reach its role
    pub max_modifier_hops: usize,
    /// Surface forms accepted as genitive particle
    pub genitive_particles: Vec<String>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::from(&ExtractorConfig::default())
    }
}

impl From<&ExtractorConfig> for MatchPolicy {
    fn from(config: &ExtractorConfig) -> Self {
        Self {
            max_modifier_hops: config.max_modifier_hops,
            genitive_particles: config.genitive_particles.clone(),
        }
    }
}

/// Everything a pattern may look at for one sentence
pub struct MatchContext<'s> {
    pub tree: DependencyTree<'s>,
    pub policy: &'s MatchPolicy,
}

impl<'s> MatchContext<'s> {
    pub fn new(tree: DependencyTree<'s>, policy: &'s MatchPolicy) -> Self {
        Self { tree, policy }
    }

    fn resolve(
        &self,
        entity: &'s Token,
        relations: &[DependencyRelation],
    ) -> Option<Anchor<'s>> {
        let anchor = self
            .tree
            .resolve_role(entity, relations, self.policy.max_modifier_hops)?;
        if anchor.hops > 0 {
            tracing::debug!(
                entity = %entity.lemma,
                via = %anchor.dependent.lemma,
                hops = anchor.hops,
                "Role reached through attribute links"
            );
        }
        Some(anchor)
    }

    /// `verb` is `subject_verb`, or a verb coordinated with it that has no
    /// subject or fronted object of its own.
    fn shares_subject(&self, subject_verb: &Token, verb: &Token) -> bool {
        if verb.id == subject_verb.id {
            return true;
        }
        self.tree.coordination_depth(subject_verb, verb).is_some()
            && SUBJECT_OR_FRONTED_OBJECT
                .iter()
                .all(|relation| self.tree.dependents(verb.id, relation).next().is_none())
    }

    /// Verb lemma with its leaf adverbial modifiers, in surface order
    fn verb_phrase(&self, verb: &'s Token) -> String {
        let mut parts: Vec<&Token> = self
            .tree
            .dependents(verb.id, &DependencyRelation::Adv)
            .filter(|t| t.postag == ADVERB_POSTAG && self.tree.children(t.id).next().is_none())
            .collect();
        parts.push(verb);
        concat_in_order(parts)
    }
}

fn concat_in_order(mut parts: Vec<&Token>) -> String {
    parts.sort_by_key(|t| t.id);
    parts.iter().map(|t| t.lemma.as_str()).collect()
}

/// A single structural matcher
pub trait DsnfPattern: Send + Sync {
    fn id(&self) -> PatternId;

    /// Triple licensed by this pattern for `(entity1, entity2)`, if any
    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple>;
}

// ============================================================================
// SBV-VOB
// ============================================================================

/// Subject-verb-object, including objects of verbs coordinated with the
/// subject's verb
pub struct SbvVob;

impl DsnfPattern for SbvVob {
    fn id(&self) -> PatternId {
        PatternId::SbvVob
    }

    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        let subject = ctx.resolve(entity1, SUBJECT)?;
        let object = ctx.resolve(entity2, OBJECT)?;
        let verb = object.governor;

        if !ctx.shares_subject(subject.governor, verb) {
            return None;
        }

        Some(KnowledgeTriple::new(
            &entity1.lemma,
            ctx.verb_phrase(verb),
            &entity2.lemma,
            self.id(),
        ))
    }
}

// ============================================================================
// SBV-CMP-POB
// ============================================================================

/// Subject-verb-complement with the object inside the complement's
/// prepositional phrase ("毕业于哈佛大学")
pub struct SbvCmpPob;

impl DsnfPattern for SbvCmpPob {
    fn id(&self) -> PatternId {
        PatternId::SbvCmpPob
    }

    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        let subject = ctx.resolve(entity1, SUBJECT)?;
        let object = ctx.resolve(entity2, PREPOSITION_OBJECT)?;
        let complement = object.governor;

        if complement.dependency != DependencyRelation::Cmp {
            return None;
        }
        let verb = ctx.tree.governor(complement)?;
        if !ctx.shares_subject(subject.governor, verb) {
            return None;
        }

        Some(KnowledgeTriple::new(
            &entity1.lemma,
            concat_in_order(vec![verb, complement]),
            &entity2.lemma,
            self.id(),
        ))
    }
}

// ============================================================================
// SBV/FOB-POB-VOB
// ============================================================================

/// Subject (or fronted object) of a verb whose adverbial prepositional
/// phrase holds the second entity ("高克在同济大学发表演讲")
pub struct SbvOrFobPobVob;

impl DsnfPattern for SbvOrFobPobVob {
    fn id(&self) -> PatternId {
        PatternId::SbvOrFobPobVob
    }

    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        let subject = ctx.resolve(entity1, SUBJECT_OR_FRONTED_OBJECT)?;
        let object = ctx.resolve(entity2, PREPOSITION_OBJECT)?;
        let preposition = object.governor;

        if preposition.dependency != DependencyRelation::Adv {
            return None;
        }
        let verb = ctx.tree.governor(preposition)?;
        if !ctx.shares_subject(subject.governor, verb) {
            return None;
        }

        let mut parts = vec![preposition, verb];
        parts.extend(
            ctx.tree
                .dependents(verb.id, &DependencyRelation::Vob)
                .filter(|t| t.id != subject.dependent.id),
        );

        Some(KnowledgeTriple::new(
            &entity1.lemma,
            concat_in_order(parts),
            &entity2.lemma,
            self.id(),
        ))
    }
}

// ============================================================================
// Coordinate
// ============================================================================

/// Coordinated entities inherit the triple of their first conjunct
pub struct Coordinate {
    base: Vec<Box<dyn DsnfPattern>>,
}

impl Coordinate {
    pub fn new(base: Vec<Box<dyn DsnfPattern>>) -> Self {
        Self { base }
    }

    fn first_match<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        if entity1.id == entity2.id {
            return None;
        }
        self.base
            .iter()
            .find_map(|pattern| pattern.apply(ctx, entity1, entity2))
    }
}

impl DsnfPattern for Coordinate {
    fn id(&self) -> PatternId {
        PatternId::Coordinate
    }

    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        let head1 = ctx.tree.first_conjunct(entity1);
        let head2 = ctx.tree.first_conjunct(entity2);

        let inherited = head1
            .and_then(|h| self.first_match(ctx, h, entity2))
            .or_else(|| head2.and_then(|h| self.first_match(ctx, entity1, h)))
            .or_else(|| match (head1, head2) {
                (Some(h1), Some(h2)) => self.first_match(ctx, h1, h2),
                _ => None,
            })?;

        Some(KnowledgeTriple::new(
            &entity1.lemma,
            inherited.predicate,
            &entity2.lemma,
            self.id(),
        ))
    }
}

// ============================================================================
// Entity-的-Entity
// ============================================================================

/// "X的(N)Y": entity1 modifies entity2 through attribute links and carries a
/// genitive particle
pub struct EntityDeEntity;

impl DsnfPattern for EntityDeEntity {
    fn id(&self) -> PatternId {
        PatternId::EntityDeEntity
    }

    fn apply<'s>(
        &self,
        ctx: &MatchContext<'s>,
        entity1: &'s Token,
        entity2: &'s Token,
    ) -> Option<KnowledgeTriple> {
        let chain = ctx
            .tree
            .attribute_chain(entity1, entity2, ctx.policy.max_modifier_hops + 1)?;

        let particle = ctx
            .tree
            .dependents(entity1.id, &DependencyRelation::Rad)
            .find(|t| ctx.policy.genitive_particles.contains(&t.lemma))?;

        let mut parts = chain;
        parts.push(particle);

        Some(KnowledgeTriple::new(
            &entity1.lemma,
            concat_in_order(parts),
            &entity2.lemma,
            self.id(),
        ))
    }
}

// ============================================================================
// Library
// ============================================================================

/// Ordered set of patterns tried on every pair
pub struct PatternLibrary {
    patterns: Vec<Box<dyn DsnfPattern>>,
    policy: MatchPolicy,
}

impl PatternLibrary {
    /// The standard five patterns in evaluation order
    pub fn new(policy: MatchPolicy) -> Self {
        let patterns: Vec<Box<dyn DsnfPattern>> = vec![
            Box::new(SbvVob),
            Box::new(SbvCmpPob),
            Box::new(SbvOrFobPobVob),
            Box::new(Coordinate::new(vec![
                Box::new(SbvVob),
                Box::new(SbvCmpPob),
                Box::new(SbvOrFobPobVob),
            ])),
            Box::new(EntityDeEntity),
        ];
        Self { patterns, policy }
    }

    /// A custom pattern list
    pub fn with_patterns(patterns: Vec<Box<dyn DsnfPattern>>, policy: MatchPolicy) -> Self {
        Self { patterns, policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn pattern_ids(&self) -> Vec<PatternId> {
        self.patterns.iter().map(|p| p.id()).collect()
    }

    /// Context for matching pairs of one sentence
    pub fn context<'s>(&'s self, tree: DependencyTree<'s>) -> MatchContext<'s> {
        MatchContext::new(tree, &self.policy)
    }

    /// All triples licensed for a pair, in pattern order
    pub fn match_pair<'s>(
        &self,
        ctx: &MatchContext<'s>,
        pair: &EntityPair<'s>,
    ) -> Vec<KnowledgeTriple> {
        self.patterns
            .iter()
            .filter_map(|pattern| {
                let triple = pattern.apply(ctx, pair.entity1, pair.entity2);
                if triple.is_none() {
                    tracing::debug!(
                        pattern = %pattern.id(),
                        entity1 = %pair.entity1.lemma,
                        entity2 = %pair.entity2.lemma,
                        "No pattern path"
                    );
                }
                triple
            })
            .collect()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new(MatchPolicy::default())
    }
}
