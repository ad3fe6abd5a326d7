//! Dependency tree index
//!
//! A child index over a parsed sentence, built once and shared by every
//! pattern matcher evaluated on that sentence.

use oer_core::{DependencyRelation, Sentence, Token};

/// A token reached in a given role, together with its governor
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'s> {
    /// Token carrying the role relation
    pub dependent: &'s Token,
    /// Governor of `dependent`
    pub governor: &'s Token,
    /// Attribute links climbed from the entity to `dependent`
    pub hops: usize,
}

/// Sentence plus a token id -> dependents index
#[derive(Debug, Clone)]
pub struct DependencyTree<'s> {
    sentence: &'s Sentence,
    /// Slot 0 holds the dependents of the virtual root
    children: Vec<Vec<usize>>,
}

impl<'s> DependencyTree<'s> {
    pub fn new(sentence: &'s Sentence) -> Self {
        let mut children = vec![Vec::new(); sentence.len() + 1];
        for token in sentence.tokens() {
            let head = if token.is_root() { 0 } else { token.head };
            children[head].push(token.id);
        }
        Self { sentence, children }
    }

    pub fn sentence(&self) -> &'s Sentence {
        self.sentence
    }

    pub fn token(&self, id: usize) -> Option<&'s Token> {
        self.sentence.get(id)
    }

    /// Governor of a token, `None` at the root
    pub fn governor(&self, token: &Token) -> Option<&'s Token> {
        self.sentence.head_of(token)
    }

    /// Direct dependents in surface order
    pub fn children(&self, id: usize) -> impl Iterator<Item = &'s Token> + '_ {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&child| self.sentence.get(child))
    }

    /// Direct dependents attached with `relation`
    pub fn dependents<'a>(
        &'a self,
        id: usize,
        relation: &'a DependencyRelation,
    ) -> impl Iterator<Item = &'s Token> + 'a {
        self.children(id).filter(move |t| &t.dependency == relation)
    }

    /// Find the token through which `token` fills one of `relations`.
    ///
    /// The token itself is tried first; otherwise attribute links are
    /// climbed, at most `max_hops` of them. Climbing stops at a governor that
    /// is a proper entity, since that entity fills the role in its own right.
    /// The first hit is the shortest path.
    pub fn resolve_role(
        &self,
        token: &'s Token,
        relations: &[DependencyRelation],
        max_hops: usize,
    ) -> Option<Anchor<'s>> {
        let mut current = token;
        for hops in 0..=max_hops {
            if relations.contains(&current.dependency) {
                let governor = self.governor(current)?;
                return Some(Anchor {
                    dependent: current,
                    governor,
                    hops,
                });
            }
            if current.dependency != DependencyRelation::Att {
                return None;
            }
            let next = self.governor(current)?;
            if next.category().is_some_and(|c| c.is_proper()) {
                return None;
            }
            current = next;
        }
        None
    }

    /// Number of coordinate links from `member` up to `head`, if `member`
    /// belongs to the coordination headed by `head` (0 when identical).
    pub fn coordination_depth(&self, head: &Token, member: &Token) -> Option<usize> {
        let mut current = member;
        for depth in 0..=self.sentence.len() {
            if current.id == head.id {
                return Some(depth);
            }
            if current.dependency != DependencyRelation::Coo {
                return None;
            }
            current = self.governor(current)?;
        }
        None
    }

    /// First conjunct of the coordination `token` is attached to, `None` if
    /// `token` is not a coordinate dependent.
    pub fn first_conjunct(&self, token: &'s Token) -> Option<&'s Token> {
        if token.dependency != DependencyRelation::Coo {
            return None;
        }
        let mut current = token;
        for _ in 0..self.sentence.len() {
            if current.dependency != DependencyRelation::Coo {
                break;
            }
            current = self.governor(current)?;
        }
        (current.id != token.id).then_some(current)
    }

    /// Chain of attribute governors from `token` up to `target`, excluding
    /// both ends, if `target` is reached within `max_links` links.
    pub fn attribute_chain(
        &self,
        token: &'s Token,
        target: &Token,
        max_links: usize,
    ) -> Option<Vec<&'s Token>> {
        let mut chain = Vec::new();
        let mut current = token;
        for _ in 0..max_links {
            if current.dependency != DependencyRelation::Att {
                return None;
            }
            let next = self.governor(current)?;
            if next.id == target.id {
                return Some(chain);
            }
            chain.push(next);
            current = next;
        }
        None
    }
}
