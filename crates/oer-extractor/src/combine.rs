//! Entity combination
//!
//! Collapses multi-token named-entity spans (BIOES tags) and runs of
//! adjacent proper nouns into single entity tokens. Each pass builds a new
//! sentence with dense ids; dependency arcs are carried over by mapping
//! every group to its syntactic head member.

use std::ops::Range;

use oer_core::{NePosition, NeTag, OerError, Result, Sentence, Token};

/// A run of consecutive tokens that becomes one output token
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    range: Range<usize>,
    /// Replacement postag, `None` keeps the last member's postag
    postag: Option<&'static str>,
}

impl Group {
    fn tagged(range: Range<usize>, postag: &'static str) -> Self {
        Self {
            range,
            postag: Some(postag),
        }
    }

    fn passthrough(range: Range<usize>) -> Self {
        Self {
            range,
            postag: None,
        }
    }
}

/// Merges annotated tokens into entity-level tokens
pub struct EntityCombiner;

impl EntityCombiner {
    /// Merge named-entity spans, then fuse adjacent proper nouns.
    pub fn combine(sentence: &Sentence, netags: &[NeTag]) -> Result<Sentence> {
        OerError::check_aligned("netags", sentence.len(), netags.len())?;

        let named = rebuild(sentence, &Self::named_entity_groups(netags))?;
        let combined = Self::combine_common(&named)?;

        tracing::debug!(
            tokens = sentence.len(),
            named = named.len(),
            combined = combined.len(),
            "Entities combined"
        );
        Ok(combined)
    }

    /// Fuse adjacent proper entities when either side is a joinable
    /// category (`nz`, `j`). The fused token takes the last member's postag.
    pub fn combine_common(sentence: &Sentence) -> Result<Sentence> {
        let tokens = sentence.tokens();
        let mut groups = Vec::new();
        let mut start = 0;

        for i in 1..tokens.len() {
            if !Self::fusable(&tokens[i - 1], &tokens[i]) {
                groups.push(Group::passthrough(start..i));
                start = i;
            }
        }
        if !tokens.is_empty() {
            groups.push(Group::passthrough(start..tokens.len()));
        }

        rebuild(sentence, &groups)
    }

    /// Group tokens by BIOES span.
    ///
    /// A span opened by `B` absorbs following `I` tags and closes after an
    /// `E` tag. Any other tag, or the end of input, closes the span without
    /// being consumed. The span category comes from its last consumed tag.
    fn named_entity_groups(netags: &[NeTag]) -> Vec<Group> {
        let mut groups = Vec::new();
        let mut i = 0;

        while i < netags.len() {
            let tag = netags[i];
            match tag.position {
                NePosition::Single => {
                    groups.push(Group::tagged(i..i + 1, tag.entity_postag()));
                    i += 1;
                }
                NePosition::Begin => {
                    let mut last = tag;
                    let mut j = i + 1;
                    while j < netags.len() {
                        match netags[j].position {
                            NePosition::Inside => {
                                last = netags[j];
                                j += 1;
                            }
                            NePosition::End => {
                                last = netags[j];
                                j += 1;
                                break;
                            }
                            _ => break,
                        }
                    }
                    groups.push(Group::tagged(i..j, last.entity_postag()));
                    i = j;
                }
                _ => {
                    groups.push(Group::passthrough(i..i + 1));
                    i += 1;
                }
            }
        }

        groups
    }

    fn fusable(prev: &Token, next: &Token) -> bool {
        match (prev.category(), next.category()) {
            (Some(a), Some(b)) => {
                a.is_proper() && b.is_proper() && (a.is_joinable() || b.is_joinable())
            }
            _ => false,
        }
    }
}

/// Build a new sentence with one token per group.
///
/// Ids are renumbered from 1. A group's arc is taken from the member whose
/// governor lies outside the group, with the governor mapped to its new id.
fn rebuild(sentence: &Sentence, groups: &[Group]) -> Result<Sentence> {
    let tokens = sentence.tokens();
    let groups: Vec<&Group> = groups.iter().filter(|g| !g.range.is_empty()).collect();

    // old id -> new id, slot 0 is the virtual root
    let mut new_id = vec![0usize; tokens.len() + 1];
    for (index, group) in groups.iter().enumerate() {
        for position in group.range.clone() {
            new_id[position + 1] = index + 1;
        }
    }

    let merged = groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let members = &tokens[group.range.clone()];
            let last = &members[members.len() - 1];
            let lemma: String = members.iter().map(|t| t.lemma.as_str()).collect();
            let postag = group.postag.unwrap_or(last.postag.as_str());

            let head_member = members
                .iter()
                .find(|t| t.is_root() || !group.range.contains(&(t.head - 1)))
                .unwrap_or(last);
            let head = if head_member.is_root() {
                0
            } else {
                new_id[head_member.head]
            };

            Token::new(index + 1, lemma, postag).with_arc(head, head_member.dependency.clone())
        })
        .collect();

    Sentence::new(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oer_core::DependencyRelation;

    fn sentence(words: &[(&str, &str)]) -> Sentence {
        Sentence::new(
            words
                .iter()
                .enumerate()
                .map(|(i, (lemma, postag))| Token::new(i + 1, *lemma, *postag))
                .collect(),
        )
        .unwrap()
    }

    fn tags(raw: &[&str]) -> Vec<NeTag> {
        raw.iter().map(|t| NeTag::parse(t)).collect()
    }

    fn lemmas(sentence: &Sentence) -> Vec<&str> {
        sentence.tokens().iter().map(|t| t.lemma.as_str()).collect()
    }

    #[test]
    fn test_combine_place_span() {
        let input = sentence(&[
            ("国家主席", "n"),
            ("习近平", "nh"),
            ("视察", "v"),
            ("中国", "ns"),
            ("福建", "ns"),
            ("厦门", "ns"),
            ("。", "wp"),
        ]);
        let netags = tags(&["O", "S-Nh", "O", "B-Ns", "I-Ns", "E-Ns", "O"]);

        let merged = EntityCombiner::combine(&input, &netags).unwrap();

        assert_eq!(
            lemmas(&merged),
            vec!["国家主席", "习近平", "视察", "中国福建厦门", "。"]
        );
        let place = merged.get(4).unwrap();
        assert_eq!(place.postag, "ns");
        assert_eq!(place.id, 4);
        assert_eq!(merged.get(2).unwrap().postag, "nh");
    }

    #[test]
    fn test_single_tag_takes_category() {
        let input = sentence(&[("哈佛", "nz"), ("很", "d")]);
        let merged = EntityCombiner::combine(&input, &tags(&["S-Ni", "O"])).unwrap();
        assert_eq!(merged.get(1).unwrap().postag, "ni");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_unknown_category_yields_empty_postag() {
        let input = sentence(&[("某物", "n"), ("好", "a")]);
        let merged = EntityCombiner::combine(&input, &tags(&["S-Xx", "O"])).unwrap();
        assert_eq!(merged.get(1).unwrap().postag, "");
        assert!(merged.get(1).unwrap().category().is_none());
    }

    #[test]
    fn test_span_without_end_closes_on_outside() {
        let input = sentence(&[("北京", "ns"), ("大学", "n"), ("的", "u"), ("学生", "n")]);
        let netags = tags(&["B-Ni", "I-Ni", "O", "O"]);

        let merged = EntityCombiner::combine(&input, &netags).unwrap();

        assert_eq!(lemmas(&merged), vec!["北京大学", "的", "学生"]);
        assert_eq!(merged.get(1).unwrap().postag, "ni");
    }

    #[test]
    fn test_span_closes_at_end_of_input() {
        let input = sentence(&[("访问", "v"), ("上海", "ns"), ("浦东", "ns")]);
        let merged = EntityCombiner::combine(&input, &tags(&["O", "B-Ns", "I-Ns"])).unwrap();
        assert_eq!(lemmas(&merged), vec!["访问", "上海浦东"]);
    }

    #[test]
    fn test_span_does_not_swallow_following_entity() {
        let input = sentence(&[("中国", "ns"), ("银行", "n"), ("王明", "nh")]);
        let netags = tags(&["B-Ni", "I-Ni", "S-Nh"]);

        let merged = EntityCombiner::combine(&input, &netags).unwrap();

        assert_eq!(lemmas(&merged), vec!["中国银行", "王明"]);
        assert_eq!(merged.get(2).unwrap().postag, "nh");
    }

    #[test]
    fn test_misaligned_netags_rejected() {
        let input = sentence(&[("中国", "ns")]);
        let err = EntityCombiner::combine(&input, &[]).unwrap_err();
        assert!(matches!(
            err,
            OerError::MalformedAnnotation { field: "netags", .. }
        ));
    }

    #[test]
    fn test_combine_common_joins_abbreviation() {
        let input = sentence(&[("中国", "ns"), ("人大", "j"), ("召开", "v")]);
        let merged = EntityCombiner::combine_common(&input).unwrap();

        assert_eq!(lemmas(&merged), vec!["中国人大", "召开"]);
        assert_eq!(merged.get(1).unwrap().postag, "j");
        assert_eq!(merged.get(2).unwrap().id, 2);
    }

    #[test]
    fn test_combine_common_keeps_non_joinable_entities() {
        let input = sentence(&[("北京", "ns"), ("王明", "nh"), ("国家", "n"), ("主席", "n")]);
        let merged = EntityCombiner::combine_common(&input).unwrap();
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_combine_common_single_token() {
        let input = sentence(&[("北京", "ns")]);
        let merged = EntityCombiner::combine_common(&input).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get(1).unwrap().lemma, "北京");
    }

    #[test]
    fn test_empty_sentence() {
        let input = Sentence::new(vec![]).unwrap();
        let merged = EntityCombiner::combine(&input, &[]).unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn test_arcs_remapped_to_span_head() {
        // 视察 <-VOB- 厦门, 中国/福建 -ATT-> 厦门
        let input = Sentence::new(vec![
            Token::new(1, "视察", "v").with_arc(0, DependencyRelation::Hed),
            Token::new(2, "中国", "ns").with_arc(4, DependencyRelation::Att),
            Token::new(3, "福建", "ns").with_arc(4, DependencyRelation::Att),
            Token::new(4, "厦门", "ns").with_arc(1, DependencyRelation::Vob),
            Token::new(5, "。", "wp").with_arc(1, DependencyRelation::Wp),
        ])
        .unwrap();
        let netags = tags(&["O", "B-Ns", "I-Ns", "E-Ns", "O"]);

        let merged = EntityCombiner::combine(&input, &netags).unwrap();

        let place = merged.get(2).unwrap();
        assert_eq!(place.lemma, "中国福建厦门");
        assert_eq!(place.head, 1);
        assert_eq!(place.dependency, DependencyRelation::Vob);
        assert_eq!(merged.get(3).unwrap().head, 1);
        assert!(merged.get(1).unwrap().is_root());
    }
}
