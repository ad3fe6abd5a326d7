//! Annotation tag sets
//!
//! Closed types for the three label layers produced by the annotation
//! engine: BIOES named-entity tags, part-of-speech entity categories and
//! dependency relations. Raw strings are decoded once at the annotation
//! boundary; the rest of the pipeline only sees these enums.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Named-entity tags (BIOES)
// ============================================================================

/// Position of a token inside a named-entity span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NePosition {
    Begin,
    Inside,
    End,
    Single,
    Outside,
}

/// Named-entity category carried by the tag suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeCategory {
    /// `Ns`
    Place,
    /// `Ni`
    Organization,
    /// `Nh`
    Person,
}

impl NeCategory {
    /// Entity category assigned to a merged span of this kind
    pub fn entity_category(self) -> EntityCategory {
        match self {
            Self::Place => EntityCategory::Place,
            Self::Organization => EntityCategory::Organization,
            Self::Person => EntityCategory::Person,
        }
    }
}

/// Decoded BIOES tag, e.g. `B-Ns` or `O`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeTag {
    pub position: NePosition,
    /// `None` when the suffix is missing or not a known category
    pub category: Option<NeCategory>,
}

impl NeTag {
    pub const OUTSIDE: NeTag = NeTag {
        position: NePosition::Outside,
        category: None,
    };

    pub fn new(position: NePosition, category: Option<NeCategory>) -> Self {
        Self { position, category }
    }

    /// Decode a raw tag string.
    ///
    /// Anything without a recognised `B-`/`I-`/`E-`/`S-` prefix is treated as
    /// outside, so malformed annotator output degrades to pass-through.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let Some((prefix, suffix)) = raw.split_once('-') else {
            return Self::OUTSIDE;
        };

        let position = match prefix {
            "B" => NePosition::Begin,
            "I" => NePosition::Inside,
            "E" => NePosition::End,
            "S" => NePosition::Single,
            _ => return Self::OUTSIDE,
        };

        let category = match suffix {
            "Ns" => Some(NeCategory::Place),
            "Ni" => Some(NeCategory::Organization),
            "Nh" => Some(NeCategory::Person),
            _ => None,
        };

        Self { position, category }
    }

    /// Postag code for the merged entity, empty when no category is known
    pub fn entity_postag(&self) -> &'static str {
        self.category
            .map(|c| c.entity_category().as_str())
            .unwrap_or("")
    }
}

impl std::fmt::Display for NeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.position {
            NePosition::Outside => return write!(f, "O"),
            NePosition::Begin => "B",
            NePosition::Inside => "I",
            NePosition::End => "E",
            NePosition::Single => "S",
        };
        let suffix = match self.category {
            Some(NeCategory::Place) => "Ns",
            Some(NeCategory::Organization) => "Ni",
            Some(NeCategory::Person) => "Nh",
            None => "",
        };
        write!(f, "{}-{}", prefix, suffix)
    }
}

impl Serialize for NeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

// ============================================================================
// Entity categories
// ============================================================================

/// Part-of-speech codes that mark a token as a (potential) entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    /// `ns`
    Place,
    /// `ni`
    Organization,
    /// `nh`
    Person,
    /// `nz`, other proper noun (awards, products, ...)
    OtherProper,
    /// `j`, abbreviation
    Abbreviation,
    /// `n`
    Noun,
    /// `nl`, generic place noun such as "城郊"
    PlaceNoun,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Place => "ns",
            Self::Organization => "ni",
            Self::Person => "nh",
            Self::OtherProper => "nz",
            Self::Abbreviation => "j",
            Self::Noun => "n",
            Self::PlaceNoun => "nl",
        }
    }

    pub fn from_postag(postag: &str) -> Option<Self> {
        match postag {
            "ns" => Some(Self::Place),
            "ni" => Some(Self::Organization),
            "nh" => Some(Self::Person),
            "nz" => Some(Self::OtherProper),
            "j" => Some(Self::Abbreviation),
            "n" => Some(Self::Noun),
            "nl" => Some(Self::PlaceNoun),
            _ => None,
        }
    }

    /// Named or proper entity (`ns`, `ni`, `nh`, `nz`, `j`)
    pub fn is_proper(&self) -> bool {
        !self.is_generic()
    }

    /// Generic noun classes only admitted on request (`n`, `nl`)
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Noun | Self::PlaceNoun)
    }

    /// Categories that fuse with any adjacent proper entity (`nz`, `j`)
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::OtherProper | Self::Abbreviation)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Dependency relations
// ============================================================================

/// Dependency relation between a token and its governor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DependencyRelation {
    /// Subject-verb
    Sbv,
    /// Verb-object
    Vob,
    /// Indirect object
    Iob,
    /// Fronted object
    Fob,
    /// Double (pivot construction)
    Dbl,
    /// Attribute
    Att,
    /// Adverbial
    Adv,
    /// Complement
    Cmp,
    /// Coordinate
    Coo,
    /// Preposition-object
    Pob,
    /// Left adjunct
    Lad,
    /// Right adjunct (genitive particle, aspect marker)
    Rad,
    /// Independent structure
    Is,
    /// Punctuation
    Wp,
    /// Sentence head
    #[default]
    Hed,
    Other(String),
}

impl DependencyRelation {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sbv => "SBV",
            Self::Vob => "VOB",
            Self::Iob => "IOB",
            Self::Fob => "FOB",
            Self::Dbl => "DBL",
            Self::Att => "ATT",
            Self::Adv => "ADV",
            Self::Cmp => "CMP",
            Self::Coo => "COO",
            Self::Pob => "POB",
            Self::Lad => "LAD",
            Self::Rad => "RAD",
            Self::Is => "IS",
            Self::Wp => "WP",
            Self::Hed => "HED",
            Self::Other(label) => label,
        }
    }

    /// Decode an annotator label; unknown labels are kept verbatim
    pub fn parse(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "SBV" => Self::Sbv,
            "VOB" => Self::Vob,
            "IOB" => Self::Iob,
            "FOB" => Self::Fob,
            "DBL" => Self::Dbl,
            "ATT" => Self::Att,
            "ADV" => Self::Adv,
            "CMP" => Self::Cmp,
            "COO" => Self::Coo,
            "POB" => Self::Pob,
            "LAD" => Self::Lad,
            "RAD" => Self::Rad,
            "IS" => Self::Is,
            "WP" => Self::Wp,
            "HED" => Self::Hed,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl std::fmt::Display for DependencyRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for DependencyRelation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DependencyRelation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netag_parse() {
        assert_eq!(
            NeTag::parse("B-Ns"),
            NeTag::new(NePosition::Begin, Some(NeCategory::Place))
        );
        assert_eq!(
            NeTag::parse("S-Nh"),
            NeTag::new(NePosition::Single, Some(NeCategory::Person))
        );
        assert_eq!(
            NeTag::parse("E-Ni"),
            NeTag::new(NePosition::End, Some(NeCategory::Organization))
        );
        assert_eq!(NeTag::parse("O"), NeTag::OUTSIDE);
        assert_eq!(NeTag::parse("X-Ns"), NeTag::OUTSIDE);
        assert_eq!(NeTag::parse(""), NeTag::OUTSIDE);
    }

    #[test]
    fn test_netag_unknown_suffix_has_empty_postag() {
        let tag = NeTag::parse("S-Nx");
        assert_eq!(tag.position, NePosition::Single);
        assert_eq!(tag.category, None);
        assert_eq!(tag.entity_postag(), "");
    }

    #[test]
    fn test_netag_display() {
        assert_eq!(NeTag::parse("I-Ns").to_string(), "I-Ns");
        assert_eq!(NeTag::OUTSIDE.to_string(), "O");
    }

    #[test]
    fn test_entity_category_classes() {
        assert_eq!(EntityCategory::from_postag("ns"), Some(EntityCategory::Place));
        assert_eq!(EntityCategory::from_postag("v"), None);
        assert!(EntityCategory::Abbreviation.is_joinable());
        assert!(EntityCategory::Abbreviation.is_proper());
        assert!(!EntityCategory::Person.is_joinable());
        assert!(EntityCategory::PlaceNoun.is_generic());
    }

    #[test]
    fn test_dependency_relation_labels() {
        assert_eq!(DependencyRelation::parse("sbv"), DependencyRelation::Sbv);
        assert_eq!(DependencyRelation::Pob.to_string(), "POB");
        assert_eq!(
            DependencyRelation::parse("MT"),
            DependencyRelation::Other("MT".to_string())
        );

        let json = serde_json::to_string(&DependencyRelation::Cmp).unwrap();
        assert_eq!(json, "\"CMP\"");
        let back: DependencyRelation = serde_json::from_str("\"COO\"").unwrap();
        assert_eq!(back, DependencyRelation::Coo);
    }
}
