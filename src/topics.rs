//! Topic catalog
//!
//! A topic is the shared secret every player except the imposter gets to
//! see. Catalogs optionally carry a hint per topic that can be shown to the
//! imposter when hints are enabled.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Source of topics and their hints
pub trait TopicCatalog {
    /// All topic names in the catalog (may be empty)
    fn names(&self) -> Vec<&str>;

    /// The hint for a topic, if the catalog has one
    fn hint(&self, topic: &str) -> Option<&str>;
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// The secret word or phrase
    pub name: String,
    /// Nudge shown to the imposter when hints are on
    pub hint: Option<String>,
}

/// An ordered, owned topic catalog
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Catalog {
    topics: Vec<Topic>,
}

impl Catalog {
    /// Creates a catalog from `(name, hint)` pairs
    ///
    /// Duplicate names are collapsed, keeping the first entry.
    pub fn new<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, Option<N>)>,
        N: Into<String>,
    {
        Self {
            topics: entries
                .into_iter()
                .map(|(name, hint)| Topic {
                    name: name.into(),
                    hint: hint.map(Into::into),
                })
                .unique_by(|topic| topic.name.clone())
                .collect_vec(),
        }
    }

    /// The catalog shipped with the game
    pub fn builtin() -> Self {
        Self::new([
            ("Pizza", Some("Often shared")),
            ("Beach", Some("Sandy")),
            ("Hospital", Some("You hope not to stay long")),
            ("Library", Some("Quiet please")),
            ("Airport", Some("Lots of waiting")),
            ("Wedding", Some("Someone wears something special")),
            ("Zoo", Some("Feeding times")),
            ("Submarine", Some("Cramped")),
            ("Casino", Some("The house usually wins")),
            ("Bakery", Some("Early mornings")),
            ("Movie Theater", Some("Phones off")),
            ("Space Station", None),
        ])
    }

    /// Number of topics in the catalog
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the catalog has no topics
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl TopicCatalog for Catalog {
    fn names(&self) -> Vec<&str> {
        self.topics.iter().map(|topic| topic.name.as_str()).collect_vec()
    }

    fn hint(&self, topic: &str) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| t.name == topic)
            .and_then(|t| t.hint.as_deref())
    }
}
