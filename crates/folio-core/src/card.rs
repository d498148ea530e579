//! Project cards and the deck they are shown in.

use crate::error::{Result, StackError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// One project card. Identity is positional within its `Deck`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Card {
    pub title: String,
    #[serde(alias = "copy", deserialize_with = "one_or_many", default)]
    pub summary: Vec<String>,
    #[serde(alias = "images", default)]
    pub image_refs: Vec<String>,
    #[serde(alias = "liveProjectUrl", default)]
    pub link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(alias = "color", default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// 1-based number shown on the card, assigned by the deck. Accepted on
    /// input and overwritten.
    #[serde(default)]
    pub display_index: usize,
}

impl Card {
    pub fn new(title: impl Into<String>, summary: Vec<String>, image_refs: Vec<String>, link_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary,
            image_refs,
            link_url: link_url.into(),
            client: None,
            theme: None,
            display_index: 0,
        }
    }

    /// Two-digit label, e.g. `"01"`.
    pub fn display_label(&self) -> String {
        format!("{:02}", self.display_index)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    List(Vec<Card>),
    Wrapped { cards: Vec<Card> },
}

/// The ordered, immutable list of cards a showcase is built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(mut cards: Vec<Card>) -> Self {
        let n = cards.len();
        // Numbered while walking the reversed list, which leaves the
        // first-defined card as 01.
        for (reversed, card) in cards.iter_mut().rev().enumerate() {
            card.display_index = n - reversed;
        }
        Self { cards }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DeckFile = serde_json::from_str(json).map_err(|source| StackError::Decode {
            what: "card deck",
            source,
        })?;
        Ok(match file {
            DeckFile::List(cards) | DeckFile::Wrapped { cards } => Self::new(cards),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, position: usize) -> Option<&Card> {
        self.cards.get(position)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self::new(cards)
    }
}
