//! CLI settings file: the showcase and contact configs side by side.

use anyhow::{Context, Result};
use folio_contact::ContactConfig;
use folio_core::{Deck, ShowcaseConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The deck shipped with the site.
const DEFAULT_DECK: &str = include_str!("../assets/cards.json");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub showcase: ShowcaseConfig,
    pub contact: ContactConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("invalid settings in {}", path.display()))
    }
}

/// Loads the deck from a JSON file, a Rhai script, or the built-in default.
pub fn load_deck(deck: Option<&Path>, script: Option<&Path>) -> Result<Deck> {
    match (deck, script) {
        (_, Some(script)) => {
            let source = std::fs::read_to_string(script)
                .with_context(|| format!("failed to read deck script {}", script.display()))?;
            folio_core::scripting::eval_deck(&source)
                .with_context(|| format!("deck script {} failed", script.display()))
        }
        (Some(path), None) => Deck::load(path).with_context(|| format!("failed to load deck {}", path.display())),
        (None, None) => Deck::from_json_str(DEFAULT_DECK).context("built-in deck is invalid"),
    }
}
