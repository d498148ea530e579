//! # Deck Scripting
//!
//! Rhai API for authoring a deck in script form.
//!
//! ## Responsibilities
//! - **DeckHandle**: shared, script-visible list of cards
//! - **Authoring**: `new_deck`, `add_card`, `set_client`, `card_count`
//! - **Evaluation**: `eval_deck` runs a script that evaluates to a deck

use crate::card::{Card, Deck};
use crate::error::{Result, StackError};
use rhai::{Array, Dynamic, Engine, EvalAltResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A deck under construction by a script.
#[derive(Clone, Default)]
pub struct DeckHandle {
    pub cards: Arc<Mutex<Vec<Card>>>,
}

impl DeckHandle {
    pub fn lock_cards(&self) -> std::result::Result<MutexGuard<'_, Vec<Card>>, Box<EvalAltResult>> {
        self.cards.lock().map_err(|_| "Deck lock poisoned".into())
    }
}

fn string_list(value: Dynamic, what: &str) -> std::result::Result<Vec<String>, Box<EvalAltResult>> {
    if value.is_string() {
        return Ok(vec![value.into_string()?]);
    }
    let items: Array = value
        .into_array()
        .map_err(|got| format!("{what} must be a string or an array, got {got}"))?;
    items
        .into_iter()
        .map(|item| {
            item.into_string().map_err(|got| {
                Box::<EvalAltResult>::from(format!("{what} entries must be strings, got {got}"))
            })
        })
        .collect()
}

/// Register deck-authoring functions.
pub fn register_rhai_api(engine: &mut Engine) {
    engine.register_type_with_name::<DeckHandle>("Deck");

    engine.register_fn("new_deck", DeckHandle::default);

    engine.register_fn(
        "add_card",
        |deck: &mut DeckHandle,
         title: &str,
         summary: Dynamic,
         images: Array,
         url: &str|
         -> std::result::Result<(), Box<EvalAltResult>> {
            let summary = string_list(summary, "summary")?;
            let images = string_list(Dynamic::from_array(images), "images")?;
            deck.lock_cards()?.push(Card::new(title, summary, images, url));
            Ok(())
        },
    );

    engine.register_fn(
        "set_client",
        |deck: &mut DeckHandle, client: &str| -> std::result::Result<(), Box<EvalAltResult>> {
            let mut cards = deck.lock_cards()?;
            let card = cards
                .last_mut()
                .ok_or("set_client called before any add_card")?;
            card.client = Some(client.to_string());
            Ok(())
        },
    );

    engine.register_fn(
        "card_count",
        |deck: &mut DeckHandle| -> std::result::Result<i64, Box<EvalAltResult>> {
            Ok(deck.lock_cards()?.len() as i64)
        },
    );
}

/// Runs `script` and returns the deck it evaluates to.
pub fn eval_deck(script: &str) -> Result<Deck> {
    let mut engine = Engine::new();
    register_rhai_api(&mut engine);

    let handle = engine
        .eval::<DeckHandle>(script)
        .map_err(|e| StackError::Script(e.to_string()))?;
    let cards = handle
        .cards
        .lock()
        .map_err(|_| StackError::Script("deck lock poisoned".into()))?
        .clone();
    debug!(cards = cards.len(), "deck script evaluated");
    Ok(Deck::new(cards))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_builds_a_numbered_deck() {
        let deck = eval_deck(
            r#"
            let deck = new_deck();
            deck.add_card("Resume Builder", "AI resume builder", ["/a.png", "/b.png"], "https://resume");
            deck.set_client("Resume Builder");
            deck.add_card("Health", ["one", "two"], [], "http://health");
            if deck.card_count() != 2 { throw "wrong count"; }
            deck
            "#,
        )
        .unwrap();

        assert_eq!(deck.len(), 2);
        let first = deck.get(0).unwrap();
        assert_eq!(first.summary, vec!["AI resume builder"]);
        assert_eq!(first.image_refs.len(), 2);
        assert_eq!(first.client.as_deref(), Some("Resume Builder"));
        assert_eq!(first.display_label(), "01");
        assert_eq!(deck.get(1).unwrap().summary, vec!["one", "two"]);
    }

    #[test]
    fn script_errors_surface_as_stack_errors() {
        let err = eval_deck(r#"let d = new_deck(); d.add_card("x", 42, [], ""); d"#).unwrap_err();
        assert!(matches!(err, StackError::Script(msg) if msg.contains("summary")));

        let err = eval_deck("let d = new_deck(); d.set_client(\"nobody\"); d").unwrap_err();
        assert!(matches!(err, StackError::Script(_)));

        assert!(matches!(eval_deck("42"), Err(StackError::Script(_))));
    }
}
