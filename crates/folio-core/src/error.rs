use crate::stage::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a deck or mounting the showcase.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("trigger region {0} is not on the stage")]
    MissingTriggerRegion(NodeId),

    #[error("card node {0} is not on the stage")]
    MissingCardNode(NodeId),

    #[error("deck holds {expected} cards but the view laid out {found}")]
    DeckMismatch { expected: usize, found: usize },

    #[error("showcase is already mounted")]
    AlreadyMounted,

    #[error("invalid scroll marker `{input}`: {reason}")]
    Marker { input: String, reason: &'static str },

    #[error("failed to decode {what}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deck script failed: {0}")]
    Script(String),
}

pub type Result<T> = std::result::Result<T, StackError>;
