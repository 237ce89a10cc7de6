//! Runtime errors

use thiserror::Error;

use ludeme_foundation::SiteType;

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime errors
///
/// Evaluation errors are defensive: a tree that passed static analysis
/// never produces them. Evaluation only reads the state store, so a failed
/// call leaves it untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported node configuration in {node}: {reason}")]
    Unsupported { node: String, reason: String },

    #[error("hint position {position} is out of range (hint vector has {len} entries)")]
    MissingHint { position: usize, len: usize },

    #[error("region not declared by the game: {0}")]
    UnknownRegion(String),

    #[error("{site_type} site {site} is out of range ({len} sites)")]
    SiteOutOfRange {
        site: usize,
        site_type: SiteType,
        len: usize,
    },

    #[error("invalid game description: {0}")]
    InvalidGame(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unsupported(node: impl ToString, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            node: node.to_string(),
            reason: reason.into(),
        }
    }
}
