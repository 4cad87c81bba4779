use switchboard_types::MenuName;
use thiserror::Error;

use crate::store::StoreError;

/// Error returned by an option callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu not found: {0}")]
    NotFound(MenuName),

    #[error("failed to persist current menu: {0}")]
    Persistence(#[from] StoreError),

    /// The action builder was driven into an impossible shape by a menu body.
    #[error("action builder invariant violated: {0}")]
    Invariant(String),

    #[error("callback not registered: {0}")]
    UnknownCallback(String),

    #[error("callback '{name}' failed: {source}")]
    Callback { name: String, source: CallbackError },

    #[error("transition chain exceeded {limit} steps: {chain:?}")]
    TransitionLimit { limit: usize, chain: Vec<MenuName> },
}
