use std::{error::Error as StdError, sync::Arc};

use thiserror::Error;

/// Errors sent down the `error` channel by `rxflow` operators.
///
/// Producers are free to emit any `Error + Send + Sync` value. `Transform` is
/// what `try_map` reports; `Message` is a convenience for callers that need an
/// ad hoc error without defining their own type.
#[derive(Debug, Error)]
pub enum ObservableError {
    /// A fallible transform passed to `try_map` returned an error.
    #[error("map transform failed")]
    Transform(#[source] Box<dyn StdError + Send + Sync>),

    #[error("{0}")]
    Message(String),
}

impl ObservableError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// Wraps the error into the shared form carried by the `error` channel.
    #[must_use]
    pub fn into_shared(self) -> Arc<dyn StdError + Send + Sync> {
        Arc::new(self)
    }
}
