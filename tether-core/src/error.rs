//! Error types for tether-core

use thiserror::Error;

/// Errors raised while binding streams to component state.
///
/// Configuration errors are raised eagerly while a binding is being set up.
/// The remaining variants are raised while an emission is being delivered
/// and propagate to whoever pushed that emission.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connected component was given a store both as a prop and at connect time")]
    ConflictingStores,

    #[error("connected component has no store: pass one at connect time or as a prop")]
    MissingStore,

    #[error("invalid field binding `{field}`: {reason}")]
    InvalidField { field: String, reason: &'static str },

    #[error("component is already mounted")]
    AlreadyMounted,

    #[error("component was unmounted and cannot be mounted again")]
    Remounted,

    #[error("projection failed: {0}")]
    Projection(String),

    #[error("failed to convert value for field `{field}`: {source}")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("patch must serialize to an object, got {0}")]
    PatchShape(&'static str),

    #[error("no action named `{0}`")]
    UnknownAction(String),
}

impl Error {
    /// Build a projection error from any displayable message.
    pub fn projection(message: impl std::fmt::Display) -> Self {
        Self::Projection(message.to_string())
    }

    /// Whether this error is raised while setting up a binding, as opposed
    /// to while delivering an emission.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConflictingStores
                | Self::MissingStore
                | Self::InvalidField { .. }
                | Self::AlreadyMounted
                | Self::Remounted
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
