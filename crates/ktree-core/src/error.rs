//! Error types for the dependency discovery engine.

use thiserror::Error;

use crate::model::Uid;

/// Result type for `ktree-core` operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal failure kinds. Per-kind fetch problems, partial discovery and
/// resolver parse failures are not represented here — they are non-fatal
/// and collected as [`Warning`]s instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// No API groups could be listed at all.
    #[error("could not reach the cluster's discovery API: {source}")]
    DiscoveryUnavailable {
        #[source]
        source: kube::Error,
    },

    /// The root reference matched no node in the fetched set.
    #[error("no object matches reference '{reference}'")]
    RootNotFound { reference: String },

    /// The root reference matched more than one node.
    #[error("reference '{reference}' is ambiguous between: {}", candidates.join(", "))]
    AmbiguousRoot {
        reference: String,
        candidates: Vec<String>,
    },

    /// No Helm release record could be found for the given name/namespace.
    #[error("no Helm release '{release}' found in namespace '{namespace}'")]
    HelmReleaseNotFound { release: String, namespace: String },

    /// A Helm release record was found but its payload could not be decoded.
    #[error("failed to decode Helm release '{release}': {reason}")]
    HelmReleaseDecodeFailed { release: String, reason: String },

    /// An adjacency referenced a UID absent from the NodeMap. This is a
    /// defensive check; invariants 1 and 4 should make it unreachable.
    #[error("inconsistent graph: {detail}")]
    InconsistentGraph { detail: String },

    /// The caller canceled the operation before it could complete.
    #[error("operation canceled")]
    Canceled,

    /// Passthrough for a Kubernetes API error that doesn't fit a more
    /// specific variant above.
    #[error(transparent)]
    Api(#[from] kube::Error),
}

/// A non-fatal condition surfaced during discovery, fetch, Helm expansion or
/// relationship resolution. The pipeline keeps running; warnings accumulate
/// and are handed back to the caller alongside the result.
#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn dangling(from: &Uid, to: &Uid) -> Self {
        Self::new(format!(
            "dropped dangling reference from {from} to {to}: target was not fetched"
        ))
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
