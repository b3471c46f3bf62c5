//! CLI error type: wraps engine/IO/config failures and maps each to an
//! exit code (spec §6, §11).

use thiserror::Error;

use crate::exit_codes;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] ktree_core::EngineError),

    #[error("invalid root reference '{0}': expected <kind>/<name>, <kind> <name>, or a release name with --helm")]
    InvalidReference(String),

    #[error("--helm requires a namespace (-n)")]
    HelmNamespaceRequired,

    #[error(transparent)]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("invalid --output value: {0}")]
    InvalidOutputFormat(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(ktree_core::EngineError::RootNotFound { .. }) => exit_codes::NOT_FOUND,
            Self::Engine(ktree_core::EngineError::AmbiguousRoot { .. }) => exit_codes::AMBIGUOUS,
            Self::Engine(ktree_core::EngineError::HelmReleaseNotFound { .. }) => exit_codes::NOT_FOUND,
            Self::Engine(ktree_core::EngineError::DiscoveryUnavailable { .. }) => exit_codes::DISCOVERY_UNAVAILABLE,
            Self::Engine(ktree_core::EngineError::Canceled) => exit_codes::CANCELED,
            _ => exit_codes::INTERNAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
