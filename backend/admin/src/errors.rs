//! Application-wide error types.
//!
//! Every gateway failure is classified into one of these kinds and
//! propagated to the caller unchanged; nothing here retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    /// The node could not be reached, answered with garbage, or refused a read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The signer declined the request, or no account is authorised.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The transaction reverted or was mined with a failure status.
    #[error("Chain error: {0}")]
    Chain(String),

    /// The contract returned its zero-valued default for the requested key.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied value that cannot be turned into a contract argument.
    #[error("Invalid input: {0}")]
    Input(String),
}

impl AdminError {
    /// Short machine-readable identifier, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Rejected(_) => "rejected",
            Self::Chain(_) => "chain",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Input(_) => "input",
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        Self::Transport(format!("malformed RPC payload: {e}"))
    }
}

impl From<alloy_sol_types::Error> for AdminError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Transport(format!("undecodable contract data: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
