//! Error types for ledgerchain

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid block linkage at block {index}")]
    InvalidBlockLinkage { index: u64 },
    #[error("Invalid proof of work at block {index}")]
    InvalidProofOfWork { index: u64 },
    #[error("A chain must contain at least the genesis block")]
    EmptyChain,
    #[error("Stale tip: proof was searched against {expected}, but the tip is now {actual}")]
    StaleTip { expected: String, actual: String },
    #[error("Proof search was cancelled")]
    SearchCancelled,
    #[error("Proof search worker failed: {0}")]
    WorkerFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ChainError {
    fn from(err: tokio::task::JoinError) -> Self {
        ChainError::WorkerFailed(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
