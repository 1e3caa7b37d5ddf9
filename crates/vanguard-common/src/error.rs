//! Error types for Vanguard.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Vanguard operations.
#[derive(Debug, Error)]
pub enum VanguardError {
    /// Asset errors (attack tables, sprite sheets)
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Asset loading errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset file missing
    #[error("Asset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Asset parsed but failed validation
    #[error("Invalid asset {}: {reason}", path.display())]
    Invalid {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type alias for Vanguard operations.
pub type VanguardResult<T> = Result<T, VanguardError>;
