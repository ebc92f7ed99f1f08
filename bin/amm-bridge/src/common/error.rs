use alloy_primitives::hex::FromHexError;
use amm_bridge::BridgeError;

/// Error types of the amm-bridge subcommands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Failed to read a file or stdin
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Failed to encode JSON output
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// The bridge rejected the input
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// Failed to set up logging
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the amm-bridge subcommands
pub type Result<T> = std::result::Result<T, CliError>;
