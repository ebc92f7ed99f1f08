//! Error taxonomy of the bridge precompile.
//!
//! Every failure surfaced to the EVM is a [`BridgeError`]: a stable numeric [`ErrorCode`], a short
//! message and an optional detail. The detail is always passed through [`sanitize_detail`] before
//! it is stored, so host paths, source locations and network literals never reach a caller.

use core::fmt;

use alloy_primitives::Bytes;
use alloy_sol_types::SolError;
use amm_bridge_contracts::IAmmBridge;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{constants::bounds::MAX_ERROR_DETAIL_LENGTH, engine::EngineError};

/// Stable error codes of the bridge. The numeric values are part of the interface and must never
/// be renumbered.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Calldata or payload failed decoding or validation.
    InvalidInput = 1,
    /// The referenced pool does not exist.
    PoolNotFound = 2,
    /// The swap was rejected by the engine.
    SwapFailed = 3,
    /// A read-only query was rejected by the engine.
    QueryFailed = 4,
    /// The precompile itself is misconfigured or hit an unexpected condition.
    Internal = 5,
    /// The caller is not allowed to perform the call.
    Unauthorized = 6,
    /// Joining a pool was rejected by the engine.
    JoinFailed = 7,
    /// Exiting a pool was rejected by the engine.
    ExitFailed = 8,
    /// The IBC transfer following a swap failed.
    IbcFailed = 9,
}

impl ErrorCode {
    /// Returns the numeric value of the code.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the code for a numeric value, if it is one of the known codes.
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::InvalidInput,
            2 => Self::PoolNotFound,
            3 => Self::SwapFailed,
            4 => Self::QueryFailed,
            5 => Self::Internal,
            6 => Self::Unauthorized,
            7 => Self::JoinFailed,
            8 => Self::ExitFailed,
            9 => Self::IbcFailed,
            _ => return None,
        })
    }
}

/// A failure of a bridge call, rendered as
/// `precompile error [code=N]: <message>[: <sanitized detail>]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeError {
    code: ErrorCode,
    message: String,
    detail: Option<String>,
}

impl BridgeError {
    /// Creates an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), detail: None }
    }

    /// Creates an [`ErrorCode::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an [`ErrorCode::Unauthorized`] error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an [`ErrorCode::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// The error returned when a state-mutating method is called in a read-only context.
    pub fn write_protection(method: &str) -> Self {
        Self::unauthorized("write protection")
            .with_detail(format!("{method} cannot be called in a read-only context"))
    }

    /// Wraps an engine error. The code is taken from [`map_engine_error`], falling back to
    /// `default` when the engine error has no specific mapping.
    pub fn from_engine(err: &EngineError, default: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(map_engine_error(err, default), message).with_detail(err)
    }

    /// Attaches a detail to the error. The detail is sanitized before it is stored.
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(sanitize_detail(&detail.to_string()));
        self
    }

    /// Returns the error code.
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the sanitized detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Encodes the error as `PrecompileError(uint8,string)` revert data.
    pub fn abi_encode_revert(&self) -> Bytes {
        IAmmBridge::PrecompileError { code: self.code.as_u8(), message: self.to_string() }
            .abi_encode()
            .into()
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "precompile error [code={}]: {}", self.code.as_u8(), self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl core::error::Error for BridgeError {}

/// Maps an engine error to the error code surfaced to the EVM. Errors without a specific mapping
/// keep `default`, which is the code of the failing operation.
pub const fn map_engine_error(err: &EngineError, default: ErrorCode) -> ErrorCode {
    match err {
        EngineError::PoolNotFound(_) => ErrorCode::PoolNotFound,
        EngineError::InvalidArgument(_) => ErrorCode::InvalidInput,
        EngineError::Unauthorized(_) => ErrorCode::Unauthorized,
        EngineError::IbcTransfer(_) => ErrorCode::IbcFailed,
        EngineError::InsufficientFunds(_) |
        EngineError::SlippageExceeded(_) |
        EngineError::DenomNotFound(_) |
        EngineError::Other(_) => default,
    }
}

/// Marker appended to a detail cut at [`MAX_ERROR_DETAIL_LENGTH`] bytes.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Redaction rules, applied in order. Each entry is a pattern and its replacement.
static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // goroutine headers of foreign stack dumps
        (r"goroutine\s+\d*(?:\s*\[[^\]]*\])?:?", "[redacted]"),
        // source file references, with or without `:line[:col]`
        (r"[\w./\\-]*\.(?:rs|go|js|ts|py|cpp|cc|c|h|java)\b(?::\d+(?::\d+)?)?:?", "[source]"),
        // module import paths
        (
            r"\b(?:github\.com|gitlab\.com|bitbucket\.org|golang\.org|gopkg\.in|google\.golang\.org|cosmossdk\.io|crates\.io)/[\w.@/-]*",
            "[module]",
        ),
        (r"\b[a-z_][a-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*){2,}", "[module]"),
        // well known host directories, wherever they appear
        (r"/(?:home|root|Users|usr|tmp|var|opt|etc|srv|mnt|proc)/[^\s,;)'\x22]*", "[path]"),
        (r"[A-Za-z]:\\[^\s,;)'\x22]*", "[path]"),
        // any other absolute path at a token boundary
        (r"(^|[\s(\[\x22'=])(?:/[\w.-]+)+/?", "${1}[path]"),
        // loopback and any-address literals
        (r"(?i)localhost(?::\d+)?", "[addr]"),
        (r"127\.\d{1,3}\.\d{1,3}\.\d{1,3}(?::\d+)?", "[addr]"),
        (r"0\.0\.0\.0(?::\d+)?", "[addr]"),
        (r"\[::1?\](?::\d+)?", "[addr]"),
        (r"(^|[^\w:])::1?\b", "${1}[addr]"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (Regex::new(pattern).expect("redaction patterns are valid"), replacement)
    })
    .collect()
});

/// Removes host filesystem paths, stack-frame file references, module import paths and
/// loopback/any-address literals from `detail`, and truncates the result to
/// [`MAX_ERROR_DETAIL_LENGTH`] bytes followed by [`TRUNCATION_MARKER`].
pub fn sanitize_detail(detail: &str) -> String {
    let mut sanitized = detail.to_owned();
    for (pattern, replacement) in REDACTIONS.iter() {
        if pattern.is_match(&sanitized) {
            sanitized = pattern.replace_all(&sanitized, *replacement).into_owned();
        }
    }

    if sanitized.len() > MAX_ERROR_DETAIL_LENGTH {
        let mut end = MAX_ERROR_DETAIL_LENGTH;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized.truncate(end);
        sanitized.push_str(TRUNCATION_MARKER);
    }
    sanitized
}
