//! Core error types for wakeguard-core.
//!
//! Nothing in this crate is allowed to terminate a wake session abnormally:
//! sensor and permission failures surface to the user only as a manual
//! confirmation path, content failures are recovered behind the content
//! source, and audio failures degrade the alarm signal instead of stopping
//! it. These types exist so the degraded paths are explicit, not so callers
//! can bubble a failure out of a session.

use thiserror::Error;

/// Core error type for wakeguard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Sensor-related errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Challenge-content errors (always recovered internally)
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Audio resource errors (degrade, don't fail)
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Sensor-specific errors.
///
/// Any unexpected strategy failure is collapsed into `Unavailable` at the
/// round-controller boundary and routed to the strategy's fallback path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor does not exist on this device or cannot be started.
    #[error("sensor unavailable")]
    Unavailable,

    /// The user denied the permission the sensor needs.
    #[error("sensor permission denied")]
    PermissionDenied,
}

/// Challenge-content errors.
///
/// These never reach a strategy: `ChallengeContentSource` catches every
/// variant and serves from the local pool instead.
#[derive(Error, Debug)]
pub enum ContentError {
    /// Transport-level failure talking to the generation endpoint.
    #[error("content request failed: {0}")]
    Http(String),

    /// The generation endpoint did not answer within the request budget.
    #[error("content request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The response body did not have the expected shape for the kind.
    #[error("malformed content response: {0}")]
    MalformedResponse(String),

    /// The response parsed but failed the per-kind output validator.
    #[error("content rejected: {0}")]
    Rejected(String),

    /// No async runtime could be constructed for the HTTP client.
    #[error("content runtime unavailable: {0}")]
    Runtime(String),
}

/// Audio resource errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The looping bed for a sound profile failed to load.
    #[error("failed to load audio bed '{profile}': {message}")]
    LoadFailed { profile: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
