use thiserror::Error;

/// Unified error type for the entire gaino-core library.
/// Fallible internals return `Result<T, CoreError>`; the sync and price
/// boundaries absorb these into degraded results instead of propagating.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Local files ─────────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Remote store / network ──────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store request failed ({endpoint}): HTTP {status}")]
    Store { endpoint: String, status: u16 },

    /// Conditional write rejected — the held version tag no longer matches
    /// the remote document. The one retryable store failure.
    #[error("Version tag mismatch on conditional write")]
    VersionConflict,

    #[error("Price feed error: {0}")]
    PriceFeed(String),

    // ── Facade ──────────────────────────────────────────────────────
    /// Surfaced to the presentation layer when a mutation could not be
    /// persisted. Deliberately does not distinguish conflict exhaustion
    /// from offline from transport failure.
    #[error("Save failed (conflict or offline)")]
    SaveRejected,
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so a
        // feed deployment key or token never ends up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
