use thiserror::Error;

/// Unified error type for the entire min-trade-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote fund service ─────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Fund not found: {0}")]
    NotFound(String),

    // ── Client state ────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Action '{action}' is not allowed in state {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Whether a user-initiated retry of the same action can plausibly succeed.
    ///
    /// Rate limiting and 5xx responses count as transient; everything else
    /// needs different input before retrying makes sense.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Network(_) => true,
            CoreError::Server { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::MalformedResponse(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest embeds the full URL; drop the query string so search terms
        // and filters don't end up in user-facing messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_decode() {
            CoreError::MalformedResponse(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
