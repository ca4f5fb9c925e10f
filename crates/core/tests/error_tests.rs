// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use min_trade_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn server() {
        let err = CoreError::Server {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "Server error (502): Bad Gateway");
    }

    #[test]
    fn malformed_response() {
        let err = CoreError::MalformedResponse("missing field `isin`".into());
        assert_eq!(err.to_string(), "Malformed response: missing field `isin`");
    }

    #[test]
    fn not_found() {
        let err = CoreError::NotFound("FR0010315770".into());
        assert_eq!(err.to_string(), "Fund not found: FR0010315770");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("amount must be positive".into());
        assert_eq!(err.to_string(), "Validation failed: amount must be positive");
    }

    #[test]
    fn invalid_transition() {
        let err = CoreError::InvalidTransition {
            state: "Step3".into(),
            action: "next".into(),
        };
        assert_eq!(err.to_string(), "Action 'next' is not allowed in state Step3");
    }

    #[test]
    fn config() {
        let err = CoreError::Config("base_url must not be empty".into());
        assert_eq!(err.to_string(), "Configuration error: base_url must not be empty");
    }
}

// ── Retry classification ────────────────────────────────────────────

mod retryable {
    use super::*;

    #[test]
    fn network_failures_are_retryable() {
        assert!(CoreError::Network("timeout".into()).is_retryable());
    }

    #[test]
    fn server_5xx_is_retryable() {
        for status in [500, 502, 503, 504] {
            let err = CoreError::Server {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "{status} should be retryable");
        }
    }

    #[test]
    fn rate_limit_is_retryable() {
        let err = CoreError::Server {
            status: 429,
            message: "Too Many Requests".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 404, 422] {
            let err = CoreError::Server {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "{status} should not be retryable");
        }
    }

    #[test]
    fn local_errors_are_not_retryable() {
        assert!(!CoreError::MalformedResponse("x".into()).is_retryable());
        assert!(!CoreError::ValidationError("x".into()).is_retryable());
        assert!(!CoreError::NotFound("x".into()).is_retryable());
        assert!(!CoreError::Config("x".into()).is_retryable());
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn serde_json_error_becomes_malformed_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::MalformedResponse(_)));
    }

    #[test]
    fn question_mark_propagates_serde_errors() {
        fn parse(raw: &str) -> Result<u32, CoreError> {
            Ok(serde_json::from_str(raw)?)
        }
        assert_eq!(parse("7").unwrap(), 7);
        assert!(matches!(parse("\"seven\""), Err(CoreError::MalformedResponse(_))));
    }

    #[test]
    fn errors_are_debug_printable() {
        let err = CoreError::Server {
            status: 500,
            message: "boom".into(),
        };
        let debug = format!("{err:?}");
        assert!(debug.contains("Server"));
        assert!(debug.contains("500"));
    }
}
