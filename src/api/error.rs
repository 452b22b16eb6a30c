use reqwest::StatusCode;
use thiserror::Error;

/// Classified failure from an API call.
///
/// Every non-success outcome is folded into one of four kinds up front so
/// that downstream code never inspects raw response shapes. Only `Auth`
/// carries a session effect; the session controller ignores the rest and
/// leaves them for the caller to display.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server (or a local precheck) says the credential is invalid.
    /// 401/403, or an authenticated call attempted with no credential held.
    #[error("Authentication failed: {message}")]
    Auth { status: Option<u16>, message: String },

    /// Caller-correctable input problem (other 4xx).
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Transient backend fault: 5xx, or a response that could not be decoded.
    #[error("Server error: {message}")]
    Server { status: Option<u16>, message: String },

    /// Transport-level failure, no response at all.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Classify a non-success HTTP response.
    ///
    /// 401/403 map to `Auth`; other 4xx map to `Validation` with a message
    /// pulled out of the body; 5xx and everything unexpected map to `Server`.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let code = status.as_u16();
        match code {
            401 | 403 => ApiError::Auth {
                status: Some(code),
                message: Self::extract_message(body)
                    .unwrap_or_else(|| "credential rejected".to_string()),
            },
            400..=499 => ApiError::Validation {
                status: code,
                message: Self::extract_message(body)
                    .unwrap_or_else(|| format!("Request failed ({})", code)),
            },
            _ => ApiError::Server {
                status: Some(code),
                message: Self::truncate_body(
                    &Self::extract_message(body).unwrap_or_else(|| body.to_string()),
                ),
            },
        }
    }

    /// An authenticated call was attempted with no credential held; no
    /// network request is made in that case.
    pub fn missing_credential() -> Self {
        ApiError::Auth {
            status: None,
            message: "no credential held for an authenticated call".to_string(),
        }
    }

    /// A response arrived but its body did not match what the endpoint is
    /// documented to return.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ApiError::Server {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// HTTP status of the underlying response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status, .. } => *status,
            ApiError::Validation { status, .. } => Some(*status),
            ApiError::Server { status, .. } => *status,
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
        }
    }

    /// Pull a human-readable message out of an error body.
    ///
    /// The server reports field problems as `{"errors": {...}}` with the
    /// offending fields as keys, or as `{"errors": "..."}` for a single
    /// message. Plain-text bodies fall back to their first non-empty line.
    fn extract_message(body: &str) -> Option<String> {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            match value.get("errors") {
                Some(serde_json::Value::String(s)) => return Some(s.clone()),
                Some(serde_json::Value::Object(map)) => {
                    if let Some(first) = map.values().find_map(|v| v.as_str()) {
                        return Some(first.to_string());
                    }
                }
                _ => {}
            }
            if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
                return Some(message.to_string());
            }
            return None;
        }
        body.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }

    /// Truncate a response body to avoid carrying excessive data in errors.
    /// The cut backs up to a char boundary so multi-byte text cannot panic.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_and_403_classify_as_auth() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));

        let err = ApiError::from_status(StatusCode::FORBIDDEN, "denied");
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_4xx_with_field_errors_classifies_as_validation() {
        let body = r#"{"errors": {"username": "Username already taken"}}"#;
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        match err {
            ApiError::Validation { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Username already taken");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_4xx_with_string_errors_field() {
        let body = r#"{"errors": "Password too short"}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        match err {
            ApiError::Validation { message, .. } => assert_eq!(message, "Password too short"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_4xx_with_plain_text_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "\n  Invalid tag list\n");
        match err {
            ApiError::Validation { message, .. } => assert_eq!(message, "Invalid tag list"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_5xx_classifies_as_server() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(!err.is_auth());
        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, ApiError::Server { .. }));
    }

    #[test]
    fn test_missing_credential_is_auth_without_status() {
        let err = ApiError::missing_credential();
        assert!(err.is_auth());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_multibyte_server_body_truncates_on_char_boundary() {
        // 400 three-byte chars put a char straddling the 500-byte cut.
        let body = "€".repeat(400);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        match err {
            ApiError::Server { message, .. } => {
                assert!(message.contains("truncated"));
                assert!(message.len() < 600);
            }
            other => panic!("expected Server, got {:?}", other),
        }
    }

    #[test]
    fn test_long_server_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        match err {
            ApiError::Server { message, .. } => {
                assert!(message.len() < 600);
                assert!(message.contains("truncated"));
            }
            other => panic!("expected Server, got {:?}", other),
        }
    }
}
