use serde::Deserialize;
use thiserror::Error;

/// Failures when talking to the backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx response. Carries the server-supplied message when the body
    /// had one, otherwise a generic status string.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Optional error payload the backend attaches to failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extracts the `message` field from an error body, falling back to a
/// generic status line when the body is missing, malformed, or silent.
pub(crate) fn message_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_server_message_when_present() {
        let body = r#"{"message": "Email already taken"}"#;
        assert_eq!(message_from_body(400, body), "Email already taken");
    }

    #[test]
    fn falls_back_on_missing_message() {
        assert_eq!(message_from_body(500, "{}"), "Request failed with status 500");
        assert_eq!(
            message_from_body(502, "<html>bad gateway</html>"),
            "Request failed with status 502"
        );
        assert_eq!(message_from_body(401, ""), "Request failed with status 401");
    }

    #[test]
    fn falls_back_on_null_message() {
        let body = r#"{"message": null}"#;
        assert_eq!(message_from_body(404, body), "Request failed with status 404");
    }

    #[test]
    fn http_error_displays_its_message() {
        let err = ApiError::Http {
            status: 400,
            message: "Invalid amount".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid amount");
    }
}
