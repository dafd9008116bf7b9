use crate::request::HttpResponse;
use http::StatusCode;
use thiserror::Error;

/// Errors raised by the CSRF guard.
///
/// The two token errors are kept apart so callers can render different
/// pages for a form that was submitted without a token and one whose token
/// is unknown, already used or evicted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    /// The protected request carried no token at all
    #[error("Missing CSRF token")]
    MissingToken,

    /// The token is not among the live tokens of this session
    #[error("Invalid CSRF token")]
    InvalidToken,

    #[error("Invalid CSRF configuration: {0}")]
    Config(String),
}

impl CsrfError {
    /// HTTP status a host should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CsrfError::MissingToken | CsrfError::InvalidToken => StatusCode::FORBIDDEN,
            CsrfError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CsrfError::MissingToken)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, CsrfError::InvalidToken)
    }

    /// Render the error as a plain text response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::new(self.status_code().as_u16())
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(self.to_string().into_bytes())
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_are_forbidden() {
        assert_eq!(CsrfError::MissingToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(CsrfError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            CsrfError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_errors_stay_distinguishable() {
        assert!(CsrfError::MissingToken.is_missing());
        assert!(!CsrfError::MissingToken.is_invalid());
        assert!(CsrfError::InvalidToken.is_invalid());
        assert_ne!(
            CsrfError::MissingToken.to_string(),
            CsrfError::InvalidToken.to_string()
        );
    }

    #[test]
    fn test_into_response() {
        let response = CsrfError::InvalidToken.into_response();
        assert_eq!(response.status, 403);
        assert_eq!(response.body, b"Invalid CSRF token");
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("text/plain; charset=utf-8")
        );
    }
}
