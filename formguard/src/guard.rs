use crate::config::CsrfConfig;
use crate::error::{CsrfError, Result};
use crate::request::FormRequest;
use crate::token::TokenStore;
use formguard_session::SessionStore;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Synchronizer-token CSRF guard.
///
/// Requests with a protected method (POST, PUT and DELETE by default) must
/// carry a token previously returned by [`generate_token`](Self::generate_token)
/// in the configured form field. Each token is accepted once. All other
/// methods pass through untouched.
///
/// The guard borrows the session: construct it with `&mut session` and the
/// session stays with the caller.
///
/// # Examples
///
/// ```
/// use formguard::{CsrfError, CsrfGuard, HttpRequest, HttpResponse};
/// use formguard_session::MemorySession;
///
/// let mut session = MemorySession::new();
/// let mut guard = CsrfGuard::new(&mut session);
///
/// // Rendering the form
/// let token = guard.generate_token();
///
/// // Handling the submission
/// let req = HttpRequest::new("POST", "/comments").with_form([("_token", token.as_str())]);
/// let response = guard.process(req.clone(), |_req| HttpResponse::ok()).unwrap();
/// assert_eq!(response.status, 200);
///
/// // Replaying it fails
/// let err = guard.process(req, |_req| HttpResponse::ok()).unwrap_err();
/// assert_eq!(err, CsrfError::InvalidToken);
/// ```
#[derive(Debug)]
pub struct CsrfGuard<S> {
    store: TokenStore<S>,
    config: Arc<CsrfConfig>,
}

impl<S: SessionStore> CsrfGuard<S> {
    /// Create a guard with the default configuration
    pub fn new(session: S) -> Self {
        Self::from_shared(session, Arc::new(CsrfConfig::default()))
    }

    /// Create a guard with a custom configuration
    pub fn with_config(session: S, config: CsrfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_shared(session, Arc::new(config)))
    }

    pub(crate) fn from_shared(session: S, config: Arc<CsrfConfig>) -> Self {
        Self {
            store: TokenStore::new(session, config.session_key.clone(), config.limit),
            config,
        }
    }

    /// Check a request without forwarding it.
    ///
    /// On success a protected request's token has been consumed. On failure
    /// the session is unchanged.
    pub fn verify<R: FormRequest>(&mut self, request: &R) -> Result<()> {
        let method = request.method();
        if !self.config.is_protected(method) {
            trace!(method = %method, "Method not protected, skipping CSRF check");
            return Ok(());
        }

        let Some(token) = self.extract_token(request) else {
            warn!(method = %method, field = %self.config.form_key, "CSRF token missing");
            return Err(CsrfError::MissingToken);
        };

        self.store.consume(token).inspect_err(|_| {
            warn!(method = %method, "CSRF token rejected");
        })?;

        debug!(method = %method, "CSRF token accepted");
        Ok(())
    }

    /// Check a request and forward it to `next` on success.
    ///
    /// `next` runs exactly once when the check passes and never when it
    /// fails. Its result is returned unchanged.
    pub fn process<R, T, F>(&mut self, request: R, next: F) -> Result<T>
    where
        R: FormRequest,
        F: FnOnce(R) -> T,
    {
        self.verify(&request)?;
        Ok(next(request))
    }

    /// Issue a token for a form about to be rendered.
    pub fn generate_token(&mut self) -> String {
        self.store.issue()
    }

    pub fn limit(&self) -> usize {
        self.store.limit()
    }

    pub fn session_key(&self) -> &str {
        self.store.session_key()
    }

    pub fn form_key(&self) -> &str {
        &self.config.form_key
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Token list backing this guard.
    pub fn tokens(&self) -> &TokenStore<S> {
        &self.store
    }

    pub fn session(&self) -> &S {
        self.store.session()
    }

    pub fn into_session(self) -> S {
        self.store.into_session()
    }

    fn extract_token<'r, R: FormRequest>(&self, request: &'r R) -> Option<&'r str> {
        let from_body = request
            .parsed_body()
            .and_then(|body| body.get(&self.config.form_key))
            .map(String::as_str);

        from_body.or_else(|| {
            self.config
                .header_name
                .as_deref()
                .and_then(|name| request.header(name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{HttpRequest, HttpResponse};
    use formguard_session::MemorySession;
    use std::cell::Cell;

    #[test]
    fn test_get_passes_without_token() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        let calls = Cell::new(0);

        let response = guard
            .process(HttpRequest::new("GET", "/form"), |_| {
                calls.set(calls.get() + 1);
                HttpResponse::ok()
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_safe_methods_do_not_touch_session() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        for method in ["GET", "HEAD", "OPTIONS", "PATCH", "TRACE"] {
            assert!(guard.verify(&HttpRequest::new(method, "/")).is_ok());
        }
        assert!(guard.session().is_empty());
    }

    #[test]
    fn test_post_without_token_is_missing() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        let calls = Cell::new(0);

        let result = guard.process(HttpRequest::new("POST", "/submit"), |_| {
            calls.set(calls.get() + 1);
        });

        assert_eq!(result, Err(CsrfError::MissingToken));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_post_with_other_fields_is_missing() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        guard.generate_token();

        let req = HttpRequest::new("PUT", "/items/1").with_form([("name", "widget")]);
        assert_eq!(guard.verify(&req), Err(CsrfError::MissingToken));
        assert_eq!(guard.tokens().len(), 1);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        guard.generate_token();
        let calls = Cell::new(0);

        let req = HttpRequest::new("POST", "/submit").with_form([("_token", "invalid_token_333")]);
        let result = guard.process(req, |_| calls.set(calls.get() + 1));

        assert_eq!(result, Err(CsrfError::InvalidToken));
        assert_eq!(calls.get(), 0);
        assert_eq!(guard.tokens().len(), 1);
    }

    #[test]
    fn test_non_string_json_token_is_invalid() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        let token = guard.generate_token();

        for body in [r#"{"_token": 123}"#, r#"{"_token": null}"#, r#"{"_token": ["x"]}"#] {
            let req = HttpRequest::new("POST", "/submit").with_body(body);
            assert_eq!(guard.verify(&req), Err(CsrfError::InvalidToken));
        }
        assert_eq!(guard.tokens().tokens(), [token]);
    }

    #[test]
    fn test_valid_token_consumed_once() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        let token = guard.generate_token();
        let req = HttpRequest::new("DELETE", "/items/1").with_form([("_token", token.as_str())]);

        assert!(guard.verify(&req).is_ok());
        assert!(guard.tokens().is_empty());
        assert_eq!(guard.verify(&req), Err(CsrfError::InvalidToken));
    }

    #[test]
    fn test_custom_form_key() {
        let config = CsrfConfig::default().with_form_key("authenticity_token");
        let mut guard = CsrfGuard::with_config(MemorySession::new(), config).unwrap();
        let token = guard.generate_token();

        let wrong_field = HttpRequest::new("POST", "/").with_form([("_token", token.as_str())]);
        assert_eq!(guard.verify(&wrong_field), Err(CsrfError::MissingToken));

        let right_field =
            HttpRequest::new("POST", "/").with_form([("authenticity_token", token.as_str())]);
        assert!(guard.verify(&right_field).is_ok());
    }

    #[test]
    fn test_header_fallback_when_configured() {
        let config = CsrfConfig::default().with_header_name("X-CSRF-Token");
        let mut guard = CsrfGuard::with_config(MemorySession::new(), config).unwrap();
        let token = guard.generate_token();

        let req = HttpRequest::new("POST", "/api").with_header("x-csrf-token", token.as_str());
        assert!(guard.verify(&req).is_ok());
    }

    #[test]
    fn test_header_ignored_by_default() {
        let mut guard = CsrfGuard::new(MemorySession::new());
        let token = guard.generate_token();

        let req = HttpRequest::new("POST", "/api").with_header("X-CSRF-Token", token.as_str());
        assert_eq!(guard.verify(&req), Err(CsrfError::MissingToken));
    }

    #[test]
    fn test_form_field_takes_precedence_over_header() {
        let config = CsrfConfig::default().with_header_name("X-CSRF-Token");
        let mut guard = CsrfGuard::with_config(MemorySession::new(), config).unwrap();
        let token = guard.generate_token();

        let req = HttpRequest::new("POST", "/")
            .with_header("X-CSRF-Token", token.as_str())
            .with_form([("_token", "stale")]);
        assert_eq!(guard.verify(&req), Err(CsrfError::InvalidToken));
        assert!(guard.tokens().contains(&token));
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = CsrfConfig::default().with_session_key("");
        assert!(matches!(
            CsrfGuard::with_config(MemorySession::new(), config),
            Err(CsrfError::Config(_))
        ));
    }

    #[test]
    fn test_accessors() {
        let config = CsrfConfig::default().with_limit(10).with_session_key("app.csrf");
        let guard = CsrfGuard::with_config(MemorySession::new(), config).unwrap();

        assert_eq!(guard.limit(), 10);
        assert_eq!(guard.session_key(), "app.csrf");
        assert_eq!(guard.form_key(), "_token");
        assert_eq!(guard.config().limit, 10);
    }
}
