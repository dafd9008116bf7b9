//! Async middleware adapter for the CSRF guard.

use crate::config::CsrfConfig;
use crate::error::CsrfError;
use crate::guard::CsrfGuard;
use crate::request::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use formguard_session::{SessionStore, SharedSession};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::trace;

/// Type alias for the next handler in the middleware chain
pub type Next =
    Box<dyn FnOnce(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send>;

/// Middleware trait for processing requests before they reach the handler
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request and optionally pass to next middleware
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, CsrfError>;
}

/// CSRF protection middleware over a shared session.
///
/// The session lock is held for the whole token check, so concurrent
/// submissions against one session cannot both consume the same token or
/// lose each other's writes. It is released before the next handler runs.
pub struct CsrfMiddleware<S> {
    session: SharedSession<S>,
    config: Arc<CsrfConfig>,
}

impl<S> Clone for CsrfMiddleware<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: SessionStore> CsrfMiddleware<S> {
    /// Create new CSRF middleware
    pub fn new(session: SharedSession<S>) -> Self {
        Self {
            session,
            config: Arc::new(CsrfConfig::default()),
        }
    }

    /// Create CSRF middleware with a custom configuration
    pub fn with_config(session: SharedSession<S>, config: CsrfConfig) -> Result<Self, CsrfError> {
        config.validate()?;
        Ok(Self {
            session,
            config: Arc::new(config),
        })
    }

    /// Generate CSRF token for a form
    pub fn generate_token(&self) -> String {
        let mut session = self.session.lock();
        let mut guard = CsrfGuard::from_shared(&mut *session, Arc::clone(&self.config));
        guard.generate_token()
    }

    /// Validate CSRF token from request
    pub fn verify(&self, req: &HttpRequest) -> Result<(), CsrfError> {
        let mut session = self.session.lock();
        let mut guard = CsrfGuard::from_shared(&mut *session, Arc::clone(&self.config));
        guard.verify(req)
    }

    /// Run the middleware and turn a rejection into a `403` response.
    pub async fn respond(&self, req: HttpRequest, next: Next) -> HttpResponse
    where
        S: Send + 'static,
    {
        self.handle(req, next)
            .await
            .unwrap_or_else(CsrfError::into_response)
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    pub fn session(&self) -> &SharedSession<S> {
        &self.session
    }
}

#[async_trait]
impl<S: SessionStore + Send + 'static> Middleware for CsrfMiddleware<S> {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, CsrfError> {
        self.verify(&req)?;
        trace!(method = %req.method, path = %req.path, "CSRF check passed, calling next");
        Ok(next(req).await)
    }
}
