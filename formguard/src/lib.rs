//! # formguard
//!
//! Cross-Site Request Forgery (CSRF) protection with session-backed,
//! single-use tokens.
//!
//! ## Features
//!
//! - ✅ **Synchronizer Tokens** - 128-bit random tokens kept in the session
//! - ✅ **Single Use** - a token is removed as soon as it is accepted
//! - ✅ **Bounded** - at most `limit` live tokens per session, oldest evicted first
//! - ✅ **Borrowed Session** - the guard never owns the session it writes to
//! - ✅ **Middleware Integration** - async adapter with per-session locking
//!
//! ## Quick Start
//!
//! ```rust
//! use formguard::{CsrfConfig, CsrfGuard};
//! use formguard_session::MemorySession;
//!
//! let mut session = MemorySession::new();
//!
//! // Defaults: "csrf.token" session key, "_token" form field, 50 live tokens
//! let guard = CsrfGuard::new(&mut session);
//! assert_eq!(guard.limit(), 50);
//!
//! // Or with custom settings
//! let config = CsrfConfig::default()
//!     .with_form_key("authenticity_token")
//!     .with_limit(20);
//! let guard = CsrfGuard::with_config(&mut session, config).unwrap();
//! assert_eq!(guard.form_key(), "authenticity_token");
//! ```
//!
//! ## Token Lifecycle
//!
//! ```rust
//! use formguard::{CsrfError, CsrfGuard, HttpRequest};
//! use formguard_session::MemorySession;
//!
//! let mut session = MemorySession::new();
//! let mut guard = CsrfGuard::new(&mut session);
//!
//! // Issued when the form is rendered
//! let token = guard.generate_token();
//! assert_eq!(token.len(), 32);
//!
//! // Consumed when the form comes back
//! let submit = HttpRequest::new("POST", "/profile").with_form([("_token", token.as_str())]);
//! assert!(guard.verify(&submit).is_ok());
//!
//! // Gone afterwards
//! assert_eq!(guard.verify(&submit), Err(CsrfError::InvalidToken));
//!
//! // No token at all is a different error
//! let bare = HttpRequest::new("POST", "/profile");
//! assert_eq!(guard.verify(&bare), Err(CsrfError::MissingToken));
//! ```
//!
//! ## Usage as Middleware
//!
//! ```rust
//! use formguard::{CsrfMiddleware, HttpRequest, HttpResponse, Middleware, Next};
//! use formguard_session::{MemorySession, SharedSession};
//!
//! # tokio_test::block_on(async {
//! let csrf = CsrfMiddleware::new(SharedSession::new(MemorySession::new()));
//! let token = csrf.generate_token();
//!
//! let next: Next = Box::new(|_req| Box::pin(async { HttpResponse::ok() }));
//! let req = HttpRequest::new("POST", "/submit").with_form([("_token", token.as_str())]);
//!
//! let response = csrf.handle(req, next).await.unwrap();
//! assert_eq!(response.status, 200);
//! # });
//! ```
//!
//! ## Concurrency
//!
//! [`CsrfGuard`] and [`TokenStore`] read the token list, change it and write
//! it back. They take `&mut` access to the session, which serializes use of
//! one handle, but nothing stops two handles to the same underlying session
//! from racing. Hosts that process requests of one session concurrently
//! should go through [`SharedSession`](formguard_session::SharedSession),
//! as [`CsrfMiddleware`] does.
//!
//! Tokens do not expire by time. A token stays valid until it is consumed or
//! evicted by newer tokens.

pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod request;
pub mod token;

pub use config::{CsrfConfig, DEFAULT_FORM_KEY, DEFAULT_LIMIT, DEFAULT_SESSION_KEY};
pub use error::{CsrfError, Result};
pub use guard::CsrfGuard;
pub use middleware::{CsrfMiddleware, Middleware, Next};
pub use request::{FormBody, FormRequest, HttpRequest, HttpResponse};
pub use token::{TOKEN_BYTES, TokenStore, generate_token};
