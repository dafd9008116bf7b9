use crate::error::{CsrfError, Result};
use formguard_session::SessionStore;
use rand::Rng;
use serde_json::Value;
use std::collections::VecDeque;
use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};

/// Random bytes per token; hex encoding doubles the length
pub const TOKEN_BYTES: usize = 16;

/// Generate a new random token: 32 lowercase hex characters.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; TOKEN_BYTES] = rng.r#gen();
    hex::encode(random_bytes)
}

fn token_matches(stored: &str, candidate: &str) -> bool {
    stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}

/// Bounded, oldest-first list of live tokens kept in a session.
///
/// The list lives at a single reserved key of a session the store does not
/// own. Every operation reads the list, changes it and writes it back, so
/// callers sharing one session between threads must serialize access.
///
/// # Examples
///
/// ```
/// use formguard::TokenStore;
/// use formguard_session::MemorySession;
///
/// let mut session = MemorySession::new();
/// let mut store = TokenStore::new(&mut session, "csrf.token", 50);
///
/// let token = store.issue();
/// assert!(store.consume(&token).is_ok());
/// assert!(store.consume(&token).is_err());
/// ```
#[derive(Debug)]
pub struct TokenStore<S> {
    session: S,
    session_key: String,
    limit: usize,
}

impl<S: SessionStore> TokenStore<S> {
    pub fn new(session: S, session_key: impl Into<String>, limit: usize) -> Self {
        Self {
            session,
            session_key: session_key.into(),
            limit,
        }
    }

    /// Issue a new token and append it to the session's list.
    ///
    /// When the append brings the list to exactly `limit + 1` entries the
    /// oldest entry is dropped.
    pub fn issue(&mut self) -> String {
        let token = generate_token();
        let mut tokens = self.load();

        tokens.push_back(token.clone());
        if self.limit.checked_add(1) == Some(tokens.len()) {
            tokens.pop_front();
            debug!(key = %self.session_key, limit = self.limit, "Evicted oldest CSRF token");
        }

        trace!(key = %self.session_key, live = tokens.len(), "Issued CSRF token");
        self.save(tokens);
        token
    }

    /// Consume a token, removing it from the list.
    ///
    /// Fails with [`CsrfError::InvalidToken`] if the token is not live, in
    /// which case the session is left untouched. Only the first matching
    /// entry is removed.
    pub fn consume(&mut self, candidate: &str) -> Result<()> {
        let mut tokens = self.load();
        let position = tokens
            .iter()
            .position(|stored| token_matches(stored, candidate))
            .ok_or(CsrfError::InvalidToken)?;

        tokens.remove(position);
        trace!(key = %self.session_key, live = tokens.len(), "Consumed CSRF token");
        self.save(tokens);
        Ok(())
    }

    /// Check whether a token is live without consuming it.
    pub fn contains(&self, candidate: &str) -> bool {
        self.load()
            .iter()
            .any(|stored| token_matches(stored, candidate))
    }

    /// Snapshot of the live tokens, oldest first.
    pub fn tokens(&self) -> VecDeque<String> {
        self.load()
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    fn load(&self) -> VecDeque<String> {
        match self.session.get(&self.session_key) {
            None | Some(Value::Null) => VecDeque::new(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(key = %self.session_key, error = %e, "Discarding malformed CSRF token list");
                VecDeque::new()
            }),
        }
    }

    fn save(&mut self, tokens: VecDeque<String>) {
        let list = tokens.into_iter().map(Value::String).collect();
        self.session.set(&self.session_key, Value::Array(list));
    }
}
