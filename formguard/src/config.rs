use crate::error::{CsrfError, Result};
use http::Method;
use std::env;

/// Default session key holding the live token list
pub const DEFAULT_SESSION_KEY: &str = "csrf.token";

/// Default form field carrying the submitted token
pub const DEFAULT_FORM_KEY: &str = "_token";

/// Default number of live tokens kept per session
pub const DEFAULT_LIMIT: usize = 50;

/// CSRF guard configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfConfig {
    /// Session key under which the token list is stored
    pub session_key: String,

    /// Form field name for the submitted token
    pub form_key: String,

    /// Maximum number of live tokens; the oldest is evicted first
    pub limit: usize,

    /// Methods that must present a token
    pub protected_methods: Vec<Method>,

    /// Header consulted when the form field is absent
    pub header_name: Option<String>,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            session_key: DEFAULT_SESSION_KEY.to_string(),
            form_key: DEFAULT_FORM_KEY.to_string(),
            limit: DEFAULT_LIMIT,
            protected_methods: vec![Method::POST, Method::PUT, Method::DELETE],
            header_name: None,
        }
    }
}

impl CsrfConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables.
    ///
    /// - `FORMGUARD_SESSION_KEY`
    /// - `FORMGUARD_FORM_KEY`
    /// - `FORMGUARD_TOKEN_LIMIT`
    /// - `FORMGUARD_HEADER_NAME`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup("FORMGUARD_SESSION_KEY") {
            config.session_key = key;
        }

        if let Some(key) = lookup("FORMGUARD_FORM_KEY") {
            config.form_key = key;
        }

        if let Some(limit) = lookup("FORMGUARD_TOKEN_LIMIT") {
            config.limit = limit.trim().parse().map_err(|_| {
                CsrfError::Config(format!("FORMGUARD_TOKEN_LIMIT is not a count: '{}'", limit))
            })?;
        }

        if let Some(header) = lookup("FORMGUARD_HEADER_NAME") {
            config.header_name = Some(header);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set session key
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Set form field name
    pub fn with_form_key(mut self, key: impl Into<String>) -> Self {
        self.form_key = key.into();
        self
    }

    /// Set token limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Replace the protected methods
    pub fn with_protected_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.protected_methods = methods.into_iter().collect();
        self
    }

    /// Also accept the token from a request header
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    /// Check that the configuration is usable.
    ///
    /// A limit of zero is allowed; every issued token is then evicted
    /// immediately.
    pub fn validate(&self) -> Result<()> {
        if self.session_key.is_empty() {
            return Err(CsrfError::Config("session key must not be empty".to_string()));
        }

        if self.form_key.is_empty() {
            return Err(CsrfError::Config("form key must not be empty".to_string()));
        }

        if matches!(self.header_name.as_deref(), Some("")) {
            return Err(CsrfError::Config("header name must not be empty".to_string()));
        }

        Ok(())
    }

    /// Whether requests with this method must present a token.
    ///
    /// Matching is exact and case-sensitive.
    pub fn is_protected(&self, method: &str) -> bool {
        self.protected_methods.iter().any(|m| m.as_str() == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = CsrfConfig::default();
        assert_eq!(config.session_key, "csrf.token");
        assert_eq!(config.form_key, "_token");
        assert_eq!(config.limit, 50);
        assert_eq!(config.header_name, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CsrfConfig::new()
            .with_session_key("_csrf")
            .with_form_key("csrf_token")
            .with_limit(5)
            .with_header_name("X-CSRF-Token");

        assert_eq!(config.session_key, "_csrf");
        assert_eq!(config.form_key, "csrf_token");
        assert_eq!(config.limit, 5);
        assert_eq!(config.header_name.as_deref(), Some("X-CSRF-Token"));
    }

    #[test]
    fn test_protected_methods() {
        let config = CsrfConfig::default();
        assert!(config.is_protected("POST"));
        assert!(config.is_protected("PUT"));
        assert!(config.is_protected("DELETE"));
        assert!(!config.is_protected("GET"));
        assert!(!config.is_protected("HEAD"));
        assert!(!config.is_protected("OPTIONS"));
        assert!(!config.is_protected("PATCH"));
        assert!(!config.is_protected("post"));
    }

    #[test]
    fn test_custom_protected_methods() {
        let config = CsrfConfig::default().with_protected_methods([Method::POST, Method::PATCH]);
        assert!(config.is_protected("PATCH"));
        assert!(!config.is_protected("DELETE"));
    }

    #[test]
    fn test_validate_rejects_empty_keys() {
        assert!(CsrfConfig::default().with_session_key("").validate().is_err());
        assert!(CsrfConfig::default().with_form_key("").validate().is_err());
        assert!(CsrfConfig::default().with_header_name("").validate().is_err());
        assert!(CsrfConfig::default().with_limit(0).validate().is_ok());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = CsrfConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CsrfConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CsrfConfig::from_lookup(lookup_from(&[
            ("FORMGUARD_SESSION_KEY", "app.csrf"),
            ("FORMGUARD_FORM_KEY", "authenticity_token"),
            ("FORMGUARD_TOKEN_LIMIT", " 10 "),
            ("FORMGUARD_HEADER_NAME", "X-CSRF-Token"),
        ]))
        .unwrap();

        assert_eq!(config.session_key, "app.csrf");
        assert_eq!(config.form_key, "authenticity_token");
        assert_eq!(config.limit, 10);
        assert_eq!(config.header_name.as_deref(), Some("X-CSRF-Token"));
    }

    #[test]
    fn test_from_lookup_bad_limit() {
        let err =
            CsrfConfig::from_lookup(lookup_from(&[("FORMGUARD_TOKEN_LIMIT", "lots")])).unwrap_err();
        assert!(matches!(err, CsrfError::Config(_)));
    }
}
