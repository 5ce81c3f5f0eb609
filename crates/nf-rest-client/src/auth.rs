//! Authentication material for the REST API client

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fmt;

use crate::error::{RestClientError, RestClientResult};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "adminadminadmin";

/// Username/password pair exchanged for a bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Form fields posted to the token endpoint
    pub(crate) fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("username", &self.username), ("password", &self.password)]
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token returned by the token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> RestClientResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(RestClientError::InvalidToken(
                "token endpoint returned an empty body".into(),
            ));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters of the token, for display
    pub fn preview(&self, chars: usize) -> &str {
        match self.0.char_indices().nth(chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Apply the `Authorization: Bearer` header to a request
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) -> RestClientResult<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|e| RestClientError::InvalidToken(e.to_string()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}
