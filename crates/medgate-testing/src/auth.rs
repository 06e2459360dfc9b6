//! Bearer-header helpers for handler-level tests.

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};

/// A session token as a client would present it.
pub struct MockSession {
    pub token: String,
}

impl MockSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// A freshly generated token that no store has issued.
    pub fn unissued() -> Self {
        Self::new(medgate_auth_types::token::generate_session_token())
    }

    /// Headers carrying `Authorization: Bearer <token>`.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .expect("session token is a valid header value"),
        );
        map
    }
}
