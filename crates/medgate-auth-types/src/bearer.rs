//! `Authorization: Bearer <token>` extraction.

use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::HeaderMap;

/// Return the bearer token from the request headers.
///
/// `None` when the header is absent, empty, or not a `Bearer` credential. The session
/// layer reports each of these as a missing token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_owned())
        .filter(|token| !token.is_empty())
}
