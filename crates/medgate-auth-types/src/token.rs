//! Opaque session tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

/// Session lifetime in hours.
pub const SESSION_DURATION_HOURS: i64 = 8;

/// Random bytes per session token (256 bits).
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate an unguessable, URL-safe session token.
///
/// ```
/// let token = medgate_auth_types::token::generate_session_token();
/// assert_eq!(token.len(), 43);
/// ```
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; SESSION_TOKEN_BYTES] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}
