//! Six-digit consent verification codes.

use rand::RngExt;
use subtle::ConstantTimeEq;

/// Access window in minutes. Governs both code validity and the validity of the grant a
/// verified code produces.
pub const ACCESS_WINDOW_MINUTES: i64 = 30;

/// Verification code length in digits.
pub const CODE_LEN: usize = 6;

/// Generate a uniformly random, zero-padded six-digit code.
pub fn generate_verification_code() -> String {
    let mut rng = rand::rng();
    let value: u32 = rng.random_range(0..1_000_000);
    format!("{value:06}")
}

/// Compare a stored code with a submitted one without short-circuiting on the first
/// differing byte.
pub fn codes_match(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.trim().as_bytes()).into()
}
