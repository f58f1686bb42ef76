//! Token generation.
//!
//! Production tokens are minted by the hosted `invite_org_member` function.
//! The in-memory backend uses these helpers to mint tokens of the same shape.

use rand::Rng;

/// Default token length in characters.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Generates a random alphanumeric token (a-z, A-Z, 0-9) of `length` characters.
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

pub fn generate_token_default() -> String {
    generate_token(DEFAULT_TOKEN_LENGTH)
}
