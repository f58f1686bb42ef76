use super::ValidationError;

const MAX_TOKEN_LENGTH: usize = 256;

/// Rejects tokens that cannot have been minted by the backend before
/// spending a remote call on them.
pub fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::TokenEmpty);
    }

    if token.len() > MAX_TOKEN_LENGTH || token.chars().any(char::is_whitespace) {
        return Err(ValidationError::TokenMalformed);
    }

    Ok(())
}
