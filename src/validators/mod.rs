//! Input validation for invitation requests.

pub mod email;
pub mod name;
pub mod token;

pub use email::{normalize_email, validate_email};
pub use name::validate_display_name;
pub use token::validate_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email cannot be empty")]
    EmailEmpty,
    #[error("Email is too long (max 254 characters)")]
    EmailTooLong,
    #[error("Invalid email format")]
    EmailInvalidFormat,
    #[error("{0} cannot be empty")]
    NameEmpty(&'static str),
    #[error("{0} is too long (max 100 characters)")]
    NameTooLong(&'static str),
    #[error("Invitation token is missing")]
    TokenEmpty,
    #[error("Invitation token is malformed")]
    TokenMalformed,
}
