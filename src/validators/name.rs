use super::ValidationError;

/// Validates a display name such as an organization or inviter name.
/// `field` names the value in the error message.
pub fn validate_display_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::NameEmpty(field));
    }

    if trimmed.chars().count() > 100 {
        return Err(ValidationError::NameTooLong(field));
    }

    Ok(())
}
