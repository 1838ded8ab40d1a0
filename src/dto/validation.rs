//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_USERNAME_LENGTH: usize = 150;

/// Validates a username: 1 to 150 characters among letters, digits and `@.+-_`.
///
/// # Examples
///
/// ```ignore
/// validate_username("goalie_42")   // Ok
/// validate_username("")            // Err - blank
/// validate_username("net minder")  // Err - space
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        let mut err = ValidationError::new("username_blank");
        err.message = Some("This field may not be blank.".into());
        return Err(err);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters.").into(),
        );
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        let mut err = ValidationError::new("username_format");
        err.message = Some(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("testuser").is_ok());
        assert!(validate_username("foo.bar+1@rink").is_ok());
        assert!(validate_username("goalie_42-b").is_ok());
    }

    #[test]
    fn test_validate_username_blank() {
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_username_invalid_format() {
        assert!(validate_username("net minder").is_err()); // space
        assert!(validate_username("bad/name").is_err()); // slash
        assert!(validate_username(&"a".repeat(151)).is_err()); // too long
    }
}
