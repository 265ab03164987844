//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Maximum length of a display name (users and teams).
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Normalizes an email address for storage and comparison.
///
/// Emails are compared case-insensitively everywhere; storing the lowercase,
/// trimmed form lets the database uniqueness constraints do the same.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that an email address is well formed and within length limits.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() || normalized.len() > MAX_EMAIL_LENGTH || !normalized.validate_email()
    {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email address".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a human-facing name: 1-100 characters, no control characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_DISPLAY_NAME_LENGTH {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some("Name must be between 1 and 100 characters".into());
        return Err(err);
    }
    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("display_name_chars");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  U2@X.com "), "u2@x.com");
        assert_eq!(normalize_email("already@lower.io"), "already@lower.io");
    }

    #[test]
    fn test_validate_email_address_accepts_generated() {
        for _ in 0..20 {
            let email: String = SafeEmail().fake();
            assert!(validate_email_address(&email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_validate_email_address_rejects_garbage() {
        assert!(validate_email_address("").is_err());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("@x.com").is_err());
    }

    #[test]
    fn test_validate_email_address_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email_address(&email).is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Design Team").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(101)).is_err());
        assert!(validate_display_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_validation_error_message() {
        let err = validate_display_name("").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Name must be between 1 and 100 characters"
        );
    }
}
