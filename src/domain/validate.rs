//! Account and post field validation.
//!
//! Validation runs before any write; a failure must leave the store
//! untouched. Emails are compared and stored lowercased.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::{MAX_NAME_LEN, MAX_POST_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN};

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
            .expect("Invalid email regex defined in code")
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(FieldError::new(
            "name",
            format!("must be at least {MIN_NAME_LEN} characters"),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if !email_regex().is_match(email.trim()) {
        return Err(FieldError::new("email", "is not a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_post_content(content: &str) -> Result<(), FieldError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("content", "must not be empty"));
    }
    if trimmed.chars().count() > MAX_POST_LEN {
        return Err(FieldError::new(
            "content",
            format!("must be at most {MAX_POST_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_rejected_with_field() {
        let err = validate_name("Al").unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn three_char_name_passes() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("  Ana  ").is_ok());
    }

    #[test]
    fn email_grammar() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name+tag@sub.example.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn email_normalization_lowercases() {
        assert_eq!(normalize_email(" User@Example.COM "), "user@example.com");
    }

    #[test]
    fn short_password_is_weak() {
        let err = validate_password("12345").unwrap_err();
        assert_eq!(err.field, "password");
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn post_content_limits() {
        assert!(validate_post_content("hello").is_ok());
        assert!(validate_post_content("   ").is_err());
        assert!(validate_post_content(&"x".repeat(281)).is_err());
    }
}
