use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9+\-\s()]{7,15}$").expect("phone pattern compiles")
});

/// Form-level rejection, reported back to the operator verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid { field, reason: reason.into() }
    }
}

/// Trims the value and treats blank input as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    non_blank(value).ok_or(ValidationError::Required(field))
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Blank-tolerant optional email: absent stays absent, present must be well-formed.
pub fn optional_email(field: &'static str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match non_blank(value) {
        Some(email) if !is_valid_email(&email) => {
            Err(ValidationError::invalid(field, "must be a valid email address"))
        }
        other => Ok(other),
    }
}

/// Case-insensitive substring match used by every list search box.
pub fn matches_search(field: Option<&str>, needle: &str) -> bool {
    field
        .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}
