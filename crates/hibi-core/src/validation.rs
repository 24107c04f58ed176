//! Input checks that run before anything is written.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 50;
pub const MAX_FAVORITE_QUOTE_LENGTH: usize = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Recurring tasks need a start date")]
    MissingStartDate,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    WeakPassword,

    #[error("Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters")]
    DisplayNameTooLong,

    #[error("Favorite quote must be at most {MAX_FAVORITE_QUOTE_LENGTH} characters")]
    QuoteTooLong,
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Accepts `local@domain.tld`: no whitespace anywhere, one `@` separating
/// non-empty parts, and a dot inside the domain with text on both sides.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(email.to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.rsplit_once('@').ok_or_else(invalid)?;
    if local.is_empty() {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::DisplayNameTooLong);
    }
    Ok(())
}

pub fn validate_favorite_quote(quote: &str) -> Result<(), ValidationError> {
    if quote.chars().count() > MAX_FAVORITE_QUOTE_LENGTH {
        return Err(ValidationError::QuoteTooLong);
    }
    Ok(())
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}
