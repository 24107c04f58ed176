//! Authentication provider error codes and their user-facing messages.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidCredential,
    InvalidEmail,
    EmailAlreadyInUse,
    TooManyRequests,
    WrongPassword,
    WeakPassword,
    RequiresRecentLogin,
    /// Any code outside the fixed set, kept for diagnostics
    Unknown(String),
}

impl AuthErrorCode {
    pub fn from_provider_code(code: &str) -> Self {
        match code {
            "auth/invalid-credential" => AuthErrorCode::InvalidCredential,
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/too-many-requests" => AuthErrorCode::TooManyRequests,
            "auth/wrong-password" => AuthErrorCode::WrongPassword,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/requires-recent-login" => AuthErrorCode::RequiresRecentLogin,
            other => {
                tracing::warn!(code = other, "unrecognized auth provider error code");
                AuthErrorCode::Unknown(other.to_string())
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidCredential | AuthErrorCode::WrongPassword => {
                "The email address or password is incorrect."
            }
            AuthErrorCode::InvalidEmail => "The email address is not valid.",
            AuthErrorCode::EmailAlreadyInUse => "This email address is already in use.",
            AuthErrorCode::TooManyRequests => "Too many attempts. Please wait a while and try again.",
            AuthErrorCode::WeakPassword => "The password is too weak. Use at least 6 characters.",
            AuthErrorCode::RequiresRecentLogin => "Please sign in again to continue.",
            AuthErrorCode::Unknown(_) => "Something went wrong. Please check your input.",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}
