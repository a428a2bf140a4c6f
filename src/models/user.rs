use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Basic email format validation.
///
/// Intentionally permissive - not RFC 5322, just enough to reject garbage
/// before it lands in the users table and becomes the key payments are
/// reconciled against.
pub fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(AppError::BadRequest("Email cannot be empty".into()));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    let local_part = parts[0];
    let domain_part = parts[1];

    if local_part.is_empty() || local_part.contains(' ') {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    if domain_part.is_empty() || !domain_part.contains('.') {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    if domain_part.starts_with('.') || domain_part.ends_with('.') {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    Ok(())
}

/// Account holder. The `credits` balance is mutated exclusively through
/// the ledger operations - no other code path may write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Capability token identifying the owner in public page URLs.
    pub public_token: String,
    pub credits: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data required to register a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("user.name+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("no-at-sign").is_err());
        assert!(validate_email_format("two@@x.com").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@").is_err());
        assert!(validate_email_format("a@nodot").is_err());
        assert!(validate_email_format("a@.com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
    }
}
