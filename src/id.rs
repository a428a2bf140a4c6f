//! Prefixed ID generation for Pagelure entities.
//!
//! All IDs use a `pl_` brand prefix so internal identifiers can never be
//! confused with the external transaction ids payment providers send us.
//!
//! Format: `pl_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["pl_usr_", "pl_page_", "pl_rcg_"];

/// Validate that a string is a valid Pagelure prefixed ID.
///
/// Cheap format check to reject garbage before hitting the database.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    User,
    Page,
    /// A processed payment transaction (recharge) record.
    Recharge,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "pl_usr",
            Self::Page => "pl_page",
            Self::Recharge => "pl_rcg",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

/// Generate a user-facing capability token for public page URLs.
///
/// 122 bits of entropy from uuid v4; uniqueness is additionally enforced
/// by the UNIQUE index on users.public_token.
pub fn gen_public_token() -> String {
    Uuid::new_v4().as_simple().to_string()
}
