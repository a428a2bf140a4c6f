use serde::{Deserialize, Serialize};

/// A trackable page. Publicly addressed by the owner's capability token
/// plus the slug; the slug is unique per owner, not globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub slug: String,
    pub color: String,
    pub image: String,
    pub description: String,
    pub created_at: i64,
}

/// Data required to create a new page.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePage {
    pub title: String,
    pub slug: String,
    pub color: String,
    pub image: String,
    pub description: String,
}
