use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Join row recording that a user owns a piece of content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct LibraryEntry {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub acquired_at: DateTime<Utc>,
}

/// A purchase record created by the purchase endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(user_id: Uuid, content_id: Uuid, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}

/// A saved position inside a book or audiobook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    /// Location offset: page-character index for ebooks, seconds for audiobooks
    pub position: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Accumulated reading time and last position per user and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ReadingStatistic {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub seconds_read: i64,
    pub last_position: i64,
    pub updated_at: DateTime<Utc>,
}

/// Reader display preferences, session-scoped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingSettings {
    pub font_size: u8,
    pub theme: String,
    pub line_spacing: f32,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            theme: "light".to_string(),
            line_spacing: 1.5,
        }
    }
}

/// A redeemable store-credit card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct GiftCard {
    pub id: Uuid,
    pub code: String,
    pub amount_cents: i64,
    pub redeemed_by: Option<Uuid>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl GiftCard {
    pub fn new(code: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            amount_cents,
            redeemed_by: None,
            redeemed_at: None,
        }
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_by.is_some()
    }
}
