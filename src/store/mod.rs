use uuid::Uuid;

/// Storage abstraction for catalog and profile data
///
/// This module is the boundary between HTTP handlers / services and the
/// database. Everything the hosted backend used to answer for the storefront
/// goes through this trait, so handlers can be exercised against the in-memory
/// implementation without a running Postgres.
use crate::{
    error::AppResult,
    models::{Bookmark, Content, GiftCard, Purchase},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Trait for catalog and profile storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// All catalog items
    async fn list_content(&self) -> AppResult<Vec<Content>>;

    /// A single catalog item by id
    async fn get_content(&self, id: Uuid) -> AppResult<Option<Content>>;

    /// Content the user has acquired, most recent first
    async fn user_library(&self, user_id: Uuid) -> AppResult<Vec<Content>>;

    /// Catalog items in any of the given categories, excluding the given ids
    async fn content_in_categories(
        &self,
        categories: Vec<String>,
        exclude: Vec<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<Content>>;

    /// Users whose libraries overlap the given user's
    async fn similar_users(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Content owned by similar users that the given user does not own yet
    async fn content_by_similar_users(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Content>>;

    /// Most recently added catalog items
    async fn recent_content(&self, limit: i64) -> AppResult<Vec<Content>>;

    /// Catalog items ordered by how many libraries hold them
    async fn popular_content(&self, limit: i64) -> AppResult<Vec<Content>>;

    /// Resolves a bearer token to a user id
    async fn user_for_token(&self, token: String) -> AppResult<Option<Uuid>>;

    /// Records a purchase and adds the content to the user's library
    async fn insert_purchase(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        amount_cents: i64,
    ) -> AppResult<Purchase>;

    /// The user's bookmarks, most recent first
    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<Bookmark>>;

    async fn insert_bookmark(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        position: i64,
        note: Option<String>,
    ) -> AppResult<Bookmark>;

    /// Deletes one of the user's bookmarks; false when it does not exist
    async fn delete_bookmark(&self, user_id: Uuid, bookmark_id: Uuid) -> AppResult<bool>;

    /// Accumulates reading time and updates the last position
    async fn record_reading(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        seconds_read: i64,
        last_position: i64,
    ) -> AppResult<()>;

    /// Marks a gift card redeemed; `None` for unknown or already-used codes
    async fn redeem_gift_card(&self, code: String, user_id: Uuid) -> AppResult<Option<GiftCard>>;
}
