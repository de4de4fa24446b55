use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Bookmark, Content, ContentType, GiftCard, Purchase},
    store::ContentStore,
};

const CONTENT_COLUMNS: &str = "id, title, author, category, content_type, price_cents, created_at";

/// Postgres-backed store
///
/// The collaborative-filtering reads go through the `get_similar_users` and
/// `get_books_by_similar_users` SQL functions created by the initial migration,
/// matching the stored procedures the hosted backend exposed.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw content row; `content_type` is stored as text
#[derive(FromRow)]
struct ContentRow {
    id: Uuid,
    title: String,
    author: String,
    category: String,
    content_type: String,
    price_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for Content {
    type Error = AppError;

    fn try_from(row: ContentRow) -> AppResult<Content> {
        let content_type = ContentType::parse(&row.content_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown content_type in database: {}", row.content_type))
        })?;
        Ok(Content {
            id: row.id,
            title: row.title,
            author: row.author,
            category: row.category,
            content_type,
            price_cents: row.price_cents,
            created_at: row.created_at,
        })
    }
}

fn convert_rows(rows: Vec<ContentRow>) -> AppResult<Vec<Content>> {
    rows.into_iter().map(Content::try_from).collect()
}

#[async_trait::async_trait]
impl ContentStore for PostgresStore {
    async fn list_content(&self) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content ORDER BY title",
            CONTENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn get_content(&self, id: Uuid) -> AppResult<Option<Content>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content WHERE id = $1",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Content::try_from).transpose()
    }

    async fn user_library(&self, user_id: Uuid) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT c.{} FROM content c \
             JOIN user_library ul ON ul.content_id = c.id \
             WHERE ul.user_id = $1 \
             ORDER BY ul.acquired_at DESC",
            CONTENT_COLUMNS.replace(", ", ", c.")
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn content_in_categories(
        &self,
        categories: Vec<String>,
        exclude: Vec<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content \
             WHERE category = ANY($1) AND NOT (id = ANY($2)) \
             ORDER BY created_at DESC \
             LIMIT $3",
            CONTENT_COLUMNS
        ))
        .bind(&categories)
        .bind(&exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn similar_users(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let users = sqlx::query_scalar::<_, Uuid>("SELECT * FROM get_similar_users($1)")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn content_by_similar_users(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM get_books_by_similar_users($1) LIMIT $2",
            CONTENT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn recent_content(&self, limit: i64) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM content ORDER BY created_at DESC LIMIT $1",
            CONTENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn popular_content(&self, limit: i64) -> AppResult<Vec<Content>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT c.{} FROM content c \
             LEFT JOIN user_library ul ON ul.content_id = c.id \
             GROUP BY c.id \
             ORDER BY COUNT(ul.user_id) DESC, c.created_at DESC \
             LIMIT $1",
            CONTENT_COLUMNS.replace(", ", ", c.")
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_rows(rows)
    }

    async fn user_for_token(&self, token: String) -> AppResult<Option<Uuid>> {
        let user = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_purchase(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        amount_cents: i64,
    ) -> AppResult<Purchase> {
        let purchase = Purchase::new(user_id, content_id, amount_cents);

        // Purchase row and library row land together or not at all
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO purchases (id, user_id, content_id, amount_cents, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(purchase.id)
        .bind(purchase.user_id)
        .bind(purchase.content_id)
        .bind(purchase.amount_cents)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO user_library (user_id, content_id, acquired_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, content_id) DO NOTHING",
        )
        .bind(purchase.user_id)
        .bind(purchase.content_id)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase.id,
            user_id = %user_id,
            content_id = %content_id,
            amount_cents,
            "Purchase recorded"
        );

        Ok(purchase)
    }

    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<Bookmark>> {
        let bookmarks = sqlx::query_as::<_, Bookmark>(
            "SELECT id, user_id, content_id, \"position\", note, created_at \
             FROM bookmarks WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookmarks)
    }

    async fn insert_bookmark(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        position: i64,
        note: Option<String>,
    ) -> AppResult<Bookmark> {
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            position,
            note,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO bookmarks (id, user_id, content_id, \"position\", note, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(bookmark.id)
        .bind(bookmark.user_id)
        .bind(bookmark.content_id)
        .bind(bookmark.position)
        .bind(&bookmark.note)
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await?;

        Ok(bookmark)
    }

    async fn delete_bookmark(&self, user_id: Uuid, bookmark_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(bookmark_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_reading(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        seconds_read: i64,
        last_position: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reading_statistics (user_id, content_id, seconds_read, last_position, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, content_id) DO UPDATE SET \
                 seconds_read = reading_statistics.seconds_read + EXCLUDED.seconds_read, \
                 last_position = EXCLUDED.last_position, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(user_id)
        .bind(content_id)
        .bind(seconds_read)
        .bind(last_position)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn redeem_gift_card(&self, code: String, user_id: Uuid) -> AppResult<Option<GiftCard>> {
        let card = sqlx::query_as::<_, GiftCard>(
            "UPDATE gift_cards SET redeemed_by = $2, redeemed_at = $3 \
             WHERE code = $1 AND redeemed_by IS NULL \
             RETURNING id, code, amount_cents, redeemed_by, redeemed_at",
        )
        .bind(code)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(card)
    }
}
