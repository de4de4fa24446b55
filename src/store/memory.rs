use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Bookmark, Content, GiftCard, LibraryEntry, Purchase, ReadingStatistic},
    store::ContentStore,
};

#[derive(Default)]
struct Inner {
    content: HashMap<Uuid, Content>,
    library: Vec<LibraryEntry>,
    purchases: Vec<Purchase>,
    bookmarks: Vec<Bookmark>,
    statistics: Vec<ReadingStatistic>,
    gift_cards: Vec<GiftCard>,
    tokens: HashMap<String, Uuid>,
    similar: HashMap<Uuid, Vec<Uuid>>,
}

/// In-memory store for tests and running without Postgres
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_content(&self, content: Content) {
        self.inner.write().await.content.insert(content.id, content);
    }

    /// Registers a bearer token resolving to the given user
    pub async fn add_token(&self, token: impl Into<String>, user_id: Uuid) {
        self.inner.write().await.tokens.insert(token.into(), user_id);
    }

    /// Puts content into a user's library without a purchase
    pub async fn grant_library(&self, user_id: Uuid, content_id: Uuid) {
        self.inner.write().await.library.push(LibraryEntry {
            user_id,
            content_id,
            acquired_at: Utc::now(),
        });
    }

    pub async fn add_gift_card(&self, card: GiftCard) {
        self.inner.write().await.gift_cards.push(card);
    }

    /// Fixes the similar-users answer for a user
    pub async fn set_similar_users(&self, user_id: Uuid, similar: Vec<Uuid>) {
        self.inner.write().await.similar.insert(user_id, similar);
    }

    pub async fn purchase_count(&self) -> usize {
        self.inner.read().await.purchases.len()
    }

    fn library_content(inner: &Inner, user_id: Uuid) -> Vec<Content> {
        let mut entries: Vec<&LibraryEntry> = inner
            .library
            .iter()
            .filter(|e| e.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| b.acquired_at.cmp(&a.acquired_at));
        entries
            .iter()
            .filter_map(|e| inner.content.get(&e.content_id).cloned())
            .collect()
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryStore {
    async fn list_content(&self) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        let mut all: Vec<Content> = inner.content.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn get_content(&self, id: Uuid) -> AppResult<Option<Content>> {
        Ok(self.inner.read().await.content.get(&id).cloned())
    }

    async fn user_library(&self, user_id: Uuid) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        Ok(Self::library_content(&inner, user_id))
    }

    async fn content_in_categories(
        &self,
        categories: Vec<String>,
        exclude: Vec<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Content> = inner
            .content
            .values()
            .filter(|c| categories.contains(&c.category) && !exclude.contains(&c.id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn similar_users(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner.similar.get(&user_id).cloned().unwrap_or_default())
    }

    async fn content_by_similar_users(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        let similar = inner.similar.get(&user_id).cloned().unwrap_or_default();
        let owned: Vec<Uuid> = inner
            .library
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.content_id)
            .collect();

        // Count how many similar users hold each item, most-held first
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for entry in &inner.library {
            if similar.contains(&entry.user_id) && !owned.contains(&entry.content_id) {
                *counts.entry(entry.content_id).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(Uuid, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .filter_map(|(id, _)| inner.content.get(&id).cloned())
            .collect())
    }

    async fn recent_content(&self, limit: i64) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        let mut all: Vec<Content> = inner.content.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn popular_content(&self, limit: i64) -> AppResult<Vec<Content>> {
        let inner = self.inner.read().await;
        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for entry in &inner.library {
            *counts.entry(entry.content_id).or_insert(0) += 1;
        }
        let mut all: Vec<Content> = inner.content.values().cloned().collect();
        all.sort_by(|a, b| {
            let holders_a = counts.get(&a.id).copied().unwrap_or(0);
            let holders_b = counts.get(&b.id).copied().unwrap_or(0);
            holders_b
                .cmp(&holders_a)
                .then(b.created_at.cmp(&a.created_at))
        });
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn user_for_token(&self, token: String) -> AppResult<Option<Uuid>> {
        Ok(self.inner.read().await.tokens.get(&token).copied())
    }

    async fn insert_purchase(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        amount_cents: i64,
    ) -> AppResult<Purchase> {
        let purchase = Purchase::new(user_id, content_id, amount_cents);
        let mut inner = self.inner.write().await;
        inner.purchases.push(purchase.clone());
        if !inner
            .library
            .iter()
            .any(|e| e.user_id == user_id && e.content_id == content_id)
        {
            inner.library.push(LibraryEntry {
                user_id,
                content_id,
                acquired_at: purchase.created_at,
            });
        }
        Ok(purchase)
    }

    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<Bookmark>> {
        let inner = self.inner.read().await;
        let mut marks: Vec<Bookmark> = inner
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        marks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(marks)
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
        self.inner.write().await.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn delete_bookmark(&self, user_id: Uuid, bookmark_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.bookmarks.len();
        inner
            .bookmarks
            .retain(|b| !(b.id == bookmark_id && b.user_id == user_id));
        Ok(inner.bookmarks.len() < before)
    }

    async fn record_reading(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        seconds_read: i64,
        last_position: i64,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(stat) = inner
            .statistics
            .iter_mut()
            .find(|s| s.user_id == user_id && s.content_id == content_id)
        {
            stat.seconds_read += seconds_read;
            stat.last_position = last_position;
            stat.updated_at = Utc::now();
        } else {
            inner.statistics.push(ReadingStatistic {
                user_id,
                content_id,
                seconds_read,
                last_position,
                updated_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn redeem_gift_card(&self, code: String, user_id: Uuid) -> AppResult<Option<GiftCard>> {
        let mut inner = self.inner.write().await;
        if let Some(card) = inner
            .gift_cards
            .iter_mut()
            .find(|c| c.code == code && !c.is_redeemed())
        {
            card.redeemed_by = Some(user_id);
            card.redeemed_at = Some(Utc::now());
            return Ok(Some(card.clone()));
        }
        Ok(None)
    }
}
