use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Content, RecommendationSource, RecommendedContent},
    store::ContentStore,
};

/// How many candidates each branch fetches before merging
const BRANCH_FETCH_LIMIT: i64 = 20;

/// Generates personalized storefront recommendations
///
/// Blends four independently-sourced branches: content-based (weighted by the
/// category frequencies of the user's library), collaborative (what similar
/// users own), trending (recently added), and popular (most-held, shuffled).
/// Results are tagged with their source, deduplicated by content id keeping
/// the first occurrence in fixed branch priority order, and truncated to the
/// requested count.
///
/// A failed branch degrades to an empty list: partial results beat an error
/// page. There is no retry and no caching of scores.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn ContentStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Builds up to `count` recommendations for the user
    pub async fn recommend(&self, user_id: Uuid, count: usize) -> Vec<RecommendedContent> {
        let (content_based, collaborative, trending, popular) = tokio::join!(
            self.content_based(user_id),
            self.collaborative(user_id),
            self.trending(),
            self.popular(),
        );

        // Branch priority: content > collaborative > trending > popular
        let branches = [
            (
                RecommendationSource::ContentBased,
                Self::or_empty(content_based, "content_based"),
            ),
            (
                RecommendationSource::Collaborative,
                Self::or_empty(collaborative, "collaborative"),
            ),
            (
                RecommendationSource::Trending,
                Self::or_empty(trending, "trending"),
            ),
            (
                RecommendationSource::Popular,
                Self::or_empty(popular, "popular"),
            ),
        ];

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for (source, items) in branches {
            for content in items {
                if seen.insert(content.id) {
                    merged.push(RecommendedContent { content, source });
                }
            }
        }
        merged.truncate(count);

        tracing::debug!(
            user_id = %user_id,
            returned = merged.len(),
            requested = count,
            "Recommendations assembled"
        );

        merged
    }

    /// Converts a branch failure into an empty contribution
    fn or_empty(result: AppResult<Vec<Content>>, branch: &'static str) -> Vec<Content> {
        match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(branch, error = %e, "Recommendation branch failed, skipping");
                Vec::new()
            }
        }
    }

    /// Unowned content from the categories the user reads most
    async fn content_based(&self, user_id: Uuid) -> AppResult<Vec<Content>> {
        let library = self.store.user_library(user_id).await?;
        if library.is_empty() {
            return Ok(Vec::new());
        }

        // Frequency count over the user's library rows
        let mut frequency: HashMap<String, usize> = HashMap::new();
        for owned in &library {
            *frequency.entry(owned.category.clone()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(&String, usize)> =
            frequency.iter().map(|(c, n)| (c, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let categories: Vec<String> = ranked.into_iter().map(|(c, _)| c.clone()).collect();

        let owned_ids: Vec<Uuid> = library.iter().map(|c| c.id).collect();
        let mut candidates = self
            .store
            .content_in_categories(categories, owned_ids, BRANCH_FETCH_LIMIT)
            .await?;

        // Favorite categories first; the sort is stable, so recency order
        // within a category survives
        candidates.sort_by(|a, b| {
            let weight_a = frequency.get(&a.category).copied().unwrap_or(0);
            let weight_b = frequency.get(&b.category).copied().unwrap_or(0);
            weight_b.cmp(&weight_a)
        });

        Ok(candidates)
    }

    /// Content owned by users with overlapping libraries
    async fn collaborative(&self, user_id: Uuid) -> AppResult<Vec<Content>> {
        let similar = self.store.similar_users(user_id).await?;
        if similar.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .content_by_similar_users(user_id, BRANCH_FETCH_LIMIT)
            .await
    }

    /// Recently added catalog items
    async fn trending(&self) -> AppResult<Vec<Content>> {
        self.store.recent_content(BRANCH_FETCH_LIMIT).await
    }

    /// Widely held catalog items, shuffled so the storefront rotates
    async fn popular(&self) -> AppResult<Vec<Content>> {
        let mut popular = self.store.popular_content(BRANCH_FETCH_LIMIT).await?;
        popular.shuffle(&mut rand::thread_rng());
        Ok(popular)
    }
}
