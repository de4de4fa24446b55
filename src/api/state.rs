use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::models::{Cart, ReadingSettings};
use crate::services::{OfflineManager, RecommendationService};
use crate::store::ContentStore;

/// Per-user state that lives for the life of the process, the server-side
/// counterpart of what the storefront kept in component state
#[derive(Default)]
pub struct Session {
    pub cart: Cart,
    pub reading_settings: ReadingSettings,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub cache: TtlCache,
    pub offline: OfflineManager,
    pub recommendations: RecommendationService,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, cache: TtlCache, offline: OfflineManager) -> Self {
        let recommendations = RecommendationService::new(store.clone());
        Self {
            store,
            cache,
            offline,
            recommendations,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Runs a closure against the user's session, creating it on first touch
    pub async fn with_session<T>(&self, user_id: Uuid, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        f(sessions.entry(user_id).or_default())
    }
}
