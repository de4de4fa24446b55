use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Content, DownloadStatus, OfflineBook},
};

/// Simulated offline-download manager
///
/// Tracks per-content download records and persists them as a JSON blob on
/// disk, the way the storefront kept them in browser local storage. A
/// "download" is a background task that bumps the percentage on a fixed
/// interval until it reaches 100; no bytes move. Persistence failures are
/// logged and swallowed, so a full disk degrades the feature instead of
/// breaking requests.
///
/// Every start gets a fresh generation id and only the task holding the
/// current generation may advance a record, so a task orphaned by remove or
/// restart stops on its next tick instead of double-counting progress.
#[derive(Clone)]
pub struct OfflineManager {
    books: Arc<RwLock<HashMap<Uuid, OfflineBook>>>,
    /// Generation of the task currently allowed to advance each record
    active: Arc<RwLock<HashMap<Uuid, u64>>>,
    next_generation: Arc<AtomicU64>,
    path: Arc<PathBuf>,
    tick: Duration,
    step: u8,
}

impl OfflineManager {
    /// Loads tracked downloads from the state file, if present
    ///
    /// Progress timers do not survive a restart, so records still marked
    /// `downloading` come back as `failed`.
    pub fn load(path: impl Into<PathBuf>, tick: Duration, step: u8) -> AppResult<Self> {
        let path = path.into();
        let mut books = HashMap::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Internal(format!("Failed to read offline state: {}", e)))?;
            let records: Vec<OfflineBook> = serde_json::from_str(&raw)
                .map_err(|e| AppError::Internal(format!("Corrupt offline state: {}", e)))?;
            for mut book in records {
                if book.status == DownloadStatus::Downloading {
                    book.status = DownloadStatus::Failed;
                }
                books.insert(book.content_id, book);
            }
        }

        Ok(Self {
            books: Arc::new(RwLock::new(books)),
            active: Arc::new(RwLock::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(0)),
            path: Arc::new(path),
            tick,
            step: step.max(1),
        })
    }

    /// All tracked downloads, alphabetical by title
    pub async fn list(&self) -> Vec<OfflineBook> {
        let books = self.books.read().await;
        let mut all: Vec<OfflineBook> = books.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        all
    }

    pub async fn get(&self, content_id: Uuid) -> Option<OfflineBook> {
        self.books.read().await.get(&content_id).cloned()
    }

    /// Starts (or restarts) a simulated download
    ///
    /// Already-downloaded content is a no-op and in-flight downloads are left
    /// alone; a failed record is restarted from zero.
    pub async fn start_download(&self, content: &Content) -> OfflineBook {
        let record = {
            let mut books = self.books.write().await;
            match books.get(&content.id) {
                Some(existing) if existing.status != DownloadStatus::Failed => {
                    return existing.clone();
                }
                _ => {}
            }
            let record = OfflineBook::started(content.id, &content.title);
            books.insert(content.id, record.clone());
            record
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.active.write().await.insert(content.id, generation);

        self.persist().await;
        self.spawn_progress_task(content.id, generation);

        tracing::info!(content_id = %content.id, title = %content.title, "Offline download started");

        record
    }

    /// Background task bumping the percentage each tick until complete
    fn spawn_progress_task(&self, content_id: Uuid, generation: u64) {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(manager.tick);
            // The first tick of a tokio interval fires immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if !manager.advance_download(content_id, generation).await {
                    break;
                }
            }
        });
    }

    /// One progress tick on behalf of the task holding `generation`
    ///
    /// Returns false when the task should stop: the record is gone, someone
    /// else owns the current generation, or the download just completed.
    async fn advance_download(&self, content_id: Uuid, generation: u64) -> bool {
        {
            let active = self.active.read().await;
            if active.get(&content_id) != Some(&generation) {
                return false;
            }
        }

        // None: record vanished. Some(true): completed. Some(false): advanced.
        let outcome = {
            let mut books = self.books.write().await;
            match books.get_mut(&content_id) {
                Some(book) if book.status == DownloadStatus::Downloading => {
                    book.percentage = book.percentage.saturating_add(self.step).min(100);
                    book.updated_at = Utc::now();
                    if book.percentage >= 100 {
                        book.status = DownloadStatus::Downloaded;
                        tracing::info!(content_id = %content_id, "Offline download complete");
                        Some(true)
                    } else {
                        Some(false)
                    }
                }
                _ => None,
            }
        };

        match outcome {
            None => false,
            Some(finished) => {
                self.persist().await;
                if finished {
                    let mut active = self.active.write().await;
                    if active.get(&content_id) == Some(&generation) {
                        active.remove(&content_id);
                    }
                }
                !finished
            }
        }
    }

    /// Drops a tracked download. Returns false when it was not tracked.
    pub async fn remove(&self, content_id: Uuid) -> bool {
        let removed = self.books.write().await.remove(&content_id).is_some();
        if removed {
            self.active.write().await.remove(&content_id);
            self.persist().await;
        }
        removed
    }

    /// Forgets every tracked download and empties the state file
    pub async fn clear_all(&self) {
        self.books.write().await.clear();
        self.active.write().await.clear();
        self.persist().await;
        tracing::info!("Offline downloads cleared");
    }

    /// Writes the current records to the state file; failures are logged
    async fn persist(&self) {
        let snapshot = self.list().await;
        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Offline state serialization failed");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&*self.path, json).await {
            tracing::warn!(error = %e, path = %self.path.display(), "Offline state write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    fn book(title: &str) -> Content {
        Content::new(title, "Author", "Fiction", ContentType::Ebook, 999)
    }

    fn manager_at(dir: &tempfile::TempDir) -> OfflineManager {
        let path = dir.path().join("offline_books.json");
        OfflineManager::load(path, Duration::from_millis(10), 50).unwrap()
    }

    /// Manager whose background tasks effectively never tick, so tests can
    /// drive progress by hand through advance_download
    fn idle_manager_at(dir: &tempfile::TempDir) -> OfflineManager {
        let path = dir.path().join("offline_books.json");
        OfflineManager::load(path, Duration::from_secs(3600), 10).unwrap()
    }

    async fn current_generation(manager: &OfflineManager, content_id: Uuid) -> u64 {
        *manager.active.read().await.get(&content_id).unwrap()
    }

    async fn wait_for_status(
        manager: &OfflineManager,
        content_id: Uuid,
        status: DownloadStatus,
    ) -> OfflineBook {
        for _ in 0..100 {
            if let Some(book) = manager.get(content_id).await {
                if book.status == status {
                    return book;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("download never reached {:?}", status);
    }

    #[tokio::test]
    async fn test_download_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_at(&dir);
        let content = book("Dune");

        let record = manager.start_download(&content).await;
        assert_eq!(record.status, DownloadStatus::Downloading);
        assert_eq!(record.percentage, 0);

        let done = wait_for_status(&manager, content.id, DownloadStatus::Downloaded).await;
        assert_eq!(done.percentage, 100);
    }

    #[tokio::test]
    async fn test_download_of_downloaded_book_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_at(&dir);
        let content = book("Dune");

        manager.start_download(&content).await;
        wait_for_status(&manager, content.id, DownloadStatus::Downloaded).await;

        let again = manager.start_download(&content).await;
        assert_eq!(again.status, DownloadStatus::Downloaded);
        assert_eq!(again.percentage, 100);

        // Still complete after a few would-be ticks
        tokio::time::sleep(Duration::from_millis(50)).await;
        let book = manager.get(content.id).await.unwrap();
        assert_eq!(book.status, DownloadStatus::Downloaded);
        assert_eq!(book.percentage, 100);
    }

    #[tokio::test]
    async fn test_clear_all_empties_state_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offline_books.json");
        let manager = OfflineManager::load(&path, Duration::from_millis(10), 50).unwrap();

        manager.start_download(&book("Dune")).await;
        manager.start_download(&book("Emma")).await;
        assert_eq!(manager.list().await.len(), 2);

        manager.clear_all().await;
        assert!(manager.list().await.is_empty());

        let raw = std::fs::read_to_string(&path).unwrap();
        let records: Vec<OfflineBook> = serde_json::from_str(&raw).unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_remove_drops_record_and_stops_progress() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_at(&dir);
        let content = book("Dune");

        manager.start_download(&content).await;
        assert!(manager.remove(content.id).await);
        assert!(manager.get(content.id).await.is_none());
        assert!(!manager.remove(content.id).await);

        // The orphaned progress task must not resurrect the record
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(manager.get(content.id).await.is_none());
    }

    #[tokio::test]
    async fn test_stale_task_cannot_advance_restarted_download() {
        let dir = tempfile::tempdir().unwrap();
        let manager = idle_manager_at(&dir);
        let content = book("Dune");

        manager.start_download(&content).await;
        let stale = current_generation(&manager, content.id).await;

        // Remove and immediately restart: the first task's generation is dead
        assert!(manager.remove(content.id).await);
        manager.start_download(&content).await;
        let live = current_generation(&manager, content.id).await;
        assert_ne!(stale, live);

        // A tick from the orphaned task is refused and changes nothing
        assert!(!manager.advance_download(content.id, stale).await);
        assert_eq!(manager.get(content.id).await.unwrap().percentage, 0);

        // The owning task still advances by exactly one step per tick
        assert!(manager.advance_download(content.id, live).await);
        assert_eq!(manager.get(content.id).await.unwrap().percentage, 10);
    }

    #[tokio::test]
    async fn test_completed_download_releases_generation() {
        let dir = tempfile::tempdir().unwrap();
        let manager = idle_manager_at(&dir);
        let content = book("Dune");

        manager.start_download(&content).await;
        let generation = current_generation(&manager, content.id).await;

        for _ in 0..9 {
            assert!(manager.advance_download(content.id, generation).await);
        }
        // Final tick completes the download and tells the task to stop
        assert!(!manager.advance_download(content.id, generation).await);

        let book = manager.get(content.id).await.unwrap();
        assert_eq!(book.status, DownloadStatus::Downloaded);
        assert_eq!(book.percentage, 100);
        assert!(manager.active.read().await.get(&content.id).is_none());
    }

    #[tokio::test]
    async fn test_interrupted_downloads_load_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offline_books.json");

        let interrupted = OfflineBook {
            content_id: Uuid::new_v4(),
            title: "Dune".to_string(),
            status: DownloadStatus::Downloading,
            percentage: 40,
            updated_at: Utc::now(),
        };
        std::fs::write(&path, serde_json::to_string(&vec![interrupted.clone()]).unwrap()).unwrap();

        let manager = OfflineManager::load(&path, Duration::from_millis(10), 50).unwrap();
        let book = manager.get(interrupted.content_id).await.unwrap();
        assert_eq!(book.status, DownloadStatus::Failed);
    }

    #[tokio::test]
    async fn test_failed_download_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offline_books.json");

        let content = book("Dune");
        let failed = OfflineBook {
            content_id: content.id,
            title: content.title.clone(),
            status: DownloadStatus::Failed,
            percentage: 40,
            updated_at: Utc::now(),
        };
        std::fs::write(&path, serde_json::to_string(&vec![failed]).unwrap()).unwrap();

        let manager = OfflineManager::load(&path, Duration::from_millis(10), 50).unwrap();
        let record = manager.start_download(&content).await;
        assert_eq!(record.status, DownloadStatus::Downloading);
        assert_eq!(record.percentage, 0);

        wait_for_status(&manager, content.id, DownloadStatus::Downloaded).await;
    }
}
