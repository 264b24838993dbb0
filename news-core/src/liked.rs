use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::error::NewsError;
use crate::models::LikedNews;

/// Durable store of the user's liked articles, keyed by news id.
///
/// The full ordered list is kept in a watch channel so observers always
/// see the current value; every mutation re-queries and republishes.
#[derive(Debug, Clone)]
pub struct LikedStore {
    pool: SqlitePool,
    list_tx: Arc<watch::Sender<Vec<LikedNews>>>,
}

impl LikedStore {
    /// Opens (or creates) the store at the given SQLite file path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, NewsError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Volatile store for tests. A single connection keeps the one
    /// in-memory database alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self, NewsError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, NewsError> {
        sqlx::migrate!().run(&pool).await?;
        let initial = Self::query_all(&pool).await?;
        let (list_tx, _) = watch::channel(initial);
        Ok(Self {
            pool,
            list_tx: Arc::new(list_tx),
        })
    }

    /// Insert-or-replace by news id. Re-liking an article replaces the
    /// existing row and stamps a fresh `liked_at`.
    pub async fn like(
        &self,
        news_id: i64,
        category_id: i64,
        title: &str,
        short_description: &str,
    ) -> Result<(), NewsError> {
        let liked_at = Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT OR REPLACE INTO liked_news \
             (news_id, category_id, title, short_description, liked_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(news_id)
        .bind(category_id)
        .bind(title)
        .bind(short_description)
        .bind(liked_at)
        .execute(&self.pool)
        .await?;
        self.refresh().await
    }

    /// Idempotent delete; removing an absent id is a no-op.
    pub async fn unlike(&self, news_id: i64) -> Result<(), NewsError> {
        sqlx::query("DELETE FROM liked_news WHERE news_id = ?")
            .bind(news_id)
            .execute(&self.pool)
            .await?;
        self.refresh().await
    }

    /// Live list of liked articles, most recently liked first.
    pub fn liked_news(&self) -> watch::Receiver<Vec<LikedNews>> {
        self.list_tx.subscribe()
    }

    /// Live presence flag for one news id.
    pub fn is_liked(&self, news_id: i64) -> watch::Receiver<bool> {
        let mut list_rx = self.list_tx.subscribe();
        let initial = list_rx.borrow().iter().any(|row| row.news_id == news_id);
        let (tx, rx) = watch::channel(initial);
        tokio::spawn(async move {
            while list_rx.changed().await.is_ok() {
                let liked = list_rx
                    .borrow_and_update()
                    .iter()
                    .any(|row| row.news_id == news_id);
                if tx.send(liked).is_err() {
                    break;
                }
            }
        });
        rx
    }

    async fn refresh(&self) -> Result<(), NewsError> {
        let rows = Self::query_all(&self.pool).await?;
        self.list_tx.send_replace(rows);
        Ok(())
    }

    async fn query_all(pool: &SqlitePool) -> Result<Vec<LikedNews>, NewsError> {
        // INSERT OR REPLACE reassigns the rowid, so rowid order tracks
        // like-recency and breaks same-millisecond ties.
        let rows = sqlx::query_as::<_, LikedNews>(
            "SELECT news_id, category_id, title, short_description, liked_at \
             FROM liked_news ORDER BY liked_at DESC, rowid DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
