use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;
use tokio::sync::watch;
use tracing::warn;

use crate::api::{MultiCategoriesRequest, MultiCategoryTitleWire, NewsApi};
use crate::error::NewsError;
use crate::liked::LikedStore;
use crate::models::{Category, FullArticle, LikedNews, NewsTitle};

/// Per-category limit used by the batched multi-category fetch.
pub const TITLES_PER_CATEGORY: u32 = 5;

/// In-memory set of category ids the user follows. Process-lifetime
/// state, replaced wholesale, observable through a watch channel.
/// Injected into [`DataApi`] so tests can substitute their own.
#[derive(Debug, Clone)]
pub struct CategorySelection {
    tx: Arc<watch::Sender<HashSet<i64>>>,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorySelection {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(HashSet::new());
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, ids: HashSet<i64>) {
        self.tx.send_replace(ids);
    }

    pub fn current(&self) -> HashSet<i64> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HashSet<i64>> {
        self.tx.subscribe()
    }
}

/// Unifies the remote news API and the local liked-store behind one
/// interface. Read paths feeding list/detail screens degrade to
/// empty/absent instead of failing; category listing and health stay
/// fallible so their failure is visible to the caller.
#[derive(Debug, Clone)]
pub struct DataApi {
    api: NewsApi,
    liked: LikedStore,
    selection: CategorySelection,
}

impl DataApi {
    pub fn new(api: NewsApi, liked: LikedStore, selection: CategorySelection) -> Self {
        Self {
            api,
            liked,
            selection,
        }
    }

    /// Diagnostics passthrough; failures propagate unchanged.
    pub async fn check_health(&self) -> Result<String, NewsError> {
        self.api.check_health().await
    }

    /// Remote categories mapped to view DTOs. Failures propagate: a
    /// broken category list blocks selection, so the caller must see it.
    pub async fn categories(&self) -> Result<Vec<Category>, NewsError> {
        Ok(self
            .api
            .categories()
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn user_categories(&self) -> watch::Receiver<HashSet<i64>> {
        self.selection.subscribe()
    }

    pub fn set_user_categories(&self, category_ids: HashSet<i64>) {
        self.selection.set(category_ids);
    }

    /// Titles for the given selection. An empty set means newest
    /// overall; otherwise requested ids are resolved against the
    /// category list (unknown ids are dropped, nothing usable falls
    /// back to newest) and fetched with one batched request.
    pub async fn news_titles(
        &self,
        category_ids: &HashSet<i64>,
    ) -> Result<Vec<NewsTitle>, NewsError> {
        if category_ids.is_empty() {
            return self.news_titles_newest().await;
        }

        let categories = self.categories().await?;
        let mut requested: Vec<i64> = category_ids.iter().copied().collect();
        requested.sort_unstable();
        let known: Vec<i64> = requested
            .iter()
            .copied()
            .filter(|id| categories.iter().any(|category| category.id == *id))
            .collect();

        if known.is_empty() {
            warn!(
                requested = ?requested,
                "no requested category resolves to a known one, falling back to newest titles"
            );
            return self.news_titles_newest().await;
        }

        let request = MultiCategoriesRequest {
            category_ids: known.clone(),
            limit_per_category: Some(TITLES_PER_CATEGORY),
        };
        let items = self.api.titles_by_categories(&request).await?;
        Ok(merge_in_requested_order(&known, items))
    }

    /// Newest titles overall, backend default limit.
    pub async fn news_titles_newest(&self) -> Result<Vec<NewsTitle>, NewsError> {
        Ok(self
            .api
            .newest_titles(None)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Full article by id; any failure (network, decode, not-found)
    /// is an absent result, never an error.
    pub async fn news_by_id(&self, news_id: i64) -> Option<FullArticle> {
        ok_or_absent(
            self.api.news_by_id(news_id).await.map(FullArticle::from),
            "fetch news by id",
        )
    }

    /// Title search; backend failures yield an empty list.
    pub async fn search(&self, query: &str) -> Vec<NewsTitle> {
        ok_or_empty(
            self.api
                .search_titles(query, None)
                .await
                .map(|items| items.into_iter().map(Into::into).collect()),
            "search news",
        )
    }

    /// Raw image bytes by id; absent on failure.
    pub async fn download_image(&self, image_id: i64) -> Option<Bytes> {
        ok_or_absent(self.api.image_by_id(image_id).await, "download image")
    }

    /// Downloads and decodes an image. An absent id short-circuits
    /// without a request; download and decode failures are absent too.
    pub async fn image_bitmap(&self, image_id: Option<i64>) -> Option<DynamicImage> {
        let image_id = image_id?;
        let body = self.download_image(image_id).await?;
        ok_or_absent(image::load_from_memory(&body), "decode image")
    }

    /// Live liked articles projected into the title-view shape.
    pub fn liked_news(&self) -> watch::Receiver<Vec<NewsTitle>> {
        let mut liked_rx = self.liked.liked_news();
        let initial: Vec<NewsTitle> = liked_rx.borrow().iter().map(LikedNews::to_title).collect();
        let (tx, rx) = watch::channel(initial);
        tokio::spawn(async move {
            while liked_rx.changed().await.is_ok() {
                let titles: Vec<NewsTitle> = liked_rx
                    .borrow_and_update()
                    .iter()
                    .map(LikedNews::to_title)
                    .collect();
                if tx.send(titles).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn is_liked(&self, news_id: i64) -> watch::Receiver<bool> {
        self.liked.is_liked(news_id)
    }

    pub async fn like(
        &self,
        news_id: i64,
        category_id: i64,
        title: &str,
        short_description: &str,
    ) -> Result<(), NewsError> {
        self.liked
            .like(news_id, category_id, title, short_description)
            .await
    }

    pub async fn unlike(&self, news_id: i64) -> Result<(), NewsError> {
        self.liked.unlike(news_id).await
    }
}

/// Converts a failed read into an absent value, logging the cause.
fn ok_or_absent<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(error = %error, context, "read degraded to absent");
            None
        }
    }
}

/// Converts a failed list read into an empty list, logging the cause.
fn ok_or_empty<T, E: std::fmt::Display>(result: Result<Vec<T>, E>, context: &str) -> Vec<T> {
    match result {
        Ok(values) => values,
        Err(error) => {
            warn!(error = %error, context, "read degraded to empty");
            Vec::new()
        }
    }
}

/// Orders the batch response by requested category: for each requested
/// id in turn, the items tagged with it are taken once, keeping their
/// response order. Items tagged only with unrequested categories are
/// appended last.
fn merge_in_requested_order(
    requested: &[i64],
    items: Vec<MultiCategoryTitleWire>,
) -> Vec<NewsTitle> {
    let mut taken = vec![false; items.len()];
    let mut merged = Vec::with_capacity(items.len());
    for category_id in requested {
        for (index, item) in items.iter().enumerate() {
            if taken[index] {
                continue;
            }
            if item.categories.iter().any(|c| c.id == *category_id) {
                taken[index] = true;
                merged.push(item.clone().into());
            }
        }
    }
    for (index, item) in items.into_iter().enumerate() {
        if !taken[index] {
            merged.push(item.into());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CategoryWire;

    fn item(id: i64, category_ids: &[i64]) -> MultiCategoryTitleWire {
        MultiCategoryTitleWire {
            id,
            title: format!("news {id}"),
            short_description: None,
            image_id: None,
            categories: category_ids
                .iter()
                .map(|&id| CategoryWire {
                    id,
                    name: format!("category {id}"),
                })
                .collect(),
            timestamp: None,
            source: Some("test".to_string()),
        }
    }

    #[test]
    fn ok_or_absent_keeps_values_and_drops_errors() {
        assert_eq!(ok_or_absent::<_, NewsError>(Ok(1), "test"), Some(1));
        let failed: Result<i64, NewsError> =
            Err(NewsError::Rejected("nope".to_string()));
        assert_eq!(ok_or_absent(failed, "test"), None);
    }

    #[test]
    fn ok_or_empty_keeps_values_and_drops_errors() {
        assert_eq!(ok_or_empty::<_, NewsError>(Ok(vec![1, 2]), "test"), vec![1, 2]);
        let failed: Result<Vec<i64>, NewsError> =
            Err(NewsError::Rejected("nope".to_string()));
        assert!(ok_or_empty(failed, "test").is_empty());
    }

    #[test]
    fn merge_groups_items_by_requested_category_order() {
        let items = vec![item(10, &[2]), item(11, &[1]), item(12, &[2]), item(13, &[1])];
        let merged = merge_in_requested_order(&[1, 2], items);
        let ids: Vec<i64> = merged.iter().map(|title| title.id).collect();
        assert_eq!(ids, vec![11, 13, 10, 12]);
    }

    #[test]
    fn merge_takes_items_tagged_with_several_requested_categories_once() {
        let items = vec![item(10, &[1, 2]), item(11, &[2])];
        let merged = merge_in_requested_order(&[1, 2], items);
        let ids: Vec<i64> = merged.iter().map(|title| title.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn merge_appends_items_outside_the_request() {
        let items = vec![item(10, &[9]), item(11, &[1])];
        let merged = merge_in_requested_order(&[1], items);
        let ids: Vec<i64> = merged.iter().map(|title| title.id).collect();
        assert_eq!(ids, vec![11, 10]);
    }

    #[test]
    fn selection_replaces_the_whole_set() {
        let selection = CategorySelection::new();
        assert!(selection.current().is_empty());
        selection.set(HashSet::from([1, 2]));
        assert_eq!(selection.current(), HashSet::from([1, 2]));
        selection.set(HashSet::from([3]));
        assert_eq!(selection.current(), HashSet::from([3]));
    }
}
