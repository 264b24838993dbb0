use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;
use crate::error::NewsError;
use crate::models::{Category, FullArticle, NewsTitle};

/// Wrapper every JSON endpoint of the backend responds with.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_data(self) -> Result<T, NewsError> {
        if !self.success {
            return Err(NewsError::Rejected(
                self.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| NewsError::Rejected("response carries no data".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryWire {
    #[serde(rename = "category_id")]
    pub id: i64,
    #[serde(rename = "category_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsTitleWire {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub image_id: Option<i64>,
}

/// Item of the multi-category batch response; carries more context than
/// the plain title lists.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiCategoryTitleWire {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub image_id: Option<i64>,
    #[serde(default)]
    pub categories: Vec<CategoryWire>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullNewsWire {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<CategoryWire>,
    pub source: String,
    pub created_at: String,
    #[serde(default)]
    pub image_id: Option<i64>,
    #[serde(default)]
    pub image_location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiCategoriesRequest {
    pub category_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_per_category: Option<u32>,
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
        }
    }
}

impl From<NewsTitleWire> for NewsTitle {
    fn from(wire: NewsTitleWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            short_description: wire.short_description,
            image_id: wire.image_id,
            created_at: None,
        }
    }
}

impl From<MultiCategoryTitleWire> for NewsTitle {
    fn from(wire: MultiCategoryTitleWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            short_description: wire.short_description,
            image_id: wire.image_id,
            created_at: wire.timestamp,
        }
    }
}

impl From<FullNewsWire> for FullArticle {
    fn from(wire: FullNewsWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            categories: wire.categories.into_iter().map(Into::into).collect(),
            source: wire.source,
            created_at: wire.created_at,
            image_id: wire.image_id,
            image_location: wire.image_location,
        }
    }
}

/// Typed client for the news backend. One method per endpoint; no
/// retries and no fallback, every failure surfaces as an `Err`.
#[derive(Debug, Clone)]
pub struct NewsApi {
    base_url: Url,
    http: Client,
}

impl NewsApi {
    pub fn new(base_url: Url, http: Client) -> Self {
        Self { base_url, http }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, NewsError> {
        let base_url = Url::parse(&config.base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self::new(base_url, http))
    }

    fn endpoint(&self, path: &str) -> Result<Url, NewsError> {
        Ok(self.base_url.join(path)?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NewsError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, NewsError> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).query(query).send().await?;
        Self::decode::<ApiResponse<T>>(response).await?.into_data()
    }

    fn limit_query(limit: Option<u32>) -> Vec<(&'static str, String)> {
        limit
            .into_iter()
            .map(|limit| ("limit", limit.to_string()))
            .collect()
    }

    /// `GET /health`, raw string body. Diagnostics only.
    pub async fn check_health(&self) -> Result<String, NewsError> {
        let url = self.endpoint("/health")?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status));
        }
        Ok(response.text().await?)
    }

    pub async fn categories(&self) -> Result<Vec<CategoryWire>, NewsError> {
        self.get_envelope("/api/categories/", &[]).await
    }

    pub async fn newest_titles(&self, limit: Option<u32>) -> Result<Vec<NewsTitleWire>, NewsError> {
        self.get_envelope("/api/news/newest/titles", &Self::limit_query(limit))
            .await
    }

    pub async fn titles_by_category(
        &self,
        category_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<NewsTitleWire>, NewsError> {
        let path = format!("/api/news/by-category/{category_id}/titles");
        self.get_envelope(&path, &Self::limit_query(limit)).await
    }

    pub async fn titles_by_categories(
        &self,
        request: &MultiCategoriesRequest,
    ) -> Result<Vec<MultiCategoryTitleWire>, NewsError> {
        let url = self.endpoint("/api/news/by-multiple-categories/titles")?;
        let response = self.http.post(url).json(request).send().await?;
        Self::decode::<ApiResponse<Vec<MultiCategoryTitleWire>>>(response)
            .await?
            .into_data()
    }

    pub async fn search_titles(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> Result<Vec<NewsTitleWire>, NewsError> {
        let mut params = vec![("q", query.to_string())];
        params.extend(Self::limit_query(limit));
        self.get_envelope("/api/news/search", &params).await
    }

    pub async fn news_by_id(&self, news_id: i64) -> Result<FullNewsWire, NewsError> {
        let path = format!("/api/news/{news_id}");
        self.get_envelope(&path, &[]).await
    }

    pub async fn newest_full(&self, limit: Option<u32>) -> Result<Vec<FullNewsWire>, NewsError> {
        self.get_envelope("/api/news/newest/full", &Self::limit_query(limit))
            .await
    }

    pub async fn full_by_category(
        &self,
        category_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<FullNewsWire>, NewsError> {
        let path = format!("/api/news/by-category/{category_id}/full");
        self.get_envelope(&path, &Self::limit_query(limit)).await
    }

    /// Raw image bytes, addressed by image id.
    pub async fn image_by_id(&self, image_id: i64) -> Result<Bytes, NewsError> {
        let url = self.endpoint(&format!("/api/images/by-id/{image_id}"))?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status(status));
        }
        Ok(response.bytes().await?)
    }
}
