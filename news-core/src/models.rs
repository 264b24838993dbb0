use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A news topic tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Lightweight article summary shown in list screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsTitle {
    pub id: i64,
    pub title: String,
    pub short_description: Option<String>,
    pub image_id: Option<i64>,
    pub created_at: Option<String>,
}

/// Complete article, fetched on demand by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullArticle {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub categories: Vec<Category>,
    pub source: String,
    pub created_at: String,
    pub image_id: Option<i64>,
    pub image_location: Option<String>,
}

/// One row of the local liked-news table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LikedNews {
    pub news_id: i64,
    pub category_id: i64,
    pub title: String,
    pub short_description: String,
    pub liked_at: i64,
}

impl LikedNews {
    /// Projects the liked record into the title shape list screens render.
    pub fn to_title(&self) -> NewsTitle {
        NewsTitle {
            id: self.news_id,
            title: self.title.clone(),
            short_description: Some(self.short_description.clone()),
            image_id: None,
            created_at: None,
        }
    }
}
