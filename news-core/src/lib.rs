pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod liked;
pub mod models;
pub mod screens;

pub use api::{MultiCategoriesRequest, NewsApi};
pub use config::AppConfig;
pub use data::{CategorySelection, DataApi, TITLES_PER_CATEGORY};
pub use error::NewsError;
pub use liked::LikedStore;
pub use models::{Category, FullArticle, LikedNews, NewsTitle};
pub use screens::{
    DetailScreen, DetailState, FeedScreen, FeedState, HomeScreen, HomeState, LoadState,
};
