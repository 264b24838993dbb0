#![allow(dead_code)]

use std::sync::Once;

use reqwest::Client;
use url::Url;
use wiremock::MockServer;

use news_core::{CategorySelection, DataApi, LikedStore, NewsApi};

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn news_api(server: &MockServer) -> NewsApi {
    let base_url = Url::parse(&server.uri()).expect("mock server uri");
    NewsApi::new(base_url, Client::new())
}

pub async fn data_api(server: &MockServer) -> DataApi {
    let liked = LikedStore::in_memory().await.expect("in-memory store");
    DataApi::new(news_api(server), liked, CategorySelection::new())
}

pub fn envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "message": "ok",
        "data": data,
        "timestamp": "2025-06-01T12:00:00"
    })
}

pub fn categories_body(categories: &[(i64, &str)]) -> serde_json::Value {
    envelope(serde_json::Value::Array(
        categories
            .iter()
            .map(|(id, name)| {
                serde_json::json!({"category_id": id, "category_name": name})
            })
            .collect(),
    ))
}

pub fn titles_body(ids: &[i64]) -> serde_json::Value {
    envelope(serde_json::Value::Array(
        ids.iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "title": format!("news {id}"),
                    "short_description": format!("about news {id}"),
                    "image_id": null
                })
            })
            .collect(),
    ))
}

pub fn multi_category_titles_body(items: &[(i64, i64)]) -> serde_json::Value {
    envelope(serde_json::Value::Array(
        items
            .iter()
            .map(|(id, category_id)| {
                serde_json::json!({
                    "id": id,
                    "title": format!("news {id}"),
                    "short_description": format!("about news {id}"),
                    "categories": [
                        {"category_id": category_id, "category_name": format!("category {category_id}")}
                    ],
                    "timestamp": "2025-06-01T08:00:00",
                    "source": "wire"
                })
            })
            .collect(),
    ))
}

pub fn full_news_body(id: i64, category_id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("news {id}"),
        "description": format!("long description of news {id}"),
        "categories": [
            {"category_id": category_id, "category_name": format!("category {category_id}")}
        ],
        "source": "wire",
        "created_at": "2025-06-01T08:00:00",
        "image_id": null,
        "image_location": null
    })
}
