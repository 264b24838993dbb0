mod common;

use std::time::Duration;

use news_core::LikedStore;
use tokio::time::timeout;

use common::init_tracing;

#[tokio::test]
async fn like_then_unlike_round_trips_the_flag() {
    init_tracing();
    let store = LikedStore::in_memory().await.unwrap();

    store.like(1, 2, "Title", "Short").await.unwrap();
    assert!(*store.is_liked(1).borrow());

    store.unlike(1).await.unwrap();
    assert!(!*store.is_liked(1).borrow());
}

#[tokio::test]
async fn unlike_is_idempotent() {
    init_tracing();
    let store = LikedStore::in_memory().await.unwrap();

    store.like(1, 2, "Title", "Short").await.unwrap();
    store.unlike(1).await.unwrap();
    store.unlike(1).await.unwrap();
    assert!(!*store.is_liked(1).borrow());
    assert!(store.liked_news().borrow().is_empty());
}

#[tokio::test]
async fn liked_list_orders_most_recent_first() {
    init_tracing();
    let store = LikedStore::in_memory().await.unwrap();

    store.like(1, 0, "A", "a").await.unwrap();
    store.like(2, 0, "B", "b").await.unwrap();
    store.like(3, 0, "C", "c").await.unwrap();

    let ids: Vec<i64> = store
        .liked_news()
        .borrow()
        .iter()
        .map(|row| row.news_id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn re_liking_replaces_the_row_and_moves_it_to_the_front() {
    init_tracing();
    let store = LikedStore::in_memory().await.unwrap();

    store.like(1, 0, "A", "a").await.unwrap();
    store.like(2, 0, "B", "b").await.unwrap();
    store.like(1, 5, "A updated", "a2").await.unwrap();

    let rows = store.liked_news().borrow().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].news_id, 1);
    assert_eq!(rows[0].category_id, 5);
    assert_eq!(rows[0].title, "A updated");
    assert_eq!(rows[1].news_id, 2);
}

#[tokio::test]
async fn is_liked_observers_see_changes() {
    init_tracing();
    let store = LikedStore::in_memory().await.unwrap();

    let mut rx = store.is_liked(9);
    assert!(!*rx.borrow());

    store.like(9, 1, "Title", "Short").await.unwrap();
    timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("flag update")
        .unwrap();
    assert!(*rx.borrow_and_update());

    store.unlike(9).await.unwrap();
    timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("flag update")
        .unwrap();
    assert!(!*rx.borrow_and_update());
}

#[tokio::test]
async fn store_survives_a_reopen() {
    init_tracing();
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "news_core_test_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let db_path = dir.join("liked_news.db");

    {
        let store = LikedStore::open(&db_path).await.unwrap();
        store.like(1, 2, "Kept", "across restarts").await.unwrap();
        store.like(2, 2, "Also kept", "newer").await.unwrap();
    }

    let reopened = LikedStore::open(&db_path).await.unwrap();
    let rows = reopened.liked_news().borrow().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].news_id, 2);
    assert_eq!(rows[1].news_id, 1);
    assert_eq!(rows[1].title, "Kept");

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
