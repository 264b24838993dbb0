use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::data::DataApi;
use crate::error::NewsError;
use crate::models::NewsTitle;
use crate::screens::LoadState;

/// State of the title-list screen.
#[derive(Debug, Clone)]
pub struct HomeState {
    pub titles: LoadState<Vec<NewsTitle>>,
    pub query: String,
}

/// Title-list screen with search. Loads the category-based list when the
/// query is blank and the search results otherwise.
///
/// Concurrent reloads are guarded by a monotonic sequence number:
/// only the newest outstanding request may publish its result, so a
/// slow stale response never overwrites a fresher one.
pub struct HomeScreen {
    data: Arc<DataApi>,
    state: Arc<watch::Sender<HomeState>>,
    load_seq: Arc<AtomicU64>,
}

impl HomeScreen {
    pub fn new(data: Arc<DataApi>) -> Self {
        let (state, _) = watch::channel(HomeState {
            titles: LoadState::Loading,
            query: String::new(),
        });
        Self {
            data,
            state: Arc::new(state),
            load_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    /// Category-based fetch using the current user selection.
    pub async fn load(&self) {
        let ticket = self.begin_load();
        let selection = self.data.user_categories().borrow().clone();
        let result = self.data.news_titles(&selection).await;
        self.finish_load(ticket, result);
    }

    /// Re-runs whichever fetch the current query selects.
    pub async fn retry(&self) {
        if self.state.borrow().query.trim().is_empty() {
            self.load().await;
        } else {
            self.search().await;
        }
    }

    /// Flips membership of the id in the user selection, persists the
    /// new set and reloads the title list with it.
    pub async fn toggle_category(&self, category_id: i64) {
        let mut selected = self.data.user_categories().borrow().clone();
        if !selected.insert(category_id) {
            selected.remove(&category_id);
        }
        self.data.set_user_categories(selected);
        self.load().await;
    }

    /// Updates the query text. Clearing a previously non-blank query
    /// re-triggers the category-based fetch.
    pub async fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let was_blank = self.state.borrow().query.trim().is_empty();
        let is_blank = query.trim().is_empty();
        self.state.send_modify(|state| state.query = query);
        if is_blank && !was_blank {
            self.load().await;
        }
    }

    /// Explicit search action: searches when the query is non-blank,
    /// falls back to the category-based fetch otherwise. Search
    /// failures are already empty results, so this never errors.
    pub async fn search(&self) {
        let query = self.state.borrow().query.trim().to_string();
        if query.is_empty() {
            return self.load().await;
        }
        let ticket = self.begin_load();
        let titles = self.data.search(&query).await;
        self.finish_load(ticket, Ok(titles));
    }

    fn begin_load(&self) -> u64 {
        let ticket = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .send_modify(|state| state.titles = LoadState::Loading);
        ticket
    }

    fn finish_load(&self, ticket: u64, result: Result<Vec<NewsTitle>, NewsError>) {
        if ticket != self.load_seq.load(Ordering::SeqCst) {
            return;
        }
        match result {
            Ok(titles) => self
                .state
                .send_modify(|state| state.titles = LoadState::Loaded(titles)),
            Err(error) => {
                warn!(error = %error, "loading news titles failed");
                self.state
                    .send_modify(|state| state.titles = LoadState::Error(error.to_string()));
            }
        }
    }
}
