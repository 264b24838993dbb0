use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::data::DataApi;
use crate::models::Category;
use crate::screens::LoadState;

/// State of the category-selection screen.
#[derive(Debug, Clone)]
pub struct FeedState {
    pub categories: LoadState<Vec<Category>>,
    pub selected: HashSet<i64>,
}

/// Category-selection screen: lists categories, lets the user toggle
/// which ones to follow, persists the set through the data layer.
pub struct FeedScreen {
    data: Arc<DataApi>,
    state: Arc<watch::Sender<FeedState>>,
}

impl FeedScreen {
    pub fn new(data: Arc<DataApi>) -> Self {
        let selected = data.user_categories().borrow().clone();
        let (state, _) = watch::channel(FeedState {
            categories: LoadState::Loading,
            selected,
        });
        Self {
            data,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub async fn load(&self) {
        self.state
            .send_modify(|state| state.categories = LoadState::Loading);
        match self.data.categories().await {
            Ok(categories) => self
                .state
                .send_modify(|state| state.categories = LoadState::Loaded(categories)),
            Err(error) => {
                warn!(error = %error, "loading categories failed");
                self.state
                    .send_modify(|state| state.categories = LoadState::Error(error.to_string()));
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    /// Flips membership of the id and persists the whole set.
    pub fn toggle_category(&self, category_id: i64) {
        let mut selected = self.state.borrow().selected.clone();
        if !selected.insert(category_id) {
            selected.remove(&category_id);
        }
        self.data.set_user_categories(selected.clone());
        self.state.send_modify(|state| state.selected = selected);
    }

    pub fn clear_selections(&self) {
        self.data.set_user_categories(HashSet::new());
        self.state.send_modify(|state| state.selected.clear());
    }
}
