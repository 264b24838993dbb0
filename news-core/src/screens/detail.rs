use std::sync::Arc;

use tokio::sync::watch;

use crate::data::DataApi;
use crate::error::NewsError;
use crate::models::FullArticle;
use crate::screens::LoadState;

/// State of the article-detail screen.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub article: LoadState<FullArticle>,
    pub liked: bool,
}

/// Article-detail screen: loads one full article and mirrors its live
/// liked flag into the displayed state.
pub struct DetailScreen {
    data: Arc<DataApi>,
    state: Arc<watch::Sender<DetailState>>,
}

impl DetailScreen {
    pub fn new(data: Arc<DataApi>) -> Self {
        let (state, _) = watch::channel(DetailState {
            article: LoadState::Loading,
            liked: false,
        });
        Self {
            data,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Fetches the article. An absent result (failure or unknown id)
    /// surfaces as the "news not found" message; a found article also
    /// subscribes the screen to that id's liked flag.
    pub async fn load_news(&self, news_id: i64) {
        self.state
            .send_modify(|state| state.article = LoadState::Loading);
        match self.data.news_by_id(news_id).await {
            Some(article) => {
                self.state
                    .send_modify(|state| state.article = LoadState::Loaded(article));
                self.watch_liked(news_id);
            }
            None => self
                .state
                .send_modify(|state| state.article = LoadState::Error("news not found".to_string())),
        }
    }

    /// Likes or unlikes the loaded article based on the current flag,
    /// flipping the displayed flag optimistically. The stored short
    /// description is the article description truncated to 200 chars.
    pub async fn toggle_like(&self) -> Result<(), NewsError> {
        let (article, liked) = {
            let state = self.state.borrow();
            match state.article.loaded() {
                Some(article) => (article.clone(), state.liked),
                None => return Ok(()),
            }
        };

        if liked {
            self.data.unlike(article.id).await?;
        } else {
            let category_id = article.categories.first().map(|c| c.id).unwrap_or(0);
            let short_description: String = article.description.chars().take(200).collect();
            self.data
                .like(article.id, category_id, &article.title, &short_description)
                .await?;
        }
        self.state.send_modify(|state| state.liked = !liked);
        Ok(())
    }

    fn watch_liked(&self, news_id: i64) {
        let mut liked_rx = self.data.is_liked(news_id);
        let liked_now = *liked_rx.borrow();
        self.state.send_modify(|state| state.liked = liked_now);

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while liked_rx.changed().await.is_ok() {
                let liked = *liked_rx.borrow_and_update();
                state.send_modify(|state| state.liked = liked);
            }
        });
    }
}
