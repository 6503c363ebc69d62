use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use super::QuizPageController;

/// Pages left open longer than this are dropped on the next `open`.
const PAGE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub session_key: String,
    pub questionnaire_id: i64,
}

impl PageKey {
    pub fn new(session_key: &str, questionnaire_id: i64) -> Self {
        Self {
            session_key: session_key.to_string(),
            questionnaire_id,
        }
    }
}

/// Controllers of the item pages currently on screen, one per visitor and
/// questionnaire.
#[derive(Clone, Default)]
pub struct PageRegistry {
    pages: Arc<Mutex<HashMap<PageKey, (Instant, QuizPageController)>>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the controller for a freshly rendered page, replacing any
    /// previous one under the same key.
    pub async fn open(&self, key: PageKey, controller: QuizPageController) {
        let mut pages = self.pages.lock().await;
        let before = pages.len();
        pages.retain(|_, (opened, _)| opened.elapsed() < PAGE_TTL);
        if pages.len() < before {
            tracing::debug!("dropped {} stale quiz pages", before - pages.len());
        }
        pages.insert(key, (Instant::now(), controller));
    }

    /// Runs `f` against the open controller, if there is one.
    pub async fn with<T>(
        &self,
        key: &PageKey,
        f: impl FnOnce(&mut QuizPageController) -> T,
    ) -> Option<T> {
        let mut pages = self.pages.lock().await;
        pages.get_mut(key).map(|(_, controller)| f(controller))
    }

    pub async fn close(&self, key: &PageKey) -> Option<QuizPageController> {
        self.pages
            .lock()
            .await
            .remove(key)
            .map(|(_, controller)| controller)
    }

    pub async fn len(&self) -> usize {
        self.pages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
