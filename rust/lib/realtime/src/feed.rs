//! Notification feed: paged history merged with realtime pushes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shopfront_client::ApiError;
use shopfront_core::{Page, PageQuery};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::Notification;

/// Backend operations the feed depends on.
#[async_trait]
pub trait NotificationSource: Send + Sync + 'static {
    async fn fetch_page(&self, query: PageQuery) -> Result<Page<Notification>, ApiError>;

    async fn mark_read(&self, ids: &[i64]) -> Result<(), ApiError>;

    async fn mark_all_read(&self) -> Result<(), ApiError>;

    async fn remove(&self, ids: &[i64]) -> Result<(), ApiError>;
}

/// Pagination state. `page` is the last fetched page (1-based, 0 before
/// the first load). `loaded <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub size: u32,
    pub total: usize,
    pub loaded: usize,
}

impl PageCursor {
    pub fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: size.max(1),
            total: 0,
            loaded: 0,
        }
    }

    /// True once a page was fetched and everything the server has is loaded.
    pub fn exhausted(&self) -> bool {
        self.page > 0 && self.loaded >= self.total
    }
}

struct FeedState {
    items: Vec<Notification>,
    cursor: PageCursor,
    loading: bool,
    /// Bumped by `reload` so a superseded fetch is discarded.
    generation: u64,
}

impl FeedState {
    fn sync_loaded(&mut self) {
        self.cursor.loaded = self.items.len();
        self.cursor.total = self.cursor.total.max(self.cursor.loaded);
    }

    /// Replace known ids in place, append the rest.
    fn merge(&mut self, incoming: Vec<Notification>) {
        for item in incoming {
            match self.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => *existing = item,
                None => self.items.push(item),
            }
        }
    }
}

pub struct NotificationFeed {
    source: Arc<dyn NotificationSource>,
    state: Mutex<FeedState>,
}

impl NotificationFeed {
    pub fn new(source: Arc<dyn NotificationSource>, page_size: u32) -> Self {
        Self {
            source,
            state: Mutex::new(FeedState {
                items: Vec::new(),
                cursor: PageCursor::new(page_size),
                loading: false,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop everything and fetch page 1. Any load still in flight is
    /// discarded when it completes.
    pub async fn reload(&self) -> Result<(), ApiError> {
        let (query, generation) = {
            let mut state = self.lock();
            state.generation += 1;
            state.items.clear();
            state.cursor = PageCursor::new(state.cursor.size);
            state.loading = true;
            (PageQuery::new(1, state.cursor.size), state.generation)
        };
        self.fetch(query, generation).await.map(|_| ())
    }

    /// Fetch the next page. Returns `false` without calling the backend
    /// when a load is already in flight or nothing is left.
    pub async fn load_more(&self) -> Result<bool, ApiError> {
        let (query, generation) = {
            let mut state = self.lock();
            if state.loading || state.cursor.exhausted() {
                return Ok(false);
            }
            state.loading = true;
            (
                PageQuery::new(state.cursor.page + 1, state.cursor.size),
                state.generation,
            )
        };
        self.fetch(query, generation).await
    }

    async fn fetch(&self, query: PageQuery, generation: u64) -> Result<bool, ApiError> {
        let result = self.source.fetch_page(query).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(page = query.page, "discarding superseded page");
            return Ok(false);
        }
        state.loading = false;
        let page = result?;

        let empty = page.items.is_empty();
        state.merge(page.items);
        state.cursor.page = query.page;
        state.cursor.total = page.total;
        state.sync_loaded();
        if empty {
            // Nothing more to fetch, whatever the server's count says.
            state.cursor.total = state.cursor.loaded;
        }
        debug!(
            page = query.page,
            loaded = state.cursor.loaded,
            total = state.cursor.total,
            "notification page merged"
        );
        Ok(true)
    }

    /// Apply a realtime event: replace in place when the id is known,
    /// otherwise insert it at the front as the newest item.
    pub fn push(&self, item: Notification) {
        let mut state = self.lock();
        if let Some(existing) = state.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item;
            return;
        }
        state.items.insert(0, item);
        state.cursor.total += 1;
        state.sync_loaded();
    }

    pub fn mark_read(&self, id: i64) -> JoinHandle<()> {
        if let Some(item) = self.lock().items.iter_mut().find(|i| i.id == id) {
            item.is_read = true;
        }
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            if let Err(e) = source.mark_read(&[id]).await {
                warn!(id, error = %e, "failed to mark notification read");
            }
        })
    }

    pub fn mark_all_read(&self) -> JoinHandle<()> {
        for item in self.lock().items.iter_mut() {
            item.is_read = true;
        }
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            if let Err(e) = source.mark_all_read().await {
                warn!(error = %e, "failed to mark all notifications read");
            }
        })
    }

    pub fn remove(&self, ids: &[i64]) -> JoinHandle<()> {
        {
            let doomed: HashSet<i64> = ids.iter().copied().collect();
            let mut state = self.lock();
            let before = state.items.len();
            state.items.retain(|i| !doomed.contains(&i.id));
            let removed = before - state.items.len();
            state.cursor.total = state.cursor.total.saturating_sub(removed);
            state.sync_loaded();
        }
        let source = Arc::clone(&self.source);
        let ids = ids.to_vec();
        tokio::spawn(async move {
            if let Err(e) = source.remove(&ids).await {
                warn!(ids = ?ids, error = %e, "failed to remove notifications");
            }
        })
    }

    pub fn items(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().items.iter().filter(|i| !i.is_read).count()
    }

    pub fn cursor(&self) -> PageCursor {
        self.lock().cursor
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }
}
