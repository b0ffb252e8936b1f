use crate::channels::{BrowserFeed, Sharer};
use crate::clock::Clock;
use crate::repository::ActivityRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: ActivityRepository,
    pub feed: Arc<BrowserFeed>,
    pub clock: Arc<dyn Clock>,
    pub sharer: Option<Arc<dyn Sharer>>,
}

impl AppState {
    /// `sharer` is `None` when the host has no share target; the share route
    /// then answers with the unsupported message and the payload.
    pub fn new(
        repository: ActivityRepository,
        feed: Arc<BrowserFeed>,
        clock: Arc<dyn Clock>,
        sharer: Option<Arc<dyn Sharer>>,
    ) -> Self {
        Self {
            repository,
            feed,
            clock,
            sharer,
        }
    }
}
