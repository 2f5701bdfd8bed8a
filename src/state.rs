use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::advisor::Advisor;
use crate::auth::{PendingLogin, SessionStore};
use crate::config::Config;
use crate::notify::{LifecycleEvent, Notice, PushGateway};
use crate::observability::metrics::Metrics;
use crate::store::{BlobBackend, Store};

pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
    pub pending_logins: DashMap<Uuid, PendingLogin>,
    pub advisor: Advisor,
    pub push: PushGateway,
    pub event_tx: mpsc::Sender<LifecycleEvent>,
    pub notice_tx: broadcast::Sender<Notice>,
    pub metrics: Metrics,
    pub banner_dismiss_ms: u64,
}

impl AppState {
    pub fn new(
        config: &Config,
        store_backend: Box<dyn BlobBackend>,
        session_backend: Box<dyn BlobBackend>,
    ) -> (Self, mpsc::Receiver<LifecycleEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.notify_queue_size);
        let (notice_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);
        let metrics = Metrics::new();

        (
            Self {
                store: Store::new(
                    store_backend,
                    Duration::from_millis(config.store_latency_ms),
                    metrics.clone(),
                ),
                sessions: SessionStore::new(session_backend),
                pending_logins: DashMap::new(),
                advisor: Advisor::new(config.gemini_api_key.clone()),
                push: PushGateway::new(config.push_permission),
                event_tx,
                notice_tx,
                metrics,
                banner_dismiss_ms: config.banner_dismiss_ms,
            },
            event_rx,
        )
    }
}
