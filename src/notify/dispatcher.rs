use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{render, LifecycleEvent};
use crate::state::AppState;

/// Drains lifecycle events and fans each out to both channels: the in-app
/// banner stream and, permission allowing, the platform push gateway.
pub async fn run_notifier(state: Arc<AppState>, mut event_rx: mpsc::Receiver<LifecycleEvent>) {
    info!("notification dispatcher started");

    while let Some(event) = event_rx.recv().await {
        state.metrics.notices_in_queue.dec();

        let notice = render(&event, state.banner_dismiss_ms);

        // In-app banner channel. No subscribers is fine.
        let _ = state.notice_tx.send(notice.clone());
        state
            .metrics
            .notifications_total
            .with_label_values(&["banner"])
            .inc();

        // Platform push is best-effort and silently skipped when denied.
        if state.push.deliver(&notice) {
            state
                .metrics
                .notifications_total
                .with_label_values(&["push"])
                .inc();
        } else {
            state
                .metrics
                .notifications_total
                .with_label_values(&["push_skipped"])
                .inc();
        }

        info!(
            notice_id = %notice.id,
            audience = ?notice.audience,
            title = %notice.title,
            "notice dispatched"
        );
    }

    warn!("notification dispatcher stopped: queue channel closed");
}
