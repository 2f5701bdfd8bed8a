mod dispatcher;
mod push;

pub use dispatcher::run_notifier;
pub use push::{PushGateway, PushPermission};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::job::{Job, Role};
use crate::models::user::User;
use crate::state::AppState;

/// Lifecycle transitions that fan out to users. Events are enqueued only
/// after the triggering state change has been persisted; a failed write
/// never produces a notice.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    JobPosted(Job),
    JobAccepted(Job),
    ConfirmationRecorded {
        job: Job,
        by: Role,
        completed: bool,
    },
    RatingSubmitted {
        job: Job,
        by: Role,
    },
    AvailabilityChanged(User),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Alert,
}

/// Which side of the marketplace a notice is addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Audience {
    Driver,
    Requester,
}

fn audience_for(role: Role) -> Audience {
    match role {
        Role::Driver => Audience::Driver,
        Role::Requester => Audience::Requester,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: NoticeKind,
    pub audience: Audience,
    /// How long the in-app banner stays up before auto-dismissing.
    pub auto_dismiss_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Selects the message template and target role for a lifecycle event.
pub fn render(event: &LifecycleEvent, auto_dismiss_ms: u64) -> Notice {
    let (title, body, kind, audience) = match event {
        LifecycleEvent::JobPosted(job) => (
            "New haul alert".to_string(),
            format!(
                "A new {} job was just posted nearby: {}",
                job.vehicle_type.label(),
                job.title
            ),
            NoticeKind::Alert,
            Audience::Driver,
        ),
        LifecycleEvent::JobAccepted(job) => (
            "Driver found".to_string(),
            format!(
                "A driver has accepted your request for: {}. They are on their way.",
                job.title
            ),
            NoticeKind::Success,
            Audience::Requester,
        ),
        LifecycleEvent::ConfirmationRecorded {
            job,
            by: Role::Driver,
            completed: true,
        } => (
            "Delivery complete".to_string(),
            format!(
                "Escrow released. {} has been delivered and confirmed by both parties.",
                job.title
            ),
            NoticeKind::Success,
            Audience::Requester,
        ),
        LifecycleEvent::ConfirmationRecorded {
            job,
            by: Role::Driver,
            completed: false,
        } => (
            "Delivery update".to_string(),
            format!(
                "Driver has arrived for {}. Confirm receipt to release funds.",
                job.title
            ),
            NoticeKind::Alert,
            Audience::Requester,
        ),
        LifecycleEvent::ConfirmationRecorded {
            job,
            by: Role::Requester,
            completed: true,
        } => (
            "Payment released".to_string(),
            format!(
                "Customer confirmed receipt of {}. Funds are on the way to your wallet.",
                job.title
            ),
            NoticeKind::Success,
            Audience::Driver,
        ),
        LifecycleEvent::ConfirmationRecorded {
            job,
            by: Role::Requester,
            completed: false,
        } => (
            "Customer confirmed".to_string(),
            format!(
                "Customer confirmed receipt of {}. Waiting on your delivery confirmation.",
                job.title
            ),
            NoticeKind::Info,
            Audience::Driver,
        ),
        LifecycleEvent::RatingSubmitted { job, by } => (
            "Rating submitted".to_string(),
            format!("Thanks for your feedback on {}.", job.title),
            NoticeKind::Success,
            audience_for(*by),
        ),
        LifecycleEvent::AvailabilityChanged(user) if user.is_available => (
            "You are now online".to_string(),
            "You will be notified of new jobs nearby.".to_string(),
            NoticeKind::Success,
            Audience::Driver,
        ),
        LifecycleEvent::AvailabilityChanged(_) => (
            "You are offline".to_string(),
            "You won't receive new job alerts.".to_string(),
            NoticeKind::Info,
            Audience::Driver,
        ),
    };

    Notice {
        id: Uuid::new_v4(),
        title,
        body,
        kind,
        audience,
        auto_dismiss_ms,
        created_at: Utc::now(),
    }
}

/// Hand an event to the dispatcher. Persistence already succeeded by the
/// time this runs, so a closed queue only costs the notice, never the op.
pub async fn enqueue(state: &AppState, event: LifecycleEvent) {
    if state.event_tx.send(event).await.is_err() {
        warn!("notification queue closed; dropping event");
        return;
    }
    state.metrics.notices_in_queue.inc();
}
