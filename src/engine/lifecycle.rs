use chrono::Utc;
use uuid::Uuid;

use crate::engine::pricing;
use crate::error::AppError;
use crate::models::job::{Job, JobPatch, JobStatus, Role, VehicleType};
use crate::notify::{self, LifecycleEvent};
use crate::state::AppState;

/// Requester-supplied fields for a new job. Required text fields are
/// validated at the API boundary before this is built.
#[derive(Debug, Clone)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub payout: f64,
    pub vehicle_type: VehicleType,
    pub distance_miles: f64,
    pub image_url: Option<String>,
    pub fragility: Option<String>,
    pub handling_instructions: Option<String>,
}

pub async fn create_job(state: &AppState, draft: JobDraft) -> Result<Job, AppError> {
    let quote = pricing::quote(draft.payout);

    let job = Job {
        id: Uuid::new_v4(),
        title: draft.title,
        description: draft.description,
        pickup_location: draft.pickup_location,
        dropoff_location: draft.dropoff_location,
        status: JobStatus::Pending,
        payout: draft.payout,
        platform_fee: quote.fee,
        vehicle_type: draft.vehicle_type,
        image_url: draft.image_url,
        distance_miles: draft.distance_miles,
        fragility: draft.fragility,
        handling_instructions: draft.handling_instructions,
        driver_confirmed: false,
        requester_confirmed: false,
        rating_for_driver: None,
        rating_for_requester: None,
        created_at: Utc::now(),
    };

    let job = state.store.insert_job(job).await?;
    state.metrics.jobs_created_total.inc();
    notify::enqueue(state, LifecycleEvent::JobPosted(job.clone())).await;
    Ok(job)
}

pub async fn accept_job(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    let current = state.store.job(id).await?;
    if current.status != JobStatus::Pending {
        return Err(AppError::Conflict(format!(
            "job {} is not open for acceptance",
            id
        )));
    }

    let patch = JobPatch {
        status: Some(JobStatus::Accepted),
        ..Default::default()
    };
    let job = state.store.update_job(id, patch).await?;
    notify::enqueue(state, LifecycleEvent::JobAccepted(job.clone())).await;
    Ok(job)
}

/// Records one side's delivery confirmation. The job completes exactly
/// when the second side confirms; re-confirming an already-confirmed role
/// succeeds without touching state or announcing anything.
pub async fn confirm(state: &AppState, id: Uuid, role: Role) -> Result<Job, AppError> {
    let current = state.store.job(id).await?;
    if current.status == JobStatus::Pending {
        return Err(AppError::Conflict(format!(
            "job {} has not been accepted yet",
            id
        )));
    }
    if current.confirmed_by(role) {
        return Ok(current);
    }

    let other_confirmed = current.confirmed_by(role.other());
    let mut patch = JobPatch::default();
    match role {
        Role::Driver => patch.driver_confirmed = Some(true),
        Role::Requester => patch.requester_confirmed = Some(true),
    }
    if other_confirmed {
        patch.status = Some(JobStatus::Completed);
    }

    let job = state.store.update_job(id, patch).await?;
    notify::enqueue(
        state,
        LifecycleEvent::ConfirmationRecorded {
            job: job.clone(),
            by: role,
            completed: other_confirmed,
        },
    )
    .await;
    Ok(job)
}

/// A driver rates the requester and vice versa: the written field belongs
/// to the other party. Re-rating overwrites the previous score.
pub async fn rate(state: &AppState, id: Uuid, role: Role, score: u8) -> Result<Job, AppError> {
    if !(1..=5).contains(&score) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let current = state.store.job(id).await?;
    if current.status != JobStatus::Completed {
        return Err(AppError::Conflict(format!(
            "job {} has not been completed",
            id
        )));
    }

    let mut patch = JobPatch::default();
    match role {
        Role::Driver => patch.rating_for_requester = Some(score),
        Role::Requester => patch.rating_for_driver = Some(score),
    }

    let job = state.store.update_job(id, patch).await?;
    notify::enqueue(
        state,
        LifecycleEvent::RatingSubmitted {
            job: job.clone(),
            by: role,
        },
    )
    .await;
    Ok(job)
}
