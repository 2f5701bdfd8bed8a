use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::advisor::Suggestion;
use crate::engine::lifecycle::{self, JobDraft};
use crate::error::AppError;
use crate::models::job::{Job, Role, VehicleType};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id/accept", post(accept_job))
        .route("/jobs/:id/confirm", post(confirm_job))
        .route("/jobs/:id/rating", post(rate_job))
        .route("/analysis", post(analyze_item))
}

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub payout: f64,
    pub vehicle_type: VehicleType,
    pub distance_miles: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub fragility: Option<String>,
    #[serde(default)]
    pub handling_instructions: Option<String>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub role: Role,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub role: Role,
    pub score: u8,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    pub description: String,
    pub distance_miles: f64,
}

async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<Json<Job>, AppError> {
    for (field, value) in [
        ("title", &payload.title),
        ("pickup_location", &payload.pickup_location),
        ("dropoff_location", &payload.dropoff_location),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} cannot be empty")));
        }
    }
    if payload.payout < 0.0 {
        return Err(AppError::BadRequest("payout cannot be negative".to_string()));
    }
    if payload.distance_miles < 0.0 {
        return Err(AppError::BadRequest(
            "distance cannot be negative".to_string(),
        ));
    }

    let draft = JobDraft {
        title: payload.title,
        description: payload.description,
        pickup_location: payload.pickup_location,
        dropoff_location: payload.dropoff_location,
        payout: payload.payout,
        vehicle_type: payload.vehicle_type,
        distance_miles: payload.distance_miles,
        image_url: payload.image_url,
        fragility: payload.fragility,
        handling_instructions: payload.handling_instructions,
    };

    let job = lifecycle::create_job(&state, draft).await?;
    Ok(Json(job))
}

async fn list_jobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.store.jobs().await?))
}

async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(state.store.job(id).await?))
}

async fn accept_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let result = lifecycle::accept_job(&state, id).await;
    observe(&state, "accept", &result);
    Ok(Json(result?))
}

async fn confirm_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<Job>, AppError> {
    let action = match payload.role {
        Role::Driver => "confirm_driver",
        Role::Requester => "confirm_requester",
    };
    let result = lifecycle::confirm(&state, id, payload.role).await;
    observe(&state, action, &result);
    Ok(Json(result?))
}

async fn rate_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateRequest>,
) -> Result<Json<Job>, AppError> {
    let result = lifecycle::rate(&state, id, payload.role, payload.score).await;
    observe(&state, "rate", &result);
    Ok(Json(result?))
}

/// Vehicle/pricing suggestion for a draft. Always answers: the advisor
/// degrades to a fallback rather than surfacing collaborator failures.
async fn analyze_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<Suggestion>, AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "description cannot be empty".to_string(),
        ));
    }

    let suggestion = state
        .advisor
        .analyze(
            payload.image_base64.as_deref(),
            &payload.description,
            payload.distance_miles,
        )
        .await;
    Ok(Json(suggestion))
}

fn observe<T>(state: &AppState, action: &str, result: &Result<T, AppError>) {
    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .lifecycle_transitions_total
        .with_label_values(&[action, outcome])
        .inc();
}
