use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::patch;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth;
use crate::error::AppError;
use crate::models::user::User;
use crate::notify::{self, LifecycleEvent};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/users/:id/availability", patch(update_availability))
}

#[derive(Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub is_available: bool,
}

async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAvailabilityRequest>,
) -> Result<Json<User>, AppError> {
    let user = auth::set_availability(&state, id, payload.is_available).await?;
    notify::enqueue(&state, LifecycleEvent::AvailabilityChanged(user.clone())).await;
    Ok(Json(user))
}
