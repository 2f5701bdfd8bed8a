use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, SsoProvider};
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/sso", post(sso))
        .route("/auth/verify", post(verify))
        .route("/auth/session", get(session))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SsoRequest {
    pub provider: SsoProvider,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub challenge_id: Uuid,
    pub code: String,
}

/// First factor passed; complete with POST /auth/verify.
#[derive(Serialize)]
pub struct ChallengeResponse {
    pub challenge_id: Uuid,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge_id =
        auth::signup(&state, payload.name, payload.email, payload.password).await?;
    Ok(Json(ChallengeResponse { challenge_id }))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge_id = auth::login(&state, payload.email, payload.password).await?;
    Ok(Json(ChallengeResponse { challenge_id }))
}

async fn sso(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SsoRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge_id = auth::sso(&state, payload.provider);
    Ok(Json(ChallengeResponse { challenge_id }))
}

async fn verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<User>, AppError> {
    let user = auth::verify(&state, payload.challenge_id, &payload.code).await?;
    Ok(Json(user))
}

async fn session(State(state): State<Arc<AppState>>) -> Json<Option<User>> {
    Json(state.sessions.load())
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    auth::logout(&state)?;
    Ok(StatusCode::NO_CONTENT)
}
