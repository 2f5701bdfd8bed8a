mod session;

pub use session::SessionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{User, UserPatch};
use crate::state::AppState;

/// Expected length of the one-time code. Any numeric code of this length
/// verifies: the flow is demo-only and performs no real verification. A
/// production build must swap this module for a real identity provider
/// with salted password hashing and device-bound codes.
pub const CODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SsoProvider {
    Google,
    Microsoft,
    Apple,
    Yahoo,
}

impl SsoProvider {
    fn display_name(&self) -> &'static str {
        match self {
            SsoProvider::Google => "Google",
            SsoProvider::Microsoft => "Microsoft",
            SsoProvider::Apple => "Apple",
            SsoProvider::Yahoo => "Yahoo",
        }
    }
}

/// A login that has passed the first factor and is waiting on its code.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub id: Uuid,
    pub intent: LoginIntent,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LoginIntent {
    /// Identity backed by a stored user record.
    Credentials(User),
    /// External sign-on; yields an ephemeral guest identity, never stored.
    Sso(SsoProvider),
}

/// Creates the account, then hands back a challenge to complete. Fails
/// with DuplicateUser before anything is written for a taken email.
pub async fn signup(
    state: &AppState,
    name: String,
    email: String,
    password: String,
) -> Result<Uuid, AppError> {
    require_field("name", &name)?;
    require_field("password", &password)?;
    require_email(&email)?;

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        avatar_url: None,
        is_available: false,
        created_at: Utc::now(),
    };
    let user = state.store.insert_user(user).await?;
    Ok(begin(state, LoginIntent::Credentials(user)))
}

/// First factor for an existing account. The password is required but not
/// checked against anything (see module note).
pub async fn login(state: &AppState, email: String, password: String) -> Result<Uuid, AppError> {
    require_field("password", &password)?;
    require_email(&email)?;

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("no account for that email".to_string()))?;
    Ok(begin(state, LoginIntent::Credentials(user)))
}

/// External sign-on selection. No redirect happens; the provider choice
/// goes straight to the second factor.
pub fn sso(state: &AppState, provider: SsoProvider) -> Uuid {
    begin(state, LoginIntent::Sso(provider))
}

fn begin(state: &AppState, intent: LoginIntent) -> Uuid {
    let pending = PendingLogin {
        id: Uuid::new_v4(),
        intent,
        created_at: Utc::now(),
    };
    let id = pending.id;
    state.pending_logins.insert(id, pending);
    id
}

/// Second factor. Consumes the challenge and persists the session; a
/// malformed code leaves the challenge in place for another attempt.
pub async fn verify(state: &AppState, challenge_id: Uuid, code: &str) -> Result<User, AppError> {
    if code.len() != CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(format!("code must be {CODE_LEN} digits")));
    }

    let (_, pending) = state
        .pending_logins
        .remove(&challenge_id)
        .ok_or_else(|| AppError::NotFound("unknown or expired challenge".to_string()))?;

    let mut user = match pending.intent {
        LoginIntent::Credentials(user) => user,
        LoginIntent::Sso(provider) => guest_user(provider),
    };
    // Fresh sign-ins start visible to driver-side alerts.
    user.is_available = true;

    state.sessions.save(&user)?;
    Ok(user)
}

pub fn logout(state: &AppState) -> Result<(), AppError> {
    state.sessions.clear()
}

/// Availability toggle. Guest (SSO) sessions have no stored record, so
/// the change lands on the session copy alone.
pub async fn set_availability(
    state: &AppState,
    user_id: Uuid,
    is_available: bool,
) -> Result<User, AppError> {
    let patch = UserPatch {
        is_available: Some(is_available),
        ..Default::default()
    };

    let user = match state.store.update_user(user_id, patch).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            let mut user = state
                .sessions
                .load()
                .filter(|user| user.id == user_id)
                .ok_or_else(|| AppError::NotFound(format!("user {} not found", user_id)))?;
            user.is_available = is_available;
            user
        }
        Err(err) => return Err(err),
    };

    // Keep the persisted session in step when it belongs to this user.
    if state
        .sessions
        .load()
        .is_some_and(|current| current.id == user.id)
    {
        state.sessions.save(&user)?;
    }

    Ok(user)
}

fn guest_user(provider: SsoProvider) -> User {
    let name = provider.display_name();
    User {
        id: Uuid::new_v4(),
        name: format!("{name} User"),
        email: format!("{}@sso.invalid", name.to_ascii_lowercase()),
        avatar_url: None,
        is_available: false,
        created_at: Utc::now(),
    }
}

fn require_field(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), AppError> {
    require_field("email", email)?;
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }
    Ok(())
}
