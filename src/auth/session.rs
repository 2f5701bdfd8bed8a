use tracing::warn;

use crate::error::AppError;
use crate::models::user::User;
use crate::store::BlobBackend;

/// The signed-in identity, persisted under its own key so it survives a
/// restart independently of the main collections.
pub struct SessionStore {
    backend: Box<dyn BlobBackend>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn BlobBackend>) -> Self {
        Self { backend }
    }

    /// An unreadable session blob is treated as signed-out.
    pub fn load(&self) -> Option<User> {
        let raw = self.backend.load().ok().flatten()?;
        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "session blob is corrupt; discarding");
                None
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<(), AppError> {
        let raw = serde_json::to_string(&Some(user))
            .map_err(|err| AppError::Internal(format!("session encode failed: {err}")))?;
        self.backend
            .save(&raw)
            .map_err(|err| AppError::Internal(format!("session write failed: {err}")))
    }

    pub fn clear(&self) -> Result<(), AppError> {
        self.backend
            .save("null")
            .map_err(|err| AppError::Internal(format!("session write failed: {err}")))
    }
}
