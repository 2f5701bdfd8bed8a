mod backend;
mod seed;

pub use backend::{BlobBackend, FileBackend, MemoryBackend};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::{Job, JobPatch};
use crate::models::user::{User, UserPatch};
use crate::observability::metrics::Metrics;

/// Everything the service persists, as a single JSON blob. The session
/// identity deliberately lives in its own blob (see `auth::SessionStore`)
/// so it survives independently of the collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    pub jobs: Vec<Job>,
    pub users: Vec<User>,
}

/// Blob-backed record store. Every operation sleeps for the configured
/// latency before touching the blob, mirroring a remote service boundary;
/// callers must not assume same-tick completion. Operations serialize
/// through one lock, read-modify-write, last write wins.
pub struct Store {
    backend: Mutex<Box<dyn BlobBackend>>,
    latency: Duration,
    metrics: Metrics,
}

impl Store {
    pub fn new(backend: Box<dyn BlobBackend>, latency: Duration, metrics: Metrics) -> Self {
        Self {
            backend: Mutex::new(backend),
            latency,
            metrics,
        }
    }

    /// Jobs, newest first.
    pub async fn jobs(&self) -> Result<Vec<Job>, AppError> {
        self.read("list_jobs", |blob| {
            let mut jobs = blob.jobs.clone();
            jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(jobs)
        })
        .await
    }

    pub async fn job(&self, id: Uuid) -> Result<Job, AppError> {
        self.read("get_job", |blob| {
            blob.jobs
                .iter()
                .find(|job| job.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("job {} not found", id)))
        })
        .await
    }

    pub async fn insert_job(&self, job: Job) -> Result<Job, AppError> {
        self.write("insert_job", |blob| {
            blob.jobs.insert(0, job.clone());
            Ok(job)
        })
        .await
    }

    pub async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<Job, AppError> {
        self.write("update_job", |blob| {
            let job = blob
                .jobs
                .iter_mut()
                .find(|job| job.id == id)
                .ok_or_else(|| AppError::NotFound(format!("job {} not found", id)))?;
            job.apply(patch);
            Ok(job.clone())
        })
        .await
    }

    pub async fn users(&self) -> Result<Vec<User>, AppError> {
        self.read("list_users", |blob| Ok(blob.users.clone())).await
    }

    pub async fn insert_user(&self, user: User) -> Result<User, AppError> {
        self.write("insert_user", |blob| {
            let taken = blob
                .users
                .iter()
                .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
            if taken {
                return Err(AppError::DuplicateUser(user.email.clone()));
            }
            blob.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, AppError> {
        self.write("update_user", |blob| {
            let user = blob
                .users
                .iter_mut()
                .find(|user| user.id == id)
                .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;
            user.apply(patch);
            Ok(user.clone())
        })
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.read("find_user_by_email", |blob| {
            Ok(blob
                .users
                .iter()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned())
        })
        .await
    }

    /// Collection sizes for the health endpoint. Skips the simulated
    /// latency: probes are internal, not client traffic.
    pub async fn counts(&self) -> Result<(usize, usize), AppError> {
        let backend = self.backend.lock().await;
        let blob = load_or_seed(backend.as_ref())?;
        Ok((blob.jobs.len(), blob.users.len()))
    }

    async fn read<T>(
        &self,
        op: &str,
        f: impl FnOnce(&Blob) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let start = Instant::now();
        tokio::time::sleep(self.latency).await;

        let backend = self.backend.lock().await;
        let blob = load_or_seed(backend.as_ref())?;
        let result = f(&blob);

        self.metrics
            .store_op_seconds
            .with_label_values(&[op])
            .observe(start.elapsed().as_secs_f64());
        result
    }

    async fn write<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut Blob) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let start = Instant::now();
        tokio::time::sleep(self.latency).await;

        let backend = self.backend.lock().await;
        let mut blob = load_or_seed(backend.as_ref())?;
        let result = f(&mut blob);

        if result.is_ok() {
            persist(backend.as_ref(), &blob)?;
        }

        self.metrics
            .store_op_seconds
            .with_label_values(&[op])
            .observe(start.elapsed().as_secs_f64());
        result
    }
}

/// A missing blob is seeded; an unreadable one is discarded and reseeded.
/// The reseed is silent data loss, acceptable only for this demo store.
fn load_or_seed(backend: &dyn BlobBackend) -> Result<Blob, AppError> {
    let raw = backend
        .load()
        .map_err(|err| AppError::Internal(format!("blob read failed: {err}")))?;

    match raw {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(blob) => Ok(blob),
            Err(err) => {
                warn!(error = %err, "stored blob is corrupt; reseeding");
                let blob = seed::initial_blob();
                persist(backend, &blob)?;
                Ok(blob)
            }
        },
        None => {
            let blob = seed::initial_blob();
            persist(backend, &blob)?;
            Ok(blob)
        }
    }
}

fn persist(backend: &dyn BlobBackend, blob: &Blob) -> Result<(), AppError> {
    let raw = serde_json::to_string(blob)
        .map_err(|err| AppError::Internal(format!("blob encode failed: {err}")))?;
    backend
        .save(&raw)
        .map_err(|err| AppError::Internal(format!("blob write failed: {err}")))
}
