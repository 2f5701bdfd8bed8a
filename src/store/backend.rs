use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where a raw JSON blob lives. Swapping the backend is how a real
/// backing service would be introduced without touching lifecycle code.
pub trait BlobBackend: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, raw: &str) -> io::Result<()>;
}

pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BlobBackend for FileBackend {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, raw)
    }
}

/// In-memory backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preloaded(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }
}

impl BlobBackend for MemoryBackend {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot.lock().expect("backend slot poisoned").clone())
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        *self.slot.lock().expect("backend slot poisoned") = Some(raw.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{BlobBackend, FileBackend};

    #[test]
    fn file_backend_round_trips_and_reports_missing_files() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("blob.json"));

        assert!(backend.load().unwrap().is_none());
        backend.save(r#"{"jobs":[],"users":[]}"#).unwrap();
        assert_eq!(
            backend.load().unwrap().unwrap(),
            r#"{"jobs":[],"users":[]}"#
        );
    }
}
