use serde_json::{Map, Value};
use shared::storage::KeyValueStore;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Key-value store kept as one JSON object on disk. The whole object is
/// rewritten on every change, inline until `spawn_writer` hands the writes
/// to a background task.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
    writer: Option<mpsc::UnboundedSender<String>>,
}

async fn write_snapshot(path: &Path, body: String) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!("Could not create store directory {}: {}", parent.display(), e);
            return;
        }
    }
    if let Err(e) = tokio::fs::write(path, body).await {
        error!("Could not write store file {}: {}", path.display(), e);
    }
}

impl FileStore {
    /// Reads `path` if it exists. A missing file starts empty; an unreadable
    /// or corrupt one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!("Store file {} is not a JSON object, starting empty", path.display());
                    Map::new()
                }
                Err(e) => {
                    warn!("Store file {} is corrupt ({}), starting empty", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                warn!("Could not read store file {}: {}", path.display(), e);
                Map::new()
            }
        };
        Self {
            path,
            entries,
            writer: None,
        }
    }

    /// Moves disk writes onto a tokio task so handlers holding the store
    /// never block on the filesystem. Needs a running runtime.
    pub fn spawn_writer(mut self) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let path = self.path.clone();
        tokio::spawn(async move {
            while let Some(mut body) = rx.recv().await {
                // Only the newest snapshot needs to reach the disk.
                while let Ok(newer) = rx.try_recv() {
                    body = newer;
                }
                write_snapshot(&path, body).await;
            }
        });
        self.writer = Some(tx);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&mut self) {
        let body = match serde_json::to_string_pretty(&self.entries) {
            Ok(body) => body,
            Err(e) => {
                error!("Could not serialise store: {}", e);
                return;
            }
        };
        let body = match self.writer.take() {
            Some(writer) => match writer.send(body) {
                Ok(()) => {
                    self.writer = Some(writer);
                    return;
                }
                Err(mpsc::error::SendError(body)) => {
                    warn!("Store writer stopped, writing {} inline", self.path.display());
                    body
                }
            },
            None => body,
        };
        self.write_inline(body);
    }

    fn write_inline(&self, body: String) {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Could not create store directory {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, body) {
            error!("Could not write store file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), Value::String(value));
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("prizeplay-store-{}", Uuid::new_v4()))
            .join("progress.json")
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let store = FileStore::open(temp_path());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path();
        let mut store = FileStore::open(&path);
        store.set("scavenger-hunt-progress", "[1,2]".to_string());
        store.set("other", "x".to_string());
        store.remove("other");

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("scavenger-hunt-progress").as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("other"), None);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_background_writer_keeps_latest_snapshot() {
        let path = temp_path();
        let mut store = FileStore::open(&path).spawn_writer();
        for round in 0..20 {
            store.set("round", round.to_string());
        }

        let mut persisted = None;
        for _ in 0..50 {
            persisted = FileStore::open(&path).get("round");
            if persisted.as_deref() == Some("19") {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(persisted.as_deref(), Some("19"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let mut store = FileStore::open(&path);
        assert_eq!(store.get("a"), None);

        store.set("a", "1".to_string());
        assert_eq!(FileStore::open(&path).get("a").as_deref(), Some("1"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
