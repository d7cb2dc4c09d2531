//! Persistence boundary: async load/save of full project snapshots as JSON.
//!
//! Save failures propagate as typed errors and leave the in-memory project
//! untouched; the session clears its unsaved-changes flag only on success.

use std::path::{Path, PathBuf};

use log::info;

use crate::model::Project;

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// JSON-file project store rooted at a directory.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    root: PathBuf,
}

impl JsonProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a project would be saved at.
    pub fn path_for(&self, project: &Project) -> PathBuf {
        self.root.join(format!("project-{}.json", project.id))
    }

    /// Serialize and write a full project snapshot. Returns the written
    /// path.
    pub async fn save(&self, project: &Project) -> Result<PathBuf, PersistError> {
        let bytes = serde_json::to_vec_pretty(project)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(project);
        tokio::fs::write(&path, bytes).await?;
        info!("saved project '{}' to {}", project.name, path.display());
        Ok(path)
    }

    /// Load a full project snapshot from a file.
    pub async fn load(&self, path: &Path) -> Result<Project, PersistError> {
        let bytes = tokio::fs::read(path).await?;
        let project = serde_json::from_slice(&bytes)?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::from_millis;
    use crate::model::{MediaKind, ProjectSettings, SourceRef};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cutline-persist-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_save_load_round_trip() {
        let project = Project::new("roundtrip", ProjectSettings::default());
        let (project, track_id) = project.add_track(MediaKind::Video);
        let (project, _) = project
            .add_clip(
                track_id,
                MediaKind::Video,
                SourceRef::new("a.mp4"),
                from_millis(1000),
                0,
                from_millis(4000),
            )
            .unwrap();

        let store = JsonProjectStore::new(temp_root("roundtrip"));
        let rt = runtime();
        let path = rt.block_on(store.save(&project)).unwrap();
        let loaded = rt.block_on(store.load(&path)).unwrap();

        assert_eq!(loaded, project);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let store = JsonProjectStore::new(temp_root("missing"));
        let rt = runtime();
        let result = rt.block_on(store.load(Path::new("/nonexistent/project.json")));
        assert!(matches!(result, Err(PersistError::Io(_))));
    }
}
