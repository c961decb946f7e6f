use std::path::{Path, PathBuf};

use foundation::Id;
use tracing::debug;

use crate::{CatalogError, Project, ProjectStore, remove_by_id, upsert_in_place};

/// Persists the full project list as one JSON array.
///
/// Every mutation rewrites the whole file through a sibling `.tmp` file and a
/// rename, so readers never observe a half-written list.
#[derive(Debug)]
pub struct JsonFileProjectStore {
    path: PathBuf,
    projects: Vec<Project>,
}

impl JsonFileProjectStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let projects = match std::fs::read_to_string(&path) {
            Ok(s) if s.trim().is_empty() => Vec::new(),
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), projects = projects.len(), "project store opened");
        Ok(Self { path, projects })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(&self.projects)?;
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), projects = self.projects.len(), "project store saved");
        Ok(())
    }
}

impl ProjectStore for JsonFileProjectStore {
    fn list(&self) -> Result<Vec<Project>, CatalogError> {
        Ok(self.projects.clone())
    }

    fn get(&self, id: &Id) -> Result<Option<Project>, CatalogError> {
        Ok(self.projects.iter().find(|p| &p.id == id).cloned())
    }

    fn upsert(&mut self, project: Project) -> Result<(), CatalogError> {
        upsert_in_place(&mut self.projects, project);
        self.save()
    }

    fn delete(&mut self, id: &Id) -> Result<bool, CatalogError> {
        let removed = remove_by_id(&mut self.projects, id);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }
}
