//! Project catalog: the geotagged projects shown on the map and the stores
//! that persist them.

use foundation::{GeoPoint, Id};
use layers::Marker;
use serde::{Deserialize, Serialize};

mod file;
mod query;

pub use file::JsonFileProjectStore;
pub use query::{ProjectQuery, StatusCounts};

/// Highest rating a draft may start with.
pub const MAX_INITIAL_RATING: u32 = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Verified,
    Pending,
    Unverified,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Verified,
        ProjectStatus::Pending,
        ProjectStatus::Unverified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Verified => "verified",
            ProjectStatus::Pending => "pending",
            ProjectStatus::Unverified => "unverified",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Verified => "Verified",
            ProjectStatus::Pending => "Pending review",
            ProjectStatus::Unverified => "Unverified",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Ok(ProjectStatus::Verified),
            "pending" => Ok(ProjectStatus::Pending),
            "unverified" => Ok(ProjectStatus::Unverified),
            other => Err(CatalogError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub image_url: String,
    pub coordinates: GeoPoint,
    pub created_at_ms: u64,
    pub status: ProjectStatus,
    #[serde(default)]
    pub rating: Option<u32>,
}

impl Project {
    pub fn is_rateable(&self) -> bool {
        self.status == ProjectStatus::Verified
    }

    /// Rating as shown on a project card; large values are capped.
    pub fn rating_label(&self) -> String {
        match self.rating.unwrap_or(0) {
            r if r > 999 => "999+".to_string(),
            r => r.to_string(),
        }
    }

    pub fn to_marker(&self) -> Marker {
        Marker::new(self.id.clone(), self.coordinates, self.name.clone())
    }
}

/// Values entered for a project that has not been placed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    pub author: String,
    pub image_url: String,
    pub status: ProjectStatus,
    pub rating: u32,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            image_url: String::new(),
            status: ProjectStatus::Unverified,
            rating: 0,
        }
    }
}

impl ProjectDraft {
    /// Complete when name and author are non-blank and a location is chosen.
    pub fn is_complete(&self, location: Option<GeoPoint>) -> bool {
        self.validate(location).is_ok()
    }

    pub fn validate(&self, location: Option<GeoPoint>) -> Result<GeoPoint, CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        if self.author.trim().is_empty() {
            return Err(CatalogError::MissingField("author"));
        }
        let location = location.ok_or(CatalogError::MissingField("location"))?;
        location
            .validate()
            .map_err(|e| CatalogError::InvalidLocation(e.to_string()))
    }

    pub fn into_project(
        self,
        id: Id,
        location: Option<GeoPoint>,
        created_at_ms: u64,
    ) -> Result<Project, CatalogError> {
        let coordinates = self.validate(location)?;
        Ok(Project {
            id,
            name: self.name.trim().to_string(),
            author: self.author.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            coordinates,
            created_at_ms,
            status: self.status,
            rating: Some(self.rating.min(MAX_INITIAL_RATING)),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("project {0} not found")]
    NotFound(Id),
    #[error("project {0} already exists")]
    DuplicateId(Id),
    #[error("project {0} is not verified and cannot be rated")]
    NotRateable(Id),
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("catalog storage corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("catalog storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered collection of projects. `list` returns insertion order.
pub trait ProjectStore {
    fn list(&self) -> Result<Vec<Project>, CatalogError>;
    fn get(&self, id: &Id) -> Result<Option<Project>, CatalogError>;
    /// Replaces a project with the same id in place, or appends.
    fn upsert(&mut self, project: Project) -> Result<(), CatalogError>;
    fn delete(&mut self, id: &Id) -> Result<bool, CatalogError>;

    /// Adds one to a verified project's rating and returns the new value.
    fn increase_rating(&mut self, id: &Id) -> Result<u32, CatalogError> {
        let mut project = self
            .get(id)?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        if !project.is_rateable() {
            return Err(CatalogError::NotRateable(id.clone()));
        }
        let rating = project.rating.unwrap_or(0).saturating_add(1);
        project.rating = Some(rating);
        self.upsert(project)?;
        Ok(rating)
    }

    fn markers(&self) -> Result<Vec<Marker>, CatalogError> {
        Ok(self.list()?.iter().map(Project::to_marker).collect())
    }
}

pub(crate) fn upsert_in_place(projects: &mut Vec<Project>, project: Project) {
    match projects.iter_mut().find(|p| p.id == project.id) {
        Some(slot) => *slot = project,
        None => projects.push(project),
    }
}

pub(crate) fn remove_by_id(projects: &mut Vec<Project>, id: &Id) -> bool {
    let before = projects.len();
    projects.retain(|p| &p.id != id);
    projects.len() != before
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: Vec<Project>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn list(&self) -> Result<Vec<Project>, CatalogError> {
        Ok(self.projects.clone())
    }

    fn get(&self, id: &Id) -> Result<Option<Project>, CatalogError> {
        Ok(self.projects.iter().find(|p| &p.id == id).cloned())
    }

    fn upsert(&mut self, project: Project) -> Result<(), CatalogError> {
        upsert_in_place(&mut self.projects, project);
        Ok(())
    }

    fn delete(&mut self, id: &Id) -> Result<bool, CatalogError> {
        Ok(remove_by_id(&mut self.projects, id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use foundation::{GeoPoint, Id};
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) fn project(id: &str, status: ProjectStatus, created_at_ms: u64) -> Project {
        Project {
            id: Id::from(id),
            name: format!("Project {id}"),
            author: "Anna".to_string(),
            image_url: String::new(),
            coordinates: GeoPoint::new(56.2, 58.0),
            created_at_ms,
            status,
            rating: Some(0),
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = InMemoryProjectStore::new();
        store.upsert(project("a", ProjectStatus::Verified, 1)).unwrap();
        store.upsert(project("b", ProjectStatus::Pending, 2)).unwrap();
        let mut renamed = project("a", ProjectStatus::Verified, 1);
        renamed.name = "Renamed".into();
        store.upsert(renamed).unwrap();

        let list = store.list().unwrap();
        let ids: Vec<&str> = list.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(list[0].name, "Renamed");
    }

    #[test]
    fn delete_reports_presence() {
        let mut store = InMemoryProjectStore::with_projects(vec![project("a", ProjectStatus::Pending, 1)]);
        assert!(store.delete(&Id::from("a")).unwrap());
        assert!(!store.delete(&Id::from("a")).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn only_verified_projects_can_be_rated() {
        let mut store = InMemoryProjectStore::with_projects(vec![
            project("v", ProjectStatus::Verified, 1),
            project("p", ProjectStatus::Pending, 2),
        ]);
        assert_eq!(store.increase_rating(&Id::from("v")).unwrap(), 1);
        assert_eq!(store.increase_rating(&Id::from("v")).unwrap(), 2);
        assert!(matches!(
            store.increase_rating(&Id::from("p")),
            Err(CatalogError::NotRateable(_))
        ));
        assert!(matches!(
            store.increase_rating(&Id::from("nope")),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn rating_label_caps_large_values() {
        let mut p = project("a", ProjectStatus::Verified, 1);
        p.rating = Some(999);
        assert_eq!(p.rating_label(), "999");
        p.rating = Some(1_000);
        assert_eq!(p.rating_label(), "999+");
        p.rating = None;
        assert_eq!(p.rating_label(), "0");
    }

    #[test]
    fn draft_validation() {
        let spot = Some(GeoPoint::new(56.25, 58.05));
        let mut draft = ProjectDraft {
            name: "  ".into(),
            author: "Ivan".into(),
            ..ProjectDraft::default()
        };
        assert!(matches!(draft.validate(spot), Err(CatalogError::MissingField("name"))));
        draft.name = "Fountain".into();
        assert!(matches!(draft.validate(None), Err(CatalogError::MissingField("location"))));
        assert!(draft.is_complete(spot));
        assert!(!draft.is_complete(Some(GeoPoint::new(0.0, 91.0))));
    }

    #[test]
    fn draft_becomes_project() {
        let draft = ProjectDraft {
            name: " Fountain ".into(),
            author: "Ivan".into(),
            status: ProjectStatus::Verified,
            rating: 250,
            ..ProjectDraft::default()
        };
        let p = draft
            .into_project(Id::from("x"), Some(GeoPoint::new(56.25, 58.05)), 42)
            .unwrap();
        assert_eq!(p.name, "Fountain");
        assert_eq!(p.rating, Some(MAX_INITIAL_RATING));
        assert_eq!(p.created_at_ms, 42);
        assert_eq!(p.to_marker().label, "Fountain");
    }

    #[test]
    fn status_parses_and_serializes_lowercase() {
        assert_eq!("Verified".parse::<ProjectStatus>().unwrap(), ProjectStatus::Verified);
        assert!("bogus".parse::<ProjectStatus>().is_err());
        let json = serde_json::to_string(&ProjectStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
