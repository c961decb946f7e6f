use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use catalog::{CatalogError, Project, ProjectDraft, ProjectQuery, ProjectStore, StatusCounts};
use foundation::{GeoPoint, Id};
use tracing::{debug, info, warn};
use viewport::{
    FocusCommand, MapEngine, RenderTarget, ViewportConfig, ViewportController, ViewportError,
};

/// Animation step used by [`ProjectSession::settle`] (one 60 Hz frame).
const SETTLE_STEP_MS: f64 = 16.0;
const SETTLE_MAX_TICKS: usize = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error("not placing a project")]
    NotPlacing,
    #[error("unknown project {0}")]
    UnknownProject(Id),
}

/// Owns the project list and the placement flow, and keeps the viewport in
/// sync with both.
///
/// Map clicks are delivered to the session through the viewport's click
/// callback and applied on the next [`ProjectSession::update`].
pub struct ProjectSession<S: ProjectStore, E: MapEngine> {
    store: S,
    viewport: ViewportController<E>,
    placing: bool,
    selected: Option<GeoPoint>,
    draft: ProjectDraft,
    clicks: Rc<RefCell<Vec<GeoPoint>>>,
}

impl<S: ProjectStore, E: MapEngine> ProjectSession<S, E> {
    pub fn new(store: S, config: ViewportConfig) -> Result<Self, SessionError> {
        let mut viewport = ViewportController::new(config)?;
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        viewport.set_click_callback(move |p| sink.borrow_mut().push(p));

        let mut session = Self {
            store,
            viewport,
            placing: false,
            selected: None,
            draft: ProjectDraft::default(),
            clicks,
        };
        session.sync_markers()?;
        Ok(session)
    }

    pub fn mount(&mut self, target: Option<&RenderTarget>) -> Result<(), SessionError> {
        self.viewport.mount(target)?;
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.viewport.unmount();
    }

    /// Advances the viewport one tick and applies the clicks it forwarded.
    pub fn update(&mut self, dt_ms: f64) -> Result<(), SessionError> {
        self.viewport.update(dt_ms);
        let clicks = std::mem::take(&mut *self.clicks.borrow_mut());
        for point in clicks {
            self.handle_map_click(point)?;
        }
        Ok(())
    }

    /// Ticks until no camera animation is running.
    ///
    /// An animation still running after `SETTLE_MAX_TICKS` is cut short and
    /// the camera lands on its target.
    pub fn settle(&mut self) -> Result<(), SessionError> {
        for _ in 0..SETTLE_MAX_TICKS {
            if !self.viewport.is_animating() {
                return Ok(());
            }
            self.update(SETTLE_STEP_MS)?;
        }
        if self.viewport.is_animating() {
            debug!(ticks = SETTLE_MAX_TICKS, "settle budget spent, jumping to target");
            self.viewport.finish_animation();
        }
        Ok(())
    }

    /// A map click picks the new project's location while placing and is
    /// ignored otherwise.
    pub fn handle_map_click(&mut self, point: GeoPoint) -> Result<(), SessionError> {
        if !self.placing {
            debug!(%point, "click ignored: not placing");
            return Ok(());
        }
        self.selected = Some(point);
        self.viewport.on_selection_changed(Some(point))?;
        Ok(())
    }

    pub fn begin_placement(&mut self) -> Result<(), SessionError> {
        self.placing = true;
        self.clear_selection()
    }

    pub fn cancel_placement(&mut self) -> Result<(), SessionError> {
        self.placing = false;
        self.clear_selection()
    }

    fn clear_selection(&mut self) -> Result<(), SessionError> {
        self.selected = None;
        self.viewport.on_selection_changed(None)?;
        Ok(())
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProjectDraft {
        &mut self.draft
    }

    pub fn is_form_valid(&self) -> bool {
        self.placing && self.draft.is_complete(self.selected)
    }

    pub fn submit(&mut self) -> Result<Project, SessionError> {
        self.submit_at(now_ms())
    }

    /// Creates a project from the draft at the selected location.
    ///
    /// On success placement ends, the draft resets and the map re-fits.
    /// On failure nothing changes.
    pub fn submit_at(&mut self, created_at_ms: u64) -> Result<Project, SessionError> {
        if !self.placing {
            return Err(SessionError::NotPlacing);
        }
        let id = Id::new(uuid::Uuid::new_v4().to_string());
        let project = self
            .draft
            .clone()
            .into_project(id, self.selected, created_at_ms)?;
        self.store.upsert(project.clone())?;
        info!(id = %project.id, name = %project.name, "project added");

        self.placing = false;
        self.draft = ProjectDraft::default();
        self.clear_selection()?;
        self.sync_markers()?;
        Ok(project)
    }

    pub fn delete(&mut self, id: &Id) -> Result<bool, SessionError> {
        let removed = self.store.delete(id)?;
        if removed {
            info!(%id, "project deleted");
            self.sync_markers()?;
        }
        Ok(removed)
    }

    pub fn increase_rating(&mut self, id: &Id) -> Result<u32, SessionError> {
        let rating = self.store.increase_rating(id)?;
        self.sync_markers()?;
        Ok(rating)
    }

    /// Centers the map on a project ("show on map").
    pub fn focus_project(&mut self, id: &Id) -> Result<FocusCommand, SessionError> {
        let project = self
            .store
            .get(id)?
            .ok_or_else(|| SessionError::UnknownProject(id.clone()))?;
        let config = self.viewport.config();
        let command = FocusCommand::new(project.coordinates, config.focus_zoom, config.focus_duration());
        self.viewport.focus_on(command)?;
        Ok(command)
    }

    pub fn list(&self, query: &ProjectQuery) -> Result<Vec<Project>, SessionError> {
        let projects = self.store.list()?;
        Ok(query.apply(&projects).into_iter().cloned().collect())
    }

    pub fn counts(&self) -> Result<StatusCounts, SessionError> {
        Ok(StatusCounts::of(&self.store.list()?))
    }

    pub fn is_placing(&self) -> bool {
        self.placing
    }

    pub fn selected(&self) -> Option<GeoPoint> {
        self.selected
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn viewport(&self) -> &ViewportController<E> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController<E> {
        &mut self.viewport
    }

    fn sync_markers(&mut self) -> Result<(), SessionError> {
        let markers = self.store.markers()?;
        let report = self.viewport.on_projects_changed(markers);
        if !report.is_clean() {
            warn!(rejected = report.rejected.len(), "some projects could not be drawn");
        }
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
