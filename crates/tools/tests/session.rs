use catalog::{
    CatalogError, InMemoryProjectStore, JsonFileProjectStore, Project, ProjectQuery,
    ProjectStatus, ProjectStore,
};
use foundation::{GeoPoint, Id, to_projected};
use layers::LayerSlot;
use pretty_assertions::assert_eq;
use tools::{ProjectSession, SessionError};
use viewport::{Camera, HeadlessEngine, RenderTarget, ViewportConfig, ViewportEvent};

type Session<S> = ProjectSession<S, HeadlessEngine>;

fn project(id: &str, status: ProjectStatus, at: GeoPoint, created_at_ms: u64) -> Project {
    Project {
        id: Id::from(id),
        name: format!("Project {id}"),
        author: "Anna".into(),
        image_url: String::new(),
        coordinates: at,
        created_at_ms,
        status,
        rating: Some(0),
    }
}

fn seeded() -> InMemoryProjectStore {
    InMemoryProjectStore::with_projects(vec![
        project("v", ProjectStatus::Verified, GeoPoint::new(56.20, 58.00), 1),
        project("p", ProjectStatus::Pending, GeoPoint::new(56.30, 58.05), 2),
    ])
}

fn mounted<S: ProjectStore>(store: S) -> Session<S> {
    let mut s = ProjectSession::new(store, ViewportConfig::default()).unwrap();
    s.mount(Some(&RenderTarget::new("map", 800.0, 600.0))).unwrap();
    s.settle().unwrap();
    s
}

fn click<S: ProjectStore>(s: &mut Session<S>, at: GeoPoint) {
    let engine = s.viewport_mut().engine_mut().unwrap();
    engine.simulate_click(to_projected(at).unwrap());
    s.update(16.0).unwrap();
}

fn selection_features<S: ProjectStore>(s: &Session<S>) -> usize {
    s.viewport().engine().unwrap().layer(LayerSlot::Selection).len()
}

#[test]
fn stored_projects_are_drawn_on_start() {
    let s = mounted(seeded());
    assert_eq!(s.viewport().store().markers().count(), 2);
    assert!(!s.viewport().engine().unwrap().layer(LayerSlot::Clusters).is_empty());
}

#[test]
fn placing_a_project_end_to_end() {
    let mut s = mounted(InMemoryProjectStore::new());
    s.begin_placement().unwrap();
    let spot = GeoPoint::new(56.25, 58.05);
    click(&mut s, spot);

    let selected = s.selected().unwrap();
    assert!(selected.approx_eq(&spot, 1e-6));
    assert_eq!(selection_features(&s), 1);
    assert!(!s.is_form_valid());

    s.draft_mut().name = "Fountain".into();
    s.draft_mut().author = "Ivan".into();
    assert!(s.is_form_valid());

    let fits_before = s
        .viewport()
        .count_events(|e| matches!(e, ViewportEvent::FitIssued(_)));
    let created = s.submit_at(1_700_000_000_000).unwrap();
    assert_eq!(created.name, "Fountain");
    assert_eq!(created.created_at_ms, 1_700_000_000_000);
    assert!(!created.id.as_str().is_empty());

    assert!(!s.is_placing());
    assert_eq!(s.selected(), None);
    assert_eq!(s.draft().name, "");
    assert_eq!(selection_features(&s), 0);
    assert_eq!(s.store().list().unwrap().len(), 1);
    assert_eq!(s.viewport().store().markers().count(), 1);
    assert_eq!(
        s.viewport()
            .count_events(|e| matches!(e, ViewportEvent::FitIssued(_))),
        fits_before + 1
    );
}

#[test]
fn clicks_outside_placement_are_ignored() {
    let mut s = mounted(seeded());
    click(&mut s, GeoPoint::new(56.25, 58.05));
    assert_eq!(s.selected(), None);
    assert_eq!(selection_features(&s), 0);
}

#[test]
fn begin_and_cancel_clear_the_selection() {
    let mut s = mounted(seeded());
    s.begin_placement().unwrap();
    click(&mut s, GeoPoint::new(56.25, 58.05));
    assert_eq!(selection_features(&s), 1);

    s.cancel_placement().unwrap();
    assert_eq!(selection_features(&s), 0);

    s.begin_placement().unwrap();
    assert_eq!(s.selected(), None);
    assert_eq!(selection_features(&s), 0);
}

#[test]
fn incomplete_draft_is_rejected_without_side_effects() {
    let mut s = mounted(InMemoryProjectStore::new());
    assert!(matches!(s.submit_at(1), Err(SessionError::NotPlacing)));

    s.begin_placement().unwrap();
    s.draft_mut().name = "No location".into();
    s.draft_mut().author = "Ivan".into();
    assert!(matches!(
        s.submit_at(1),
        Err(SessionError::Catalog(CatalogError::MissingField("location")))
    ));
    assert!(s.is_placing());
    assert_eq!(s.draft().name, "No location");
    assert!(s.store().list().unwrap().is_empty());
}

#[test]
fn focus_moves_the_camera_to_the_project() {
    let mut s = mounted(seeded());
    let command = s.focus_project(&Id::from("p")).unwrap();
    assert_eq!(command.zoom, 15.0);
    s.settle().unwrap();

    let expected = Camera::looking_at(GeoPoint::new(56.30, 58.05), 15.0).unwrap();
    assert_eq!(s.viewport().camera(), expected);

    assert!(matches!(
        s.focus_project(&Id::from("missing")),
        Err(SessionError::UnknownProject(_))
    ));
}

#[test]
fn settle_lands_long_animations_on_their_target() {
    let config = ViewportConfig {
        focus_duration_ms: 300_000,
        ..ViewportConfig::default()
    };
    let mut s: Session<_> = ProjectSession::new(seeded(), config).unwrap();
    s.mount(Some(&RenderTarget::new("map", 800.0, 600.0))).unwrap();
    s.settle().unwrap();

    s.focus_project(&Id::from("v")).unwrap();
    s.settle().unwrap();

    let expected = Camera::looking_at(GeoPoint::new(56.20, 58.00), 15.0).unwrap();
    assert!(!s.viewport().is_animating());
    assert_eq!(s.viewport().camera(), expected);
    assert_eq!(s.viewport().engine().unwrap().camera(), expected);
}

#[test]
fn delete_and_rate_resync_markers() {
    let mut s = mounted(seeded());
    assert_eq!(s.increase_rating(&Id::from("v")).unwrap(), 1);
    assert!(matches!(
        s.increase_rating(&Id::from("p")),
        Err(SessionError::Catalog(CatalogError::NotRateable(_)))
    ));

    assert!(s.delete(&Id::from("p")).unwrap());
    assert!(!s.delete(&Id::from("p")).unwrap());
    let ids: Vec<String> = s
        .viewport()
        .store()
        .markers()
        .map(|m| m.id.to_string())
        .collect();
    assert_eq!(ids, vec!["v".to_string()]);
}

#[test]
fn list_applies_filters_and_order() {
    let s = mounted(seeded());
    let all: Vec<String> = s
        .list(&ProjectQuery::all())
        .unwrap()
        .into_iter()
        .map(|p| p.id.to_string())
        .collect();
    assert_eq!(all, vec!["p".to_string(), "v".to_string()]);

    let verified = s
        .list(&ProjectQuery::all().with_status(ProjectStatus::Verified))
        .unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(s.counts().unwrap().pending, 1);
}

#[test]
fn projects_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved_projects.json");
    {
        let store = JsonFileProjectStore::open(&path).unwrap();
        let mut s: Session<_> = ProjectSession::new(store, ViewportConfig::default()).unwrap();
        s.begin_placement().unwrap();
        s.handle_map_click(GeoPoint::new(37.62, 55.75)).unwrap();
        s.draft_mut().name = "Pavilion".into();
        s.draft_mut().author = "Olga".into();
        s.submit_at(5).unwrap();
    }

    let store = JsonFileProjectStore::open(&path).unwrap();
    let s: Session<_> = ProjectSession::new(store, ViewportConfig::default()).unwrap();
    let list = s.list(&ProjectQuery::all()).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Pavilion");
    assert_eq!(s.viewport().store().markers().count(), 1);
}
