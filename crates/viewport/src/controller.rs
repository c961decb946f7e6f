use foundation::{GeoPoint, Id, ProjectedPoint, to_geo};
use layers::{Layer, Marker, MarkerLayerStore, RebuildReport, SpatialClusterer};
use runtime::{Event, EventBus, Frame};
use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraAnimation, FocusCommand};
use crate::config::ViewportConfig;
use crate::engine::{EngineEvent, EventKind, MapEngine, MountedEngine, RenderTarget};
use crate::error::ViewportError;
use crate::fit::{ExtentFitter, FitCommand};

pub type ClickCallback = Box<dyn FnMut(GeoPoint)>;

/// Observable record of what the controller did, tagged by frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    Mounted,
    Unmounted,
    MarkersReplaced { accepted: usize, rejected: usize },
    MarkerRejected { id: Id },
    SelectionChanged { present: bool },
    Reclustered { clusters: usize },
    FitIssued(FitCommand),
    FocusIssued(FocusCommand),
    /// A running animation was replaced by a newer command or a user gesture.
    AnimationSuperseded,
    AnimationFinished,
    ClickForwarded(GeoPoint),
}

/// Keeps the marker, cluster and selection layers in sync with application
/// state and drives the camera of one exclusively owned engine.
///
/// Lifecycle is `Unmounted -> Mounted -> Unmounted`. Layer state and the
/// camera survive unmounting; they are pushed to the next engine on mount.
pub struct ViewportController<E: MapEngine> {
    config: ViewportConfig,
    mounted: Option<MountedEngine<E>>,
    store: MarkerLayerStore,
    fitter: ExtentFitter,
    camera: Camera,
    animation: Option<CameraAnimation>,
    frame: Frame,
    events: EventBus<ViewportEvent>,
    on_click: Option<ClickCallback>,
}

impl<E: MapEngine> ViewportController<E> {
    pub fn new(config: ViewportConfig) -> Result<Self, ViewportError> {
        let camera = Camera::looking_at(config.initial_center, config.clamp_zoom(config.initial_zoom))?;
        let store = MarkerLayerStore::new(
            SpatialClusterer::new(config.cluster_distance_px),
            camera.resolution(),
        );
        Ok(Self {
            config,
            mounted: None,
            store,
            fitter: ExtentFitter::from_config(&config),
            camera,
            animation: None,
            frame: Frame::first(),
            events: EventBus::new(),
            on_click: None,
        })
    }

    /// Registers the click-out callback, replacing any previous one.
    pub fn set_click_callback(&mut self, callback: impl FnMut(GeoPoint) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Creates the engine on `target`. A no-op when already mounted.
    ///
    /// On failure nothing is kept: the controller stays unmounted and any
    /// partially initialised engine has been disposed.
    pub fn mount(&mut self, target: Option<&RenderTarget>) -> Result<(), ViewportError> {
        if self.mounted.is_some() {
            debug!("mount ignored: already mounted");
            return Ok(());
        }
        let engine = MountedEngine::acquire(target, &self.camera, &[EventKind::Click, EventKind::View])?;
        self.mounted = Some(engine);
        info!(markers = self.store.markers().count(), "viewport mounted");
        self.emit(ViewportEvent::Mounted);

        self.push_camera();
        self.render_all();
        if !self.store.is_empty() {
            self.fit();
        }
        Ok(())
    }

    /// Detaches listeners and disposes the engine. Idempotent.
    pub fn unmount(&mut self) {
        let Some(mut engine) = self.mounted.take() else {
            return;
        };
        engine.release();
        self.animation = None;
        info!("viewport unmounted");
        self.emit(ViewportEvent::Unmounted);
    }

    /// Replaces the marker set, re-clusters and re-fits the camera.
    pub fn on_projects_changed(&mut self, markers: Vec<Marker>) -> RebuildReport {
        let report = self.store.replace_markers(markers);
        self.emit(ViewportEvent::MarkersReplaced {
            accepted: report.accepted,
            rejected: report.rejected.len(),
        });
        for r in &report.rejected {
            self.emit(ViewportEvent::MarkerRejected { id: r.id.clone() });
        }
        self.emit(ViewportEvent::Reclustered {
            clusters: self.store.clusters().len(),
        });
        self.render_clusters();
        self.fit();
        report
    }

    /// Replaces the selection layer. Never moves the camera.
    ///
    /// An invalid point is reported and leaves no selection marker behind.
    pub fn on_selection_changed(&mut self, point: Option<GeoPoint>) -> Result<(), ViewportError> {
        let result = self.store.set_selection(point);
        if let Err(e) = &result {
            warn!(error = %e, "selection rejected");
        }
        self.emit(ViewportEvent::SelectionChanged {
            present: self.store.selection().is_some(),
        });
        self.render_selection();
        result.map_err(Into::into)
    }

    /// Converts an engine click to a geographic point and forwards it to the
    /// click callback. The selection layer is left untouched.
    pub fn handle_engine_click(&mut self, at: ProjectedPoint) -> Result<GeoPoint, ViewportError> {
        let point = to_geo(at)?;
        debug!(%point, "map click");
        self.emit(ViewportEvent::ClickForwarded(point));
        if let Some(callback) = self.on_click.as_mut() {
            callback(point);
        }
        Ok(point)
    }

    /// Animates the camera to `command`, replacing any animation in flight.
    pub fn focus_on(&mut self, command: FocusCommand) -> Result<(), ViewportError> {
        if !command.zoom.is_finite() {
            return Err(ViewportError::InvalidZoom(command.zoom));
        }
        let target = Camera::looking_at(command.point, self.config.clamp_zoom(command.zoom))?;
        debug!(point = %command.point, zoom = target.zoom, "focus");
        self.emit(ViewportEvent::FocusIssued(command));
        self.start_animation(target, command.duration);
        Ok(())
    }

    /// Advances one UI tick: dispatches pending engine input, then steps the
    /// running animation.
    pub fn update(&mut self, dt_ms: f64) {
        self.frame = self.frame.next(dt_ms);
        self.pump_events();

        let dt = self.frame.dt_ms;
        let Some((camera, finished)) = self.animation.as_mut().map(|anim| {
            let camera = anim.advance(dt);
            (camera, anim.is_finished())
        }) else {
            return;
        };
        self.set_camera(camera, true);
        if finished {
            self.animation = None;
            self.emit(ViewportEvent::AnimationFinished);
        }
    }

    /// Jumps to the running animation's target. A no-op when idle.
    pub fn finish_animation(&mut self) {
        if self.animation.is_none() {
            return;
        }
        let target = self.camera_target();
        self.animation = None;
        self.set_camera(target, true);
        self.emit(ViewportEvent::AnimationFinished);
    }

    /// Changes the clustering threshold and re-clusters the current markers.
    pub fn set_cluster_distance(&mut self, distance_px: f64) {
        self.config.cluster_distance_px = distance_px;
        self.store.set_cluster_distance(distance_px);
        self.emit(ViewportEvent::Reclustered {
            clusters: self.store.clusters().len(),
        });
        self.render_clusters();
    }

    /// Dispatches input queued by the engine since the last call.
    pub fn pump_events(&mut self) {
        let events = match self.mounted.as_mut() {
            Some(mounted) => mounted.engine_mut().drain_events(),
            None => return,
        };
        for event in events {
            match event {
                EngineEvent::Click(at) => {
                    if let Err(e) = self.handle_engine_click(at) {
                        warn!(error = %e, "ignoring click outside the world");
                    }
                }
                EngineEvent::ViewChanged(camera) => {
                    if self.animation.take().is_some() {
                        self.emit(ViewportEvent::AnimationSuperseded);
                    }
                    self.set_camera(camera, false);
                }
            }
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Where the camera will rest once the current animation completes.
    pub fn camera_target(&self) -> Camera {
        self.animation.map(|a| a.target()).unwrap_or(self.camera)
    }

    pub fn store(&self) -> &MarkerLayerStore {
        &self.store
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn events(&self) -> &[Event<ViewportEvent>] {
        self.events.events()
    }

    pub fn count_events(&self, pred: impl FnMut(&ViewportEvent) -> bool) -> usize {
        self.events.count(pred)
    }

    pub fn drain_events(&mut self) -> Vec<Event<ViewportEvent>> {
        self.events.drain()
    }

    pub fn engine(&self) -> Option<&E> {
        self.mounted.as_ref().map(|m| m.engine())
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.mounted.as_mut().map(|m| m.engine_mut())
    }

    fn emit(&mut self, event: ViewportEvent) {
        self.events.emit(self.frame, event);
    }

    fn fit(&mut self) {
        let Some(mounted) = self.mounted.as_ref() else {
            debug!("fit skipped: not mounted");
            return;
        };
        let viewport_px = mounted.engine().viewport_px();
        let Some(command) = self.fitter.fit(&self.store.positions(), viewport_px) else {
            debug!("fit skipped: no markers");
            return;
        };
        let Some(target) = command.camera() else {
            return;
        };
        debug!(center = %command.center, zoom = command.zoom, "fit");
        self.emit(ViewportEvent::FitIssued(command));
        self.start_animation(target, self.config.fit_duration());
    }

    fn start_animation(&mut self, target: Camera, duration: std::time::Duration) {
        if self.animation.take().is_some() {
            self.emit(ViewportEvent::AnimationSuperseded);
        }
        let animation = CameraAnimation::new(self.camera, target, duration);
        if animation.is_finished() {
            self.set_camera(target, true);
            self.emit(ViewportEvent::AnimationFinished);
        } else {
            self.animation = Some(animation);
        }
    }

    /// Moves the camera and re-clusters when the zoom changed the resolution.
    fn set_camera(&mut self, camera: Camera, push: bool) {
        self.camera = camera;
        if push {
            self.push_camera();
        }
        if self.store.set_resolution(camera.resolution()) {
            self.emit(ViewportEvent::Reclustered {
                clusters: self.store.clusters().len(),
            });
            self.render_clusters();
        }
    }

    fn push_camera(&mut self) {
        let camera = self.camera;
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.engine_mut().set_camera(&camera);
        }
    }

    fn render_all(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        for layer in self.store.render_layers() {
            mounted.engine_mut().replace_layer(layer.slot, layer.features);
        }
    }

    fn render_clusters(&mut self) {
        if let Some(mounted) = self.mounted.as_mut() {
            let layer = self.store.cluster_layer().render();
            mounted.engine_mut().replace_layer(layer.slot, layer.features);
        }
    }

    fn render_selection(&mut self) {
        if let Some(mounted) = self.mounted.as_mut() {
            let layer = self.store.selection_layer().render();
            mounted.engine_mut().replace_layer(layer.slot, layer.features);
        }
    }
}

impl<E: MapEngine> Drop for ViewportController<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
