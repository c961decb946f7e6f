use std::collections::BTreeMap;

use foundation::ProjectedPoint;
use layers::{LayerSlot, RenderFeature};
use tracing::debug;

use crate::camera::Camera;
use crate::engine::{EngineEvent, EventKind, ListenerKey, MapEngine, RenderTarget};
use crate::error::EngineInitError;

/// In-process engine that draws nothing and records everything.
///
/// Used by tests and by the CLI `view` command. Input is injected with the
/// `simulate_*` methods and only reaches the viewport when a listener for
/// that kind is registered, like a real engine.
#[derive(Debug)]
pub struct HeadlessEngine {
    target: RenderTarget,
    layers: BTreeMap<LayerSlot, Vec<RenderFeature>>,
    layer_writes: usize,
    camera: Camera,
    camera_history: Vec<Camera>,
    listeners: BTreeMap<ListenerKey, EventKind>,
    next_key: u64,
    queue: Vec<EngineEvent>,
    disposed: bool,
}

impl HeadlessEngine {
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn layer(&self, slot: LayerSlot) -> &[RenderFeature] {
        self.layers.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of `replace_layer` calls received.
    pub fn layer_writes(&self) -> usize {
        self.layer_writes
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Every camera pushed by the viewport, oldest first.
    pub fn camera_history(&self) -> &[Camera] {
        &self.camera_history
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn has_listener(&self, kind: EventKind) -> bool {
        !self.disposed && self.listeners.values().any(|k| *k == kind)
    }

    pub fn simulate_click(&mut self, at: ProjectedPoint) {
        if self.has_listener(EventKind::Click) {
            self.queue.push(EngineEvent::Click(at));
        }
    }

    /// Click at a screen pixel (origin top-left) under the current camera.
    pub fn simulate_click_px(&mut self, x: f64, y: f64) {
        let at = self.camera.screen_to_projected([x, y], self.viewport_px());
        self.simulate_click(at);
    }

    /// A user pan/zoom gesture that lands on `camera`.
    pub fn simulate_view_change(&mut self, camera: Camera) {
        if self.disposed {
            return;
        }
        self.camera = camera;
        if self.has_listener(EventKind::View) {
            self.queue.push(EngineEvent::ViewChanged(camera));
        }
    }
}

impl MapEngine for HeadlessEngine {
    fn create(target: &RenderTarget, camera: &Camera) -> Result<Self, EngineInitError> {
        target.validate()?;
        debug!(target_id = %target.id, "headless engine created");
        Ok(Self {
            target: target.clone(),
            layers: BTreeMap::new(),
            layer_writes: 0,
            camera: *camera,
            camera_history: Vec::new(),
            listeners: BTreeMap::new(),
            next_key: 1,
            queue: Vec::new(),
            disposed: false,
        })
    }

    fn listen(&mut self, kind: EventKind) -> Result<ListenerKey, EngineInitError> {
        if self.disposed {
            return Err(EngineInitError::Listener("engine disposed".into()));
        }
        let key = ListenerKey(self.next_key);
        self.next_key += 1;
        self.listeners.insert(key, kind);
        Ok(key)
    }

    fn unlisten(&mut self, key: ListenerKey) {
        self.listeners.remove(&key);
    }

    fn replace_layer(&mut self, slot: LayerSlot, features: Vec<RenderFeature>) {
        if self.disposed {
            return;
        }
        self.layer_writes += 1;
        self.layers.insert(slot, features);
    }

    fn set_camera(&mut self, camera: &Camera) {
        if self.disposed {
            return;
        }
        self.camera = *camera;
        self.camera_history.push(*camera);
    }

    fn viewport_px(&self) -> [f64; 2] {
        [self.target.width_px, self.target.height_px]
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.queue)
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.listeners.clear();
        self.layers.clear();
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use foundation::{GeoPoint, Vec2};

    use super::HeadlessEngine;
    use crate::camera::Camera;
    use crate::engine::{EngineEvent, EventKind, MapEngine, RenderTarget};

    fn engine() -> HeadlessEngine {
        let cam = Camera::looking_at(GeoPoint::new(56.2, 58.0), 12.0).unwrap();
        HeadlessEngine::create(&RenderTarget::new("map", 800.0, 600.0), &cam).unwrap()
    }

    #[test]
    fn clicks_need_a_listener() {
        let mut e = engine();
        e.simulate_click(Vec2::new(1.0, 2.0));
        assert!(e.drain_events().is_empty());

        let key = e.listen(EventKind::Click).unwrap();
        e.simulate_click_px(400.0, 300.0);
        let events = e.drain_events();
        assert_eq!(events, vec![EngineEvent::Click(e.camera().center)]);

        e.unlisten(key);
        e.simulate_click(Vec2::new(1.0, 2.0));
        assert!(e.drain_events().is_empty());
    }

    #[test]
    fn dispose_drops_listeners_and_ignores_writes() {
        let mut e = engine();
        e.listen(EventKind::Click).unwrap();
        e.listen(EventKind::View).unwrap();
        assert_eq!(e.listener_count(EventKind::Click), 1);
        e.dispose();
        assert!(e.is_disposed());
        assert_eq!(e.listener_count(EventKind::Click), 0);
        e.set_camera(&Camera::new(Vec2::ZERO, 1.0));
        assert!(e.camera_history().is_empty());
        assert!(e.listen(EventKind::Click).is_err());
    }
}
