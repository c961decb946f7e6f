use foundation::ProjectedPoint;
use layers::{LayerSlot, RenderFeature};
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::error::EngineInitError;

/// Handle to the host surface the engine draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub id: String,
    pub width_px: f64,
    pub height_px: f64,
}

impl RenderTarget {
    pub fn new(id: impl Into<String>, width_px: f64, height_px: f64) -> Self {
        Self {
            id: id.into(),
            width_px,
            height_px,
        }
    }

    pub fn validate(&self) -> Result<(), EngineInitError> {
        if self.id.trim().is_empty() {
            return Err(EngineInitError::InvalidTarget("empty target id".into()));
        }
        let sized = |v: f64| v.is_finite() && v > 0.0;
        if !sized(self.width_px) || !sized(self.height_px) {
            return Err(EngineInitError::InvalidTarget(format!(
                "target {} has size {}x{}",
                self.id, self.width_px, self.height_px
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    View,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerKey(pub u64);

/// User input reported by the engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineEvent {
    Click(ProjectedPoint),
    /// The user panned or zoomed the map.
    ViewChanged(Camera),
}

/// The map-rendering engine as seen by the viewport.
///
/// Tiles, gestures and drawing live behind this trait. The viewport only
/// replaces whole layers, moves the camera and drains input events.
pub trait MapEngine {
    fn create(target: &RenderTarget, camera: &Camera) -> Result<Self, EngineInitError>
    where
        Self: Sized;

    fn listen(&mut self, kind: EventKind) -> Result<ListenerKey, EngineInitError>;
    fn unlisten(&mut self, key: ListenerKey);

    /// Replaces every feature of `slot`.
    fn replace_layer(&mut self, slot: LayerSlot, features: Vec<RenderFeature>);
    fn set_camera(&mut self, camera: &Camera);
    fn viewport_px(&self) -> [f64; 2];

    /// Events queued since the last drain, oldest first. Only events with a
    /// registered listener are queued.
    fn drain_events(&mut self) -> Vec<EngineEvent>;
    fn dispose(&mut self);
}

/// An engine bound to the viewport for one mount.
///
/// Holds the engine together with its listener registrations; dropping the
/// guard unlistens and disposes, so no exit path leaks a live engine.
pub struct MountedEngine<E: MapEngine> {
    engine: E,
    listeners: Vec<ListenerKey>,
    released: bool,
}

impl<E: MapEngine> MountedEngine<E> {
    /// Creates the engine and registers one listener per kind.
    ///
    /// If any registration fails, the listeners already added are removed and
    /// the engine is disposed before the error is returned.
    pub fn acquire(
        target: Option<&RenderTarget>,
        camera: &Camera,
        kinds: &[EventKind],
    ) -> Result<Self, EngineInitError> {
        let target = target.ok_or(EngineInitError::MissingTarget)?;
        target.validate()?;
        let engine = E::create(target, camera)?;
        let mut mounted = Self {
            engine,
            listeners: Vec::with_capacity(kinds.len()),
            released: false,
        };
        for kind in kinds {
            match mounted.engine.listen(*kind) {
                Ok(key) => mounted.listeners.push(key),
                Err(e) => {
                    mounted.release();
                    return Err(e);
                }
            }
        }
        debug!(target_id = %target.id, listeners = mounted.listeners.len(), "engine acquired");
        Ok(mounted)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn listeners(&self) -> &[ListenerKey] {
        &self.listeners
    }

    /// Unlistens and disposes. Runs at most once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for key in self.listeners.drain(..) {
            self.engine.unlisten(key);
        }
        self.engine.dispose();
    }
}

impl<E: MapEngine> Drop for MountedEngine<E> {
    fn drop(&mut self) {
        if !self.released {
            warn!("mounted engine dropped without unmount; releasing");
        }
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::{EventKind, MountedEngine, RenderTarget};
    use crate::camera::Camera;
    use crate::error::EngineInitError;
    use crate::headless::HeadlessEngine;

    #[test]
    fn target_validation() {
        assert!(RenderTarget::new("map", 800.0, 600.0).validate().is_ok());
        assert!(matches!(
            RenderTarget::new("  ", 800.0, 600.0).validate(),
            Err(EngineInitError::InvalidTarget(_))
        ));
        assert!(RenderTarget::new("map", 0.0, 600.0).validate().is_err());
        assert!(RenderTarget::new("map", 800.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn acquire_registers_and_release_drops_every_listener() {
        let target = RenderTarget::new("map", 800.0, 600.0);
        let camera = Camera::new(Default::default(), 10.0);
        let mut mounted = MountedEngine::<HeadlessEngine>::acquire(
            Some(&target),
            &camera,
            &[EventKind::Click, EventKind::View],
        )
        .unwrap();
        assert_eq!(mounted.listeners().len(), 2);
        assert_eq!(mounted.engine().listener_count(EventKind::Click), 1);

        mounted.release();
        assert!(mounted.listeners().is_empty());
        assert!(mounted.engine().is_disposed());
        assert_eq!(mounted.engine().listener_count(EventKind::View), 0);
    }
}
