use std::time::Duration;

use foundation::GeoPoint;
use serde::{Deserialize, Serialize};

/// Viewport configuration. All fields have documented defaults that are
/// exercised by tests below.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    // ── Initial view ─────────────────────────────────────────
    /// Camera center before the first fit.
    pub initial_center: GeoPoint,
    pub initial_zoom: f64,
    /// Zoom range the camera is allowed to reach.
    pub min_zoom: f64,
    pub max_zoom: f64,

    // ── Clustering ───────────────────────────────────────────
    /// Markers within this many screen pixels merge into one glyph.
    pub cluster_distance_px: f64,

    // ── Extent fit ───────────────────────────────────────────
    /// Symmetric padding around the fitted markers (pixels).
    pub fit_padding_px: f64,
    /// Closest zoom a fit may reach, so one marker does not zoom in unboundedly.
    pub fit_max_zoom: f64,
    pub fit_duration_ms: u64,

    // ── Focus ("show on map") ────────────────────────────────
    pub focus_zoom: f64,
    pub focus_duration_ms: u64,
}

impl ViewportConfig {
    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }

    pub fn focus_duration(&self) -> Duration {
        Duration::from_millis(self.focus_duration_ms)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom.max(self.min_zoom))
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            initial_center: GeoPoint::new(56.227431, 58.008653),
            initial_zoom: 12.0,
            min_zoom: 0.0,
            max_zoom: 28.0,

            cluster_distance_px: 40.0,

            fit_padding_px: 50.0,
            fit_max_zoom: 15.0,
            fit_duration_ms: 250,

            focus_zoom: 15.0,
            focus_duration_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewportConfig;
    use foundation::GeoPoint;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_stable() {
        let c = ViewportConfig::default();
        assert_eq!(c.initial_center, GeoPoint::new(56.227431, 58.008653));
        assert_eq!(c.initial_zoom, 12.0);
        assert_eq!(c.cluster_distance_px, 40.0);
        assert_eq!(c.fit_padding_px, 50.0);
        assert_eq!(c.fit_max_zoom, 15.0);
        assert_eq!(c.focus_zoom, 15.0);
        assert_eq!(c.focus_duration().as_millis(), 500);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let c: ViewportConfig =
            serde_json::from_str(r#"{ "cluster_distance_px": 60, "fit_max_zoom": 13 }"#).unwrap();
        assert_eq!(c.cluster_distance_px, 60.0);
        assert_eq!(c.fit_max_zoom, 13.0);
        assert_eq!(c.fit_padding_px, 50.0);
        assert_eq!(c.initial_zoom, 12.0);
    }

    #[test]
    fn clamp_zoom_respects_range() {
        let c = ViewportConfig::default();
        assert_eq!(c.clamp_zoom(-3.0), 0.0);
        assert_eq!(c.clamp_zoom(40.0), 28.0);
        assert_eq!(c.clamp_zoom(7.5), 7.5);
    }
}
