use foundation::{Extent, GeoPoint, to_geo, to_projected, zoom_for_resolution};
use serde::Serialize;

use crate::camera::Camera;
use crate::config::ViewportConfig;

/// Camera framing that covers a set of markers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FitCommand {
    pub center: GeoPoint,
    /// Center-to-corner distance of the covered extent (projected meters).
    pub bounding_radius_m: f64,
    pub zoom: f64,
}

impl FitCommand {
    pub fn camera(&self) -> Option<Camera> {
        Camera::looking_at(self.center, self.zoom).ok()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ExtentFitter {
    pub padding_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ExtentFitter {
    pub fn new(padding_px: f64, min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            padding_px: padding_px.max(0.0),
            min_zoom,
            max_zoom: max_zoom.max(min_zoom),
        }
    }

    /// The fit never zooms past the camera's own range.
    pub fn from_config(config: &ViewportConfig) -> Self {
        Self::new(
            config.fit_padding_px,
            config.min_zoom,
            config.fit_max_zoom.min(config.max_zoom),
        )
    }

    /// Frames `points` inside a `viewport_px` sized view.
    ///
    /// Returns `None` for an empty input (nothing to frame, not an error).
    /// Points that cannot be projected are skipped.
    pub fn fit(&self, points: &[GeoPoint], viewport_px: [f64; 2]) -> Option<FitCommand> {
        let extent = Extent::from_points(points.iter().filter_map(|p| to_projected(*p).ok()));
        let center = to_geo(extent.center()?).ok()?;

        // Padding can never eat the whole viewport.
        let avail_w = (viewport_px[0] - 2.0 * self.padding_px).max(1.0);
        let avail_h = (viewport_px[1] - 2.0 * self.padding_px).max(1.0);
        let resolution = (extent.width() / avail_w).max(extent.height() / avail_h);

        let zoom = if resolution > 0.0 {
            zoom_for_resolution(resolution).clamp(self.min_zoom, self.max_zoom)
        } else {
            self.max_zoom
        };

        Some(FitCommand {
            center,
            bounding_radius_m: extent.half_diagonal(),
            zoom,
        })
    }
}
