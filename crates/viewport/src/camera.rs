use std::time::Duration;

use foundation::{GeoError, GeoPoint, ProjectedPoint, Vec2, resolution_for_zoom, to_geo, to_projected};
use serde::Serialize;

/// 2D map camera: projected center plus fractional zoom level.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub center: ProjectedPoint,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: ProjectedPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }

    pub fn looking_at(point: GeoPoint, zoom: f64) -> Result<Self, GeoError> {
        Ok(Self::new(to_projected(point)?, zoom))
    }

    /// Meters per pixel.
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    pub fn center_geo(&self) -> Result<GeoPoint, GeoError> {
        to_geo(self.center)
    }

    /// Screen pixel (origin top-left, y down) to projected plane.
    pub fn screen_to_projected(&self, px: [f64; 2], viewport_px: [f64; 2]) -> ProjectedPoint {
        let res = self.resolution();
        Vec2::new(
            self.center.x + (px[0] - 0.5 * viewport_px[0]) * res,
            self.center.y + (0.5 * viewport_px[1] - px[1]) * res,
        )
    }

    pub fn projected_to_screen(&self, p: ProjectedPoint, viewport_px: [f64; 2]) -> [f64; 2] {
        let res = self.resolution();
        [
            0.5 * viewport_px[0] + (p.x - self.center.x) / res,
            0.5 * viewport_px[1] - (p.y - self.center.y) / res,
        ]
    }

    pub fn interpolate(&self, to: &Camera, t: f64) -> Camera {
        Camera {
            center: self.center.lerp(to.center, t),
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }

    pub fn approx_eq(&self, other: &Camera, eps_m: f64, eps_zoom: f64) -> bool {
        self.center.distance(other.center) <= eps_m && (self.zoom - other.zoom).abs() <= eps_zoom
    }
}

/// Imperative "look here" request from outside the viewport.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct FocusCommand {
    pub point: GeoPoint,
    pub zoom: f64,
    pub duration: Duration,
}

impl FocusCommand {
    pub fn new(point: GeoPoint, zoom: f64, duration: Duration) -> Self {
        Self {
            point,
            zoom,
            duration,
        }
    }
}

/// Smoothstep easing: slow start, slow finish.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A single in-flight camera transition.
///
/// The controller holds at most one; starting another replaces it, and the
/// new one begins from wherever the camera currently is.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraAnimation {
    from: Camera,
    to: Camera,
    duration_ms: f64,
    elapsed_ms: f64,
}

impl CameraAnimation {
    pub fn new(from: Camera, to: Camera, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration_ms: duration.as_secs_f64() * 1_000.0,
            elapsed_ms: 0.0,
        }
    }

    pub fn target(&self) -> Camera {
        self.to
    }

    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Camera at the current progress.
    pub fn sample(&self) -> Camera {
        if self.is_finished() {
            return self.to;
        }
        self.from.interpolate(&self.to, ease_in_out(self.progress()))
    }

    pub fn advance(&mut self, dt_ms: f64) -> Camera {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.sample()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use foundation::{GeoPoint, Vec2};

    use super::{Camera, CameraAnimation, ease_in_out};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(ease_in_out(7.0), 1.0);
    }

    #[test]
    fn screen_round_trip() {
        let cam = Camera::looking_at(GeoPoint::new(56.2, 58.0), 12.0).unwrap();
        let vp = [800.0, 600.0];
        let p = cam.screen_to_projected([123.0, 456.0], vp);
        let s = cam.projected_to_screen(p, vp);
        assert_close(s[0], 123.0, 1e-6);
        assert_close(s[1], 456.0, 1e-6);
        assert_eq!(cam.screen_to_projected([400.0, 300.0], vp), cam.center);
    }

    #[test]
    fn animation_reaches_target_exactly() {
        let from = Camera::new(Vec2::new(0.0, 0.0), 2.0);
        let to = Camera::new(Vec2::new(1_000.0, -500.0), 10.0);
        let mut anim = CameraAnimation::new(from, to, Duration::from_millis(100));
        let mid = anim.advance(50.0);
        assert_close(mid.zoom, 6.0, 1e-9);
        assert!(!anim.is_finished());
        let end = anim.advance(80.0);
        assert!(anim.is_finished());
        assert_eq!(end, to);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let to = Camera::new(Vec2::new(5.0, 5.0), 3.0);
        let anim = CameraAnimation::new(Camera::new(Vec2::ZERO, 0.0), to, Duration::ZERO);
        assert!(anim.is_finished());
        assert_eq!(anim.sample(), to);
    }
}
