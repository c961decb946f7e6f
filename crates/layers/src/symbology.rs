use serde::Serialize;

/// `#29303D`
pub const CLUSTER_FILL: [f32; 4] = [41.0 / 255.0, 48.0 / 255.0, 61.0 / 255.0, 1.0];
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// `#00eeffff`
pub const SELECTION_TINT: [f32; 4] = [0.0, 238.0 / 255.0, 1.0, 1.0];

/// Cluster glyph radius grows with membership, capped at ten extra pixels.
pub const CLUSTER_BASE_RADIUS_PX: f32 = 15.0;
pub const CLUSTER_MAX_EXTRA_RADIUS_PX: usize = 10;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    /// Icon anchor as a fraction of the icon size; `[0.5, 1.0]` pins the tip.
    pub anchor: [f32; 2],
    pub scale: f32,
    pub tint: Option<[f32; 4]>,
}

impl MarkerStyle {
    pub const fn new(tint: Option<[f32; 4]>) -> Self {
        Self {
            anchor: [0.5, 1.0],
            scale: 1.0,
            tint,
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStyle {
    pub radius_px: f32,
    pub fill: [f32; 4],
    pub stroke: [f32; 4],
    pub stroke_width_px: f32,
    pub text: String,
    pub text_color: [f32; 4],
    pub font: &'static str,
}

impl ClusterStyle {
    pub fn for_size(size: usize) -> Self {
        let extra = size.min(CLUSTER_MAX_EXTRA_RADIUS_PX) as f32;
        Self {
            radius_px: CLUSTER_BASE_RADIUS_PX + extra,
            fill: CLUSTER_FILL,
            stroke: WHITE,
            stroke_width_px: 2.0,
            text: size.to_string(),
            text_color: WHITE,
            font: "bold 12px sans-serif",
        }
    }
}

pub fn marker_style() -> MarkerStyle {
    MarkerStyle::new(None)
}

pub fn selection_style() -> MarkerStyle {
    MarkerStyle::new(Some(SELECTION_TINT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_radius_is_capped() {
        assert_eq!(ClusterStyle::for_size(2).radius_px, 17.0);
        assert_eq!(ClusterStyle::for_size(10).radius_px, 25.0);
        assert_eq!(ClusterStyle::for_size(250).radius_px, 25.0);
        assert_eq!(ClusterStyle::for_size(250).text, "250");
    }

    #[test]
    fn selection_is_a_tinted_marker() {
        let m = marker_style();
        let s = selection_style();
        assert_eq!(m.anchor, s.anchor);
        assert_eq!(m.tint, None);
        assert_eq!(s.tint, Some(SELECTION_TINT));
    }
}
