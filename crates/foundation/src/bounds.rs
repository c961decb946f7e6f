use crate::math::Vec2;

/// Axis-aligned extent on the projected plane.
///
/// An empty extent has `min > max`; extending it with the first point
/// collapses it to that point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Extent { min, max }
    }

    pub fn empty() -> Self {
        Extent {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Self {
        let mut e = Self::empty();
        for p in points {
            e.extend(p);
        }
        e
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    pub fn extend(&mut self, p: Vec2) {
        self.min[0] = self.min[0].min(p.x);
        self.min[1] = self.min[1].min(p.y);
        self.max[0] = self.max[0].max(p.x);
        self.max[1] = self.max[1].max(p.y);
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max[0] - self.min[0]
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max[1] - self.min[1]
        }
    }

    pub fn center(&self) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ))
    }

    /// Distance from the center to a corner.
    pub fn half_diagonal(&self) -> f64 {
        0.5 * self.width().hypot(self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::Extent;
    use crate::math::Vec2;

    #[test]
    fn empty_extent_has_no_center() {
        let e = Extent::empty();
        assert!(e.is_empty());
        assert_eq!(e.center(), None);
        assert_eq!(e.width(), 0.0);
        assert_eq!(e.half_diagonal(), 0.0);
    }

    #[test]
    fn single_point_collapses() {
        let e = Extent::from_points([Vec2::new(3.0, -4.0)]);
        assert!(!e.is_empty());
        assert_eq!(e.center(), Some(Vec2::new(3.0, -4.0)));
        assert_eq!(e.width(), 0.0);
        assert_eq!(e.height(), 0.0);
    }

    #[test]
    fn grows_to_cover_points() {
        let e = Extent::from_points([
            Vec2::new(0.0, 0.0),
            Vec2::new(6.0, 2.0),
            Vec2::new(-2.0, 8.0),
        ]);
        assert_eq!(e, Extent::new([-2.0, 0.0], [6.0, 8.0]));
        assert_eq!(e.center(), Some(Vec2::new(2.0, 4.0)));
        assert_eq!(e.half_diagonal(), 0.5 * (8.0f64).hypot(8.0));
    }
}
