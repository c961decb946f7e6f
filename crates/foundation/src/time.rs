/// Viewport clock reading in milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn millis(self) -> f64 {
        self.0
    }

    pub fn advanced_by(self, dt_ms: f64) -> Self {
        Time(self.0 + dt_ms.max(0.0))
    }
}
