use foundation::time::Time;

/// Deterministic tick metadata for the UI event loop.
///
/// Hosts advance one frame per animation tick; the frame index tags every
/// event emitted during that tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Time elapsed since the previous frame (milliseconds).
    pub dt_ms: f64,
    /// Clock reading at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_ms: 0.0,
            time: Time::ZERO,
        }
    }

    /// Next frame after `dt_ms` milliseconds. Negative or non-finite deltas count as zero.
    pub fn next(self, dt_ms: f64) -> Self {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_ms,
            time: self.time.advanced_by(dt_ms),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::first()
    }
}
