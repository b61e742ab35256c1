use crate::scene::ground::REFERENCE_FRAME;

/// Longest step a single frame may integrate, in seconds.
pub const MAX_DELTA: f32 = 0.05;

/// Turns host timestamps into per-frame deltas.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick, clamped to `[0, MAX_DELTA]`.
    /// The first tick has no predecessor and reports one reference frame.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            None => REFERENCE_FRAME,
            Some(last) => (((timestamp_ms - last) / 1000.0) as f32).clamp(0.0, MAX_DELTA),
        };
        self.last_ms = Some(timestamp_ms);
        dt
    }
}
