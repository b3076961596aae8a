use std::time::{Duration, Instant};

/// Delta-timing calculator.
///
/// With delta timing enabled, speeds and alarms scale by how long the frame
/// really took compared to the target frame time. The frame time is capped
/// at `1 / min_fps` so a stall never turns into one giant physics step.
#[derive(Debug, Clone)]
pub struct DeltaClock {
    fps: f32,
    enabled: bool,
    min_fps: f32,
}

impl DeltaClock {
    pub fn new(fps: f32, enabled: bool, min_fps: f32) -> Self {
        Self {
            fps,
            enabled,
            min_fps,
        }
    }

    /// Multiplier for a frame that took `time_passed`. Always 1.0 when
    /// delta timing is off.
    pub fn delta_mult(&self, time_passed: Duration) -> f32 {
        if !self.enabled || self.fps <= 0.0 {
            return 1.0;
        }
        let target = 1.0 / self.fps;
        let mut actual = time_passed.as_secs_f32();
        if self.min_fps > 0.0 {
            // Pretend the frame rate never drops below the floor.
            actual = actual.min(1.0 / self.min_fps);
        }
        actual / target
    }

    /// Target duration of one frame.
    pub fn frame_time(&self) -> Duration {
        if self.fps <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f32(1.0 / self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Measures wall time between consecutive frames.
#[derive(Debug, Default)]
pub struct FrameTimer {
    last: Option<Instant>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time since the previous call. The first call returns `fallback`.
    pub fn lap(&mut self, fallback: Duration) -> Duration {
        let now = Instant::now();
        let elapsed = match self.last {
            Some(last) => now.duration_since(last),
            None => fallback,
        };
        self.last = Some(now);
        elapsed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_always_one() {
        let clock = DeltaClock::new(60.0, false, 15.0);
        assert_eq!(clock.delta_mult(Duration::from_millis(100)), 1.0);
        assert_eq!(clock.delta_mult(Duration::ZERO), 1.0);
    }

    #[test]
    fn slow_frame_scales_up() {
        let clock = DeltaClock::new(50.0, true, 5.0);
        let mult = clock.delta_mult(Duration::from_millis(40));
        assert!((mult - 2.0).abs() < 1e-4, "mult was {}", mult);
    }

    #[test]
    fn fast_frame_scales_down() {
        let clock = DeltaClock::new(50.0, true, 5.0);
        let mult = clock.delta_mult(Duration::from_millis(10));
        assert!((mult - 0.5).abs() < 1e-4, "mult was {}", mult);
    }

    #[test]
    fn floor_caps_runaway_steps() {
        // 60 fps target, floor of 15 fps: at most 4x per frame.
        let clock = DeltaClock::new(60.0, true, 15.0);
        let mult = clock.delta_mult(Duration::from_secs(2));
        assert!((mult - 4.0).abs() < 1e-4, "mult was {}", mult);
    }

    #[test]
    fn first_lap_uses_fallback() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.lap(Duration::from_millis(16)), Duration::from_millis(16));
        assert!(timer.lap(Duration::from_secs(100)) < Duration::from_secs(100));
    }
}
