pub const FIXED_UPDATE_FPS: f64 = 60.0;

/// Frames per second under which a frame counts as slow.
pub const MIN_FPS: f32 = 30.0;

/// Slow frames reported together as one low frame rate event.
pub const LOW_FPS_STRIKES: u8 = 5;

/// Turns host frame timestamps into deltas.
///
/// The loop must be stopped before the view that owns it goes away, ticks
/// delivered afterwards are ignored.
#[derive(Clone, Debug, Default)]
pub struct FrameLoop {
    running: bool,
    last_timestamp_ms: Option<f64>,
    accumulated_ms: f64,
    fixed_steps: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_timestamp_ms = None;
        self.accumulated_ms = 0.0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Milliseconds since the previous tick, `None` while stopped. The first
    /// tick after [`Self::start`] has a zero delta.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f32> {
        if !self.running {
            return None;
        }

        let delta = self
            .last_timestamp_ms
            .map_or(0.0, |last| (timestamp_ms - last).max(0.0));
        self.last_timestamp_ms = Some(timestamp_ms);

        let step = 1000.0 / FIXED_UPDATE_FPS;
        self.accumulated_ms += delta;
        while self.accumulated_ms > step {
            self.accumulated_ms -= step;
            self.fixed_steps += 1;
        }

        Some(delta as f32)
    }

    /// Fixed 60 Hz updates elapsed since the loop was created.
    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }
}

#[derive(Clone, Debug, Default)]
pub struct SlowFrameMonitor {
    strikes: u8,
}

impl SlowFrameMonitor {
    /// Returns the current frame rate once enough slow frames were seen.
    pub fn record(&mut self, delta_ms: f32) -> Option<u32> {
        if delta_ms <= 0.0 {
            return None;
        }

        let fps = 1000.0 / delta_ms;
        if fps < MIN_FPS {
            self.strikes += 1;
        }
        if self.strikes >= LOW_FPS_STRIKES {
            self.strikes = 0;
            log::debug!("Low frame rate: {fps:.1} fps");
            return Some(fps.round() as u32);
        }
        None
    }
}
