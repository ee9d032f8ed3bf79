use std::time::Instant;

use bytemuck::{Pod, Zeroable};

/// Per-frame values uploaded to the uniform buffer before each draw.
///
/// The byte layout is a contract with the `RuntimeData` block declared by
/// the source assembler: vec4 mouse, vec2 resolution, float time, float
/// deltaTime, int frame, padded to a 16-byte multiple (48 bytes total).
/// The layout test below pins every offset so the two sides cannot drift.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug)]
pub struct RuntimeUniforms {
    /// x, y: cursor position; z: left button down; w: right button down.
    pub mouse: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub delta_time: f32,
    pub frame: i32,
    _padding: [f32; 3],
}

unsafe impl Zeroable for RuntimeUniforms {}
unsafe impl Pod for RuntimeUniforms {}

/// Input state sampled once per frame by the window loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub mouse_position: (f32, f32),
    pub left_down: bool,
    pub right_down: bool,
    /// Reports the cursor with a top-left origin when set; the reference
    /// convention is bottom-left.
    pub invert_mouse_y: bool,
}

impl RuntimeUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mouse: [0.0; 4],
            resolution: [width as f32, height as f32],
            time: 0.0,
            delta_time: 0.0,
            frame: 0,
            _padding: [0.0; 3],
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }

    /// Advances the block by one frame. Time accumulates across frames so
    /// pausing the clock upstream freezes the shader in place.
    pub fn update(&mut self, input: &FrameInput, delta_time: f32) {
        let (x, raw_y) = input.mouse_position;
        let y = if input.invert_mouse_y {
            raw_y
        } else {
            self.resolution[1] - raw_y
        };
        self.mouse = [
            x,
            y,
            if input.left_down { 1.0 } else { 0.0 },
            if input.right_down { 1.0 } else { 0.0 },
        ];
        self.time += delta_time;
        self.delta_time = delta_time;
        self.frame = self.frame.saturating_add(1);
    }
}

/// Monotonic frame clock producing per-frame deltas.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Returns the seconds elapsed since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulating timer that fires an apply request at a fixed interval
/// while enabled. Toggling the timer resets the accumulator so a re-enable
/// never fires immediately.
#[derive(Debug, Clone)]
pub struct AutoApplyTimer {
    interval: f32,
    elapsed: f32,
    enabled: bool,
}

impl AutoApplyTimer {
    pub fn new(interval: f32, enabled: bool) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.elapsed = 0.0;
    }

    pub fn set_interval(&mut self, interval: f32) {
        self.interval = interval.max(0.05);
    }

    /// Advances the timer; returns true when an auto-apply is due.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.elapsed += delta_time;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn uniforms_follow_declared_block_layout() {
        let uniforms = RuntimeUniforms::new(1920, 1080);
        let base = &uniforms as *const _ as usize;

        assert_eq!(align_of::<RuntimeUniforms>(), 16);
        assert_eq!(size_of::<RuntimeUniforms>(), 48);
        assert_eq!((&uniforms.mouse as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.resolution as *const _ as usize) - base, 16);
        assert_eq!((&uniforms.time as *const _ as usize) - base, 24);
        assert_eq!((&uniforms.delta_time as *const _ as usize) - base, 28);
        assert_eq!((&uniforms.frame as *const _ as usize) - base, 32);
    }

    #[test]
    fn update_accumulates_time_and_frames() {
        let mut uniforms = RuntimeUniforms::new(100, 100);
        let input = FrameInput::default();

        uniforms.update(&input, 0.25);
        uniforms.update(&input, 0.5);

        assert!((uniforms.time - 0.75).abs() < 1e-6);
        assert!((uniforms.delta_time - 0.5).abs() < 1e-6);
        assert_eq!(uniforms.frame, 2);
    }

    #[test]
    fn mouse_y_uses_bottom_left_origin_by_default() {
        let mut uniforms = RuntimeUniforms::new(200, 100);
        let mut input = FrameInput {
            mouse_position: (10.0, 30.0),
            left_down: true,
            right_down: false,
            invert_mouse_y: false,
        };

        uniforms.update(&input, 0.016);
        assert_eq!(uniforms.mouse, [10.0, 70.0, 1.0, 0.0]);

        input.invert_mouse_y = true;
        input.right_down = true;
        uniforms.update(&input, 0.016);
        assert_eq!(uniforms.mouse, [10.0, 30.0, 1.0, 1.0]);
    }

    #[test]
    fn auto_apply_fires_at_interval_and_resets() {
        let mut timer = AutoApplyTimer::new(1.0, true);
        assert!(!timer.tick(0.4));
        assert!(!timer.tick(0.4));
        assert!(timer.tick(0.4));
        // Accumulator restarted after firing.
        assert!(!timer.tick(0.9));
        assert!(timer.tick(0.2));
    }

    #[test]
    fn disabled_timer_never_fires_and_reenabling_resets() {
        let mut timer = AutoApplyTimer::new(1.0, true);
        timer.tick(0.9);
        timer.set_enabled(false);
        assert!(!timer.tick(5.0));
        timer.set_enabled(true);
        assert!(!timer.tick(0.9));
        assert!(timer.tick(0.2));
    }
}
