use std::time::Instant;
use winit::window::Window;

/// Per-frame delta measurement plus a twice-a-second fps readout in the
/// window title.
pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            base_title,
        }
    }

    pub fn update(&mut self, window: &Window, now: Instant) {
        let dt = self
            .last_frame_time
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(std::time::Duration::from_millis(16));
        self.last_frame_time = Some(now);
        self.frame_dt = dt.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() >= 0.5 {
            let fps = self.frame_count as f32 / elapsed.as_secs_f32();
            window.set_title(&format!(
                "{} - {:.1} fps ({:.2} ms)",
                self.base_title,
                fps,
                (self.frame_dt * 1000.0).max(0.0)
            ));
            self.frame_count = 0;
            self.last_fps_time = now;
        }
    }
}
