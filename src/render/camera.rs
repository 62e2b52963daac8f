use glam::{Mat4, Vec3};

const DEFAULT_FOV_Y_DEG: f32 = 65.0;
const MIN_PITCH: f32 = -std::f32::consts::FRAC_PI_2 + 0.05;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.05;
/// Exponential decay rate for orbit velocities, per second.
const DAMPING: f32 = 6.0;
const DRAG_SENSITIVITY: f32 = 0.005;
const SCROLL_SENSITIVITY: f32 = 0.12;

/// Orbit camera around a target point with velocity damping: drags and
/// scrolls feed velocities that keep the camera gliding briefly after the
/// pointer stops.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    min_distance: f32,
    max_distance: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance: distance.max(0.1),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.35,
            aspect: 16.0 / 9.0,
            fov_y: DEFAULT_FOV_Y_DEG.to_radians(),
            near: 0.05,
            far: 1000.0,
            min_distance: 0.2,
            max_distance: 500.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    /// Position the camera to frame an axis-aligned bounding box.
    pub fn frame_bounds(&mut self, center: [f32; 3], extent: [f32; 3]) {
        let radius = extent[0].max(extent[1]).max(extent[2]).max(0.01);
        self.target = Vec3::from_array(center);
        self.distance = radius * 3.0;
        self.min_distance = (radius * 0.2).max(0.05);
        self.max_distance = radius * 20.0;
        self.near = (radius * 0.01).max(0.01);
        self.far = radius * 50.0;
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Feed a pointer drag, in physical pixels.
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        self.yaw_velocity += dx * DRAG_SENSITIVITY / (1.0 / 60.0);
        self.pitch_velocity += dy * DRAG_SENSITIVITY / (1.0 / 60.0);
    }

    /// Feed a scroll step; positive dollies toward the target.
    pub fn apply_scroll(&mut self, delta: f32) {
        self.zoom_velocity -= delta * SCROLL_SENSITIVITY / (1.0 / 60.0);
    }

    /// Direct angular nudge, for keyboard orbiting.
    pub fn nudge(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw_velocity += yaw_delta;
        self.pitch_velocity += pitch_delta;
    }

    /// Advance damping by `dt` seconds: integrate velocities, then decay
    /// them exponentially.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.25);
        self.yaw += self.yaw_velocity * dt;
        self.pitch += self.pitch_velocity * dt;
        self.distance *= 1.0 + self.zoom_velocity * dt;

        self.pitch = self.pitch.clamp(MIN_PITCH, MAX_PITCH);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        wrap_angle(&mut self.yaw);

        let decay = (-DAMPING * dt).exp();
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;
    }

    pub fn eye(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        let dir = Vec3::new(
            self.yaw.cos() * cos_pitch,
            self.pitch.sin(),
            self.yaw.sin() * cos_pitch,
        );
        self.target + dir * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

fn wrap_angle(angle: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        *angle = (*angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitCamera;
    use glam::Vec3;

    #[test]
    fn drag_velocity_decays_toward_zero() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 5.0);
        camera.apply_drag(40.0, 0.0);
        camera.update(1.0 / 60.0);
        let early_yaw = camera.yaw;
        for _ in 0..240 {
            camera.update(1.0 / 60.0);
        }
        let late_yaw = camera.yaw;
        camera.update(1.0 / 60.0);
        // After several seconds of damping, the camera has all but stopped.
        assert!((camera.yaw - late_yaw).abs() < 1e-4);
        assert!((late_yaw - early_yaw).abs() > 0.0);
    }

    #[test]
    fn pitch_stays_clamped_under_heavy_drag() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 5.0);
        for _ in 0..100 {
            camera.apply_drag(0.0, 500.0);
            camera.update(1.0 / 30.0);
        }
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        assert!(camera.eye().is_finite());
    }

    #[test]
    fn set_aspect_matches_window_ratio() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 5.0);
        camera.set_aspect(1920, 1080);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        camera.set_aspect(100, 0);
        assert!(camera.aspect().is_finite());
    }

    #[test]
    fn frame_bounds_centers_the_target_and_keeps_state_finite() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 5.0);
        camera.frame_bounds([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        assert_eq!(camera.target, Vec3::new(1.0, 2.0, 3.0));
        assert!((camera.distance - 18.0).abs() < 1e-4);
        assert!(camera.eye().is_finite());
        assert!(camera.view_projection().is_finite());
    }

    #[test]
    fn zoom_dollies_toward_the_target() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 10.0);
        camera.apply_scroll(2.0);
        for _ in 0..30 {
            camera.update(1.0 / 60.0);
        }
        assert!(camera.distance < 10.0);
        assert!(camera.distance >= 0.2);
    }
}
