use crate::ball::Ball;
use crate::table::table_transform;
use crate::{Mat4, Vec3, vec3};

/// Default eye distance from the table centre.
pub const DEFAULT_ZOOM: f32 = 2.0;
/// Fraction of the current zoom applied per scroll tick.
pub const ZOOM_STEP: f32 = 0.1;
/// Cursor pixels per radian of orbit.
pub const DRAG_PIXELS_PER_RADIAN: f32 = 200.0;

/// Orbit camera around the table (right-handed, +Y up).
///
/// The eye sits at `(0, 0.6 * zoom, zoom)` looking at the origin; dragging
/// spins the scene about +Y instead of moving the eye.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub zoom: f32,
    /// Orbit angle in radians.
    pub angle: f32,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            angle: 0.0,
            fov_y_rad: 45f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
            aspect,
        }
    }

    /// Scroll wheel: `+1` grows the zoom by 10% of its magnitude, `-1` shrinks it.
    /// Any other value is ignored. Repeated shrinking approaches zero but never
    /// reaches it or flips sign.
    pub fn process_scroll(&mut self, tick: f32) {
        if tick == 1.0 {
            self.zoom += self.zoom.abs() * ZOOM_STEP;
        } else if tick == -1.0 {
            self.zoom -= self.zoom.abs() * ZOOM_STEP;
        }
    }

    /// Horizontal cursor motion rotates the scene while the button is held.
    pub fn process_drag(&mut self, dx: f32, button_held: bool) {
        if button_held {
            self.angle += dx / DRAG_PIXELS_PER_RADIAN;
        }
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        vec3(0.0, 0.6 * self.zoom, self.zoom)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    /// Perspective with depth in [0, 1], as wgpu expects.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    /// Orbit rotation applied to the whole scene.
    #[inline]
    pub fn world(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle)
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view() * self.world()
    }

    pub fn table_mvp(&self) -> Mat4 {
        self.proj_view() * table_transform().matrix()
    }

    pub fn ball_mvp(&self, ball: &Ball) -> Mat4 {
        self.proj_view() * ball.model_matrix()
    }

    /// Eye position in scene space (before the orbit rotation), for specular terms.
    pub fn eye_world(&self) -> Vec3 {
        self.world().inverse().transform_point3(self.eye())
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_out_never_crosses_zero() {
        let mut cam = Camera::default();
        let mut last = cam.zoom;
        for _ in 0..500 {
            cam.process_scroll(-1.0);
            assert!(cam.zoom < last);
            assert!(cam.zoom > 0.0);
            last = cam.zoom;
        }
    }

    #[test]
    fn zoom_in_grows_by_ten_percent() {
        let mut cam = Camera::default();
        cam.process_scroll(1.0);
        assert!((cam.zoom - DEFAULT_ZOOM * 1.1).abs() < 1e-6);
    }

    #[test]
    fn fractional_scroll_is_ignored() {
        let mut cam = Camera::default();
        cam.process_scroll(0.5);
        cam.process_scroll(-2.0);
        assert_eq!(cam.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn drag_only_with_button_held() {
        let mut cam = Camera::default();
        cam.process_drag(100.0, false);
        assert_eq!(cam.angle, 0.0);
        cam.process_drag(100.0, true);
        assert!((cam.angle - 0.5).abs() < 1e-6);
        cam.process_drag(-100.0, true);
        assert!(cam.angle.abs() < 1e-6);
    }

    #[test]
    fn ball_mvp_is_finite_and_in_front() {
        let cam = Camera::default();
        let ball = Ball::new(vec3(0.3, 0.1, 0.2));
        let clip = cam.ball_mvp(&ball) * Vec3::ZERO.extend(1.0);
        assert!(clip.to_array().iter().all(|f| f.is_finite()));
        assert!(clip.w > 0.0);
        let ndc_z = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&ndc_z));
    }

    #[test]
    fn table_mvp_differs_from_ball_mvp() {
        let cam = Camera::default();
        let ball = Ball::new(Vec3::ZERO);
        assert_ne!(cam.table_mvp(), cam.ball_mvp(&ball));
    }

    #[test]
    fn eye_world_follows_orbit() {
        let mut cam = Camera::default();
        assert!((cam.eye_world() - cam.eye()).length() < 1e-6);
        cam.angle = std::f32::consts::FRAC_PI_2;
        let eye = cam.eye_world();
        // Rotating the scene by +90° about Y puts the eye on -X in scene space.
        assert!(eye.x < -1.9 && eye.z.abs() < 1e-5);
    }
}
