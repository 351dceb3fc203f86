use glam::{Mat4, Vec3};

/// Mono base camera: a pose (eye + center of interest) and a symmetric
/// perspective frustum.
///
/// All setters clamp instead of failing — the render loop must keep
/// producing valid matrices every frame, so invalid parameters are
/// corrected to the nearest legal value.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    fov_y_degrees: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            center: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl Camera {
    pub fn new(eye: Vec3, center: Vec3, fov_y_degrees: f32, aspect_ratio: f32) -> Self {
        let mut cam = Self::default();
        cam.set_eye(eye);
        cam.set_center(center);
        cam.set_fov_y_degrees(fov_y_degrees);
        cam.set_aspect_ratio(aspect_ratio);
        cam
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// Moves the eye point. A value coinciding with the center of interest
    /// is rejected (the previous eye is kept) — the view direction must
    /// never degenerate.
    pub fn set_eye(&mut self, eye: Vec3) {
        if eye != self.center {
            self.eye = eye;
        }
    }

    /// Moves the center of interest. Rejected if it coincides with the eye.
    pub fn set_center(&mut self, center: Vec3) {
        if center != self.eye {
            self.center = center;
        }
    }

    /// Sets both points at once; rejected only if they coincide.
    pub fn set_look_at(&mut self, eye: Vec3, center: Vec3) {
        if eye != center {
            self.eye = eye;
            self.center = center;
        }
    }

    pub fn set_fov_y_degrees(&mut self, fov: f32) {
        self.fov_y_degrees = fov.clamp(1.0e-3, 180.0 - 1.0e-3);
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect_ratio = aspect.max(1.0e-6);
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near.max(1.0e-6);
        self.far = far.max(self.near + 1.0e-6);
    }

    /// Unit vector from the eye toward the center of interest.
    pub fn forward(&self) -> Vec3 {
        (self.center - self.eye).normalize()
    }

    /// Unit vector pointing to the camera's right.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    pub fn distance_to_center(&self) -> f32 {
        self.eye.distance(self.center)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward(), self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_center_is_rejected() {
        let mut cam = Camera::default();
        let eye = cam.eye();
        cam.set_center(eye);
        assert_ne!(cam.center(), cam.eye());
    }

    #[test]
    fn fov_is_clamped_to_open_interval() {
        let mut cam = Camera::default();
        cam.set_fov_y_degrees(0.0);
        assert!(cam.fov_y_degrees() > 0.0);
        cam.set_fov_y_degrees(250.0);
        assert!(cam.fov_y_degrees() < 180.0);
    }

    #[test]
    fn forward_and_right_are_orthonormal() {
        let cam = Camera::new(
            Vec3::new(0.2, 1.3, -11.5),
            Vec3::new(0.5, 1.5, -0.1),
            60.0,
            16.0 / 9.0,
        );
        let f = cam.forward();
        let r = cam.right();
        assert!((f.length() - 1.0).abs() < 1.0e-6);
        assert!((r.length() - 1.0).abs() < 1.0e-6);
        assert!(f.dot(r).abs() < 1.0e-6);
    }
}
