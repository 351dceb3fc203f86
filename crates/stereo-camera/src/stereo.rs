use crate::camera::Camera;
use glam::{Mat4, Vec3, Vec4};

/// Eye separation applied by [`StereoCamera::set_focus`], as a fraction of
/// the focal length. Keeps on-screen disparity inside a comfortable band
/// for typical scene depth ranges.
pub const CONVERGENCE_RATIO: f32 = 1.0 / 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// View/projection pair for one eye (or the mono camera).
#[derive(Debug, Clone, Copy)]
pub struct EyeMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

/// All matrices a frame needs, taken as a read-only snapshot before any
/// draw call is issued. If eye passes are ever dispatched to workers, they
/// read this snapshot — the camera is not consulted mid-frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameMatrices {
    pub mono: EyeMatrices,
    pub left: EyeMatrices,
    pub right: EyeMatrices,
}

impl FrameMatrices {
    pub fn snapshot(cam: &StereoCamera) -> Self {
        Self {
            mono: EyeMatrices {
                view: cam.camera().view_matrix(),
                projection: cam.camera().projection_matrix(),
            },
            left: cam.eye_matrices(Eye::Left),
            right: cam.eye_matrices(Eye::Right),
        }
    }
}

/// Off-axis stereoscopic camera.
///
/// Wraps a mono [`Camera`] and derives per-eye view/projection matrices by
/// translating each eye sideways and shearing its frustum, rather than
/// rotating the eyes toward the center of interest. Toe-in rotation would
/// introduce vertical parallax; the off-axis method keeps parallax purely
/// horizontal, with zero parallax at `focal_length` distance.
///
/// Derived eye positions and matrices are computed on demand and never
/// cached, so they always reflect the current parameters.
#[derive(Debug, Clone)]
pub struct StereoCamera {
    base: Camera,
    focal_length: f32,
    eye_separation: f32,
}

impl StereoCamera {
    pub fn new(base: Camera) -> Self {
        Self {
            base,
            focal_length: 1.0,
            eye_separation: 0.05,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.base
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.base
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn eye_separation(&self) -> f32 {
        self.eye_separation
    }

    /// Sets the zero-parallax distance. Leaves the eye separation
    /// untouched, which can push parallax out of comfortable bounds when
    /// the separation was chosen for a different depth — use
    /// [`set_focus`](Self::set_focus) to adjust both together.
    pub fn set_focal_length(&mut self, distance: f32) {
        self.focal_length = distance.max(1.0e-6);
    }

    pub fn set_eye_separation(&mut self, separation: f32) {
        self.eye_separation = separation.max(0.0);
    }

    /// Sets the zero-parallax distance and derives a matching eye
    /// separation from [`CONVERGENCE_RATIO`].
    pub fn set_focus(&mut self, distance: f32) {
        self.set_focal_length(distance);
        self.eye_separation = self.focal_length * CONVERGENCE_RATIO;
    }

    /// Forwarded to the base camera; focal length and eye separation are
    /// unaffected by window resizes.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.base.set_aspect_ratio(aspect);
    }

    pub fn left_eye(&self) -> Vec3 {
        self.base.eye() - self.base.right() * (self.eye_separation * 0.5)
    }

    pub fn right_eye(&self) -> Vec3 {
        self.base.eye() + self.base.right() * (self.eye_separation * 0.5)
    }

    /// View matrix for one eye: the mono view translated sideways. Both
    /// eyes look parallel to the mono forward direction.
    pub fn eye_view(&self, eye: Eye) -> Mat4 {
        let pos = match eye {
            Eye::Left => self.left_eye(),
            Eye::Right => self.right_eye(),
        };
        Mat4::look_to_rh(pos, self.base.forward(), self.base.up())
    }

    /// Off-axis projection for one eye.
    ///
    /// The near-plane window of the symmetric frustum is shifted
    /// horizontally by `eye_separation/2 * near/focal_length` (positive for
    /// the left eye, negative for the right), so both frusta coincide at
    /// the focal plane.
    pub fn eye_projection(&self, eye: Eye) -> Mat4 {
        let near = self.base.near();
        let top = near * (self.base.fov_y_degrees().to_radians() * 0.5).tan();
        let half_w = self.base.aspect_ratio() * top;

        let shift = self.eye_separation * 0.5 * near / self.focal_length;
        let shift = match eye {
            Eye::Left => shift,
            Eye::Right => -shift,
        };

        frustum_rh(
            -half_w + shift,
            half_w + shift,
            -top,
            top,
            near,
            self.base.far(),
        )
    }

    pub fn eye_matrices(&self, eye: Eye) -> EyeMatrices {
        EyeMatrices {
            view: self.eye_view(eye),
            projection: self.eye_projection(eye),
        }
    }
}

/// Off-center perspective projection, right-handed, 0..1 clip depth
/// (wgpu convention; reduces to `Mat4::perspective_rh` for symmetric
/// bounds).
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * rw, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * rh, 0.0, 0.0),
        Vec4::new((right + left) * rw, (top + bottom) * rh, far * rd, -1.0),
        Vec4::new(0.0, 0.0, near * far * rd, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-5;

    fn test_camera() -> StereoCamera {
        let base = Camera::new(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::ZERO,
            60.0,
            16.0 / 9.0,
        );
        let mut cam = StereoCamera::new(base);
        cam.set_focal_length(5.0);
        cam.set_eye_separation(0.05);
        cam
    }

    fn mat_approx_eq(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < EPS)
    }

    /// NDC position of a world point under a view/projection pair.
    fn project(view: Mat4, proj: Mat4, p: Vec3) -> Vec3 {
        let clip = proj * view * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn symmetric_frustum_matches_perspective() {
        let near = 0.1;
        let far = 500.0;
        let top = near * (60.0_f32.to_radians() * 0.5).tan();
        let half_w = (16.0 / 9.0) * top;
        let a = frustum_rh(-half_w, half_w, -top, top, near, far);
        let b = Mat4::perspective_rh(60.0_f32.to_radians(), 16.0 / 9.0, near, far);
        assert!(mat_approx_eq(a, b));
    }

    #[test]
    fn zero_separation_degenerates_to_mono() {
        let mut cam = test_camera();
        cam.set_eye_separation(0.0);

        let mono_view = cam.camera().view_matrix();
        let mono_proj = cam.camera().projection_matrix();

        assert!(mat_approx_eq(cam.eye_view(Eye::Left), mono_view));
        assert!(mat_approx_eq(cam.eye_view(Eye::Right), mono_view));
        assert!(mat_approx_eq(cam.eye_projection(Eye::Left), mono_proj));
        assert!(mat_approx_eq(cam.eye_projection(Eye::Right), mono_proj));
    }

    #[test]
    fn eye_points_are_offset_along_right_vector() {
        // eye (0,0,-10) looking at the origin: forward is +Z, so the
        // camera's right vector is world -X.
        let cam = test_camera();
        let left = cam.left_eye();
        let right = cam.right_eye();

        assert!((left.x - 0.025).abs() < EPS);
        assert!((right.x + 0.025).abs() < EPS);
        assert!(left.y.abs() < EPS && right.y.abs() < EPS);
        assert!((left.z + 10.0).abs() < EPS && (right.z + 10.0).abs() < EPS);
    }

    #[test]
    fn zero_parallax_plane_sits_at_focal_length() {
        let cam = test_camera();

        // Point exactly focal_length along forward from the mono eye.
        let p = cam.camera().eye() + cam.camera().forward() * cam.focal_length();

        let l = cam.eye_matrices(Eye::Left);
        let r = cam.eye_matrices(Eye::Right);
        let lx = project(l.view, l.projection, p).x;
        let rx = project(r.view, r.projection, p).x;
        assert!(
            (lx - rx).abs() < EPS,
            "left x {lx} != right x {rx} at the focal plane"
        );

        // Off the focal plane the projections must disagree.
        let q = cam.camera().eye() + cam.camera().forward() * (cam.focal_length() * 2.0);
        let lq = project(l.view, l.projection, q).x;
        let rq = project(r.view, r.projection, q).x;
        assert!((lq - rq).abs() > EPS);
    }

    #[test]
    fn zero_parallax_holds_for_oblique_poses() {
        let base = Camera::new(
            Vec3::new(0.2, 1.3, -11.5),
            Vec3::new(0.5, 1.5, -0.1),
            60.0,
            1.5,
        );
        let mut cam = StereoCamera::new(base);
        cam.set_focus(3.7);

        let p = cam.camera().eye() + cam.camera().forward() * cam.focal_length();
        let l = cam.eye_matrices(Eye::Left);
        let r = cam.eye_matrices(Eye::Right);
        let lx = project(l.view, l.projection, p).x;
        let rx = project(r.view, r.projection, p).x;
        assert!((lx - rx).abs() < EPS);
    }

    #[test]
    fn set_focus_derives_separation_from_ratio() {
        let mut cam = test_camera();
        cam.set_focus(3.0);
        assert!((cam.focal_length() - 3.0).abs() < EPS);
        assert!((cam.eye_separation() - 3.0 * CONVERGENCE_RATIO).abs() < EPS);
    }

    #[test]
    fn set_focal_length_leaves_separation_alone() {
        let mut cam = test_camera();
        cam.set_focal_length(2.0);
        assert!((cam.eye_separation() - 0.05).abs() < EPS);
    }

    #[test]
    fn invalid_parameters_are_clamped() {
        let mut cam = test_camera();
        cam.set_focal_length(-1.0);
        assert!(cam.focal_length() > 0.0);
        cam.set_eye_separation(-0.5);
        assert_eq!(cam.eye_separation(), 0.0);
    }

    #[test]
    fn aspect_change_does_not_touch_stereo_parameters() {
        let mut cam = test_camera();
        cam.set_aspect_ratio(2.4);
        assert!((cam.focal_length() - 5.0).abs() < EPS);
        assert!((cam.eye_separation() - 0.05).abs() < EPS);
        assert!((cam.camera().aspect_ratio() - 2.4).abs() < EPS);
    }

    #[test]
    fn snapshot_matches_live_camera() {
        let cam = test_camera();
        let snap = FrameMatrices::snapshot(&cam);
        assert!(mat_approx_eq(snap.left.view, cam.eye_view(Eye::Left)));
        assert!(mat_approx_eq(
            snap.right.projection,
            cam.eye_projection(Eye::Right)
        ));
        assert!(mat_approx_eq(snap.mono.view, cam.camera().view_matrix()));
    }
}
