use crate::stereo::StereoCamera;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Factor applied to the eye-to-center distance by the two distance-based
/// direct modes.
const DISTANCE_FACTOR: f32 = 0.5;

/// How the focal length is derived each frame.
///
/// A closed set of four policies, matching the original sample. Two of the
/// four also rewrite the eye separation (via `set_focus`); the other two
/// deliberately leave it to the caller — that asymmetry is intentional, not
/// an oversight, and [`adjusts_separation`](FocusMode::adjusts_separation)
/// makes it explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusMode {
    /// Distance to the center of interest; focal length only. The caller
    /// is responsible for keeping the eye separation sensible.
    FocalLength,
    /// Distance to the center of interest; focal length plus a derived eye
    /// separation. Parallax can still run out of bounds when geometry sits
    /// much nearer than the center of interest.
    Focus,
    /// Distance to the center of interest scaled by the depth fraction;
    /// focal length only.
    AutoSimple,
    /// Nearest distance sampled from the rendered depth buffer, scaled by
    /// the depth fraction. Convergence tracks actual visible geometry, so
    /// parallax stays in bounds regardless of occluders.
    AutoDepth,
}

impl FocusMode {
    /// Whether this mode consumes a depth-buffer sample.
    pub fn uses_depth_buffer(self) -> bool {
        matches!(self, FocusMode::AutoDepth)
    }

    /// Whether the controller rewrites the eye separation in this mode.
    pub fn adjusts_separation(self) -> bool {
        matches!(self, FocusMode::Focus | FocusMode::AutoDepth)
    }

    /// Whether the depth fraction / speed adjustments apply.
    pub fn is_auto(self) -> bool {
        matches!(self, FocusMode::AutoSimple | FocusMode::AutoDepth)
    }
}

/// Per-frame focal length controller.
///
/// Computes a target focal length from the active [`FocusMode`] and slews
/// its own estimate toward it, bounded by `speed` units per second, so the
/// 3D effect never pops. The estimate survives mode switches — changing
/// modes mid-flight cannot jump further than the rate limit either.
#[derive(Debug, Clone)]
pub struct AutoFocuser {
    mode: FocusMode,
    depth_fraction: f32,
    speed: f32,
    min_focal: f32,
    max_focal: f32,
    current: f32,
}

impl Default for AutoFocuser {
    fn default() -> Self {
        Self {
            mode: FocusMode::AutoDepth,
            depth_fraction: 1.0,
            speed: 0.05,
            min_focal: 0.1,
            max_focal: 5.0,
            current: 1.0,
        }
    }
}

impl AutoFocuser {
    pub fn new(mode: FocusMode, depth_fraction: f32, speed: f32, min_focal: f32, max_focal: f32) -> Self {
        let mut af = Self {
            mode,
            ..Self::default()
        };
        af.set_depth_fraction(depth_fraction);
        af.set_speed(speed);
        af.min_focal = min_focal.max(1.0e-6);
        af.max_focal = max_focal.max(af.min_focal);
        af.current = af.current.clamp(af.min_focal, af.max_focal);
        af
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    /// Switches the policy. The smoothed estimate is kept, so the next
    /// `update` is still bounded by the rate limit.
    pub fn set_mode(&mut self, mode: FocusMode) {
        if self.mode != mode {
            debug!(?mode, "focus mode changed");
            self.mode = mode;
        }
    }

    pub fn depth_fraction(&self) -> f32 {
        self.depth_fraction
    }

    /// Target convergence depth as a fraction of the surveyed range;
    /// clamped to (0, 1]. 1.0 puts zero parallax on the nearest surface.
    pub fn set_depth_fraction(&mut self, fraction: f32) {
        self.depth_fraction = fraction.clamp(0.05, 1.0);
    }

    pub fn adjust_depth_fraction(&mut self, delta: f32) {
        self.set_depth_fraction(self.depth_fraction + delta);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Maximum focal-length change per second; clamped above zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.01);
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.set_speed(self.speed + delta);
    }

    pub fn current_focal_length(&self) -> f32 {
        self.current
    }

    /// Computes the frame's focal length and applies it to the camera.
    ///
    /// `depth_sample` is the nearest world-space distance surveyed from the
    /// previous frame's depth buffer; only [`FocusMode::AutoDepth`] reads
    /// it. A missing sample leaves the estimate unchanged rather than
    /// producing an undefined target.
    pub fn update(&mut self, cam: &mut StereoCamera, dt: f32, depth_sample: Option<f32>) -> f32 {
        let raw_target = match self.mode {
            FocusMode::FocalLength | FocusMode::Focus => {
                cam.camera().distance_to_center() * DISTANCE_FACTOR
            }
            FocusMode::AutoSimple => cam.camera().distance_to_center() * self.depth_fraction,
            FocusMode::AutoDepth => match depth_sample {
                Some(d) => d * self.depth_fraction,
                None => self.current,
            },
        };

        let target = raw_target.clamp(self.min_focal, self.max_focal);

        let max_step = self.speed * dt.max(0.0);
        self.current += (target - self.current).clamp(-max_step, max_step);

        if self.mode.adjusts_separation() {
            cam.set_focus(self.current);
        } else {
            cam.set_focal_length(self.current);
        }

        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use glam::Vec3;

    const EPS: f32 = 1.0e-5;

    fn camera_at_distance(d: f32) -> StereoCamera {
        let base = Camera::new(Vec3::new(0.0, 0.0, -d), Vec3::ZERO, 60.0, 16.0 / 9.0);
        StereoCamera::new(base)
    }

    #[test]
    fn depth_mode_takes_one_rate_limited_step() {
        let mut cam = camera_at_distance(10.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 1.0, 0.05, 0.1, 5.0);
        af.current = 5.0;

        // Sampled depth corresponds to world distance 3.0; one second may
        // move the focal length by at most 0.05.
        let f = af.update(&mut cam, 1.0, Some(3.0));
        assert!((f - 4.95).abs() < EPS);
        assert!((cam.focal_length() - 4.95).abs() < EPS);
    }

    #[test]
    fn rate_limit_holds_for_extreme_jumps() {
        let mut cam = camera_at_distance(10.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 1.0, 0.05, 0.1, 5.0);
        af.current = 0.1;

        let before = af.current_focal_length();
        let after = af.update(&mut cam, 0.016, Some(1000.0));
        assert!((after - before).abs() <= 0.05 * 0.016 + EPS);
    }

    #[test]
    fn mode_switch_does_not_jump_past_rate_limit() {
        let mut cam = camera_at_distance(8.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 1.0, 0.05, 0.1, 5.0);

        let before = af.update(&mut cam, 1.0, Some(0.5));
        af.set_mode(FocusMode::Focus);
        let after = af.update(&mut cam, 1.0, None);
        assert!((after - before).abs() <= 0.05 + EPS);
    }

    #[test]
    fn missing_depth_sample_keeps_previous_focal_length() {
        let mut cam = camera_at_distance(10.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 1.0, 0.05, 0.1, 5.0);
        af.current = 2.5;

        let f = af.update(&mut cam, 1.0, None);
        assert!((f - 2.5).abs() < EPS);
    }

    #[test]
    fn target_is_clamped_to_focal_range() {
        let mut cam = camera_at_distance(10.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 1.0, 100.0, 0.1, 5.0);

        // Huge speed: converges in one step, but only to max_focal.
        let f = af.update(&mut cam, 1.0, Some(50.0));
        assert!((f - 5.0).abs() < EPS);
    }

    #[test]
    fn distance_modes_target_half_the_center_distance() {
        let mut cam = camera_at_distance(6.0);
        let mut af = AutoFocuser::new(FocusMode::Focus, 1.0, 1000.0, 0.1, 5.0);

        let f = af.update(&mut cam, 1.0, None);
        assert!((f - 3.0).abs() < EPS);
    }

    #[test]
    fn separation_asymmetry_follows_the_mode_table() {
        let mut cam = camera_at_distance(6.0);
        cam.set_eye_separation(0.42);
        let mut af = AutoFocuser::new(FocusMode::FocalLength, 1.0, 1000.0, 0.1, 5.0);

        af.update(&mut cam, 1.0, None);
        assert!((cam.eye_separation() - 0.42).abs() < EPS, "FocalLength must not touch separation");

        af.set_mode(FocusMode::Focus);
        af.update(&mut cam, 1.0, None);
        let expected = cam.focal_length() * crate::stereo::CONVERGENCE_RATIO;
        assert!((cam.eye_separation() - expected).abs() < EPS, "Focus must derive separation");
    }

    #[test]
    fn depth_fraction_scales_the_depth_target() {
        let mut cam = camera_at_distance(10.0);
        let mut af = AutoFocuser::new(FocusMode::AutoDepth, 0.5, 1000.0, 0.1, 5.0);

        let f = af.update(&mut cam, 1.0, Some(4.0));
        assert!((f - 2.0).abs() < EPS);
    }

    #[test]
    fn adjustments_are_clamped() {
        let mut af = AutoFocuser::default();
        af.adjust_depth_fraction(5.0);
        assert!(af.depth_fraction() <= 1.0);
        af.adjust_depth_fraction(-5.0);
        assert!(af.depth_fraction() > 0.0);
        af.adjust_speed(-5.0);
        assert!(af.speed() > 0.0);
    }
}
