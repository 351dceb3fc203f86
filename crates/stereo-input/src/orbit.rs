use glam::{Quat, Vec2, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Radians of orbit per pixel of drag.
const ORBIT_SENSITIVITY: f32 = 0.008;
/// Dolly scale per pixel of vertical drag.
const DOLLY_SENSITIVITY: f32 = 0.005;
/// Pan scale per pixel, multiplied by the eye-to-center distance.
const PAN_SENSITIVITY: f32 = 0.0015;
/// Minimum eye-to-center distance; keeps the view direction well defined.
const MIN_DISTANCE: f32 = 0.2;
/// Keep the pitch this far away from the poles (radians).
const POLE_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    /// Left button: rotate the eye around the center of interest.
    Orbit,
    /// Right button: move the eye along the view direction.
    Dolly,
    /// Middle button: slide eye and center together in the view plane.
    Pan,
}

/// Maya-style orbit camera driven by mouse drags.
///
/// Owns the eye/center pose; the application copies it into the stereo
/// camera whenever an event reports a change.
pub struct OrbitController {
    eye: Vec3,
    center: Vec3,
    up: Vec3,
    dragging: Option<DragMode>,
    last_cursor: Option<Vec2>,
}

impl OrbitController {
    pub fn new(eye: Vec3, center: Vec3) -> Self {
        Self {
            eye,
            center,
            up: Vec3::Y,
            dragging: None,
            last_cursor: None,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.dragging = match button {
                    MouseButton::Left => Some(DragMode::Orbit),
                    MouseButton::Right => Some(DragMode::Dolly),
                    MouseButton::Middle => Some(DragMode::Pan),
                    _ => None,
                };
            }
            ElementState::Released => {
                self.dragging = None;
            }
        }
    }

    /// Returns true when the pose changed.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> bool {
        let cursor = Vec2::new(x as f32, y as f32);
        let last = self.last_cursor.replace(cursor);

        let (Some(mode), Some(last)) = (self.dragging, last) else {
            return false;
        };
        let delta = cursor - last;
        if delta == Vec2::ZERO {
            return false;
        }

        match mode {
            DragMode::Orbit => self.orbit(delta),
            DragMode::Dolly => self.dolly(1.0 + delta.y * DOLLY_SENSITIVITY),
            DragMode::Pan => self.pan(delta),
        }
        true
    }

    /// Scroll wheel dollies as well.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) -> bool {
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
        };
        if amount == 0.0 {
            return false;
        }
        self.dolly(1.0 - amount * 0.1);
        true
    }

    fn orbit(&mut self, delta: Vec2) {
        let offset = self.eye - self.center;
        let distance = offset.length();

        let yaw = Quat::from_rotation_y(-delta.x * ORBIT_SENSITIVITY);
        let mut rotated = yaw * offset;

        // Pitch around the current right axis, stopping short of the poles.
        let right = rotated.cross(self.up).normalize_or_zero();
        if right != Vec3::ZERO {
            let pitch = Quat::from_axis_angle(right, -delta.y * ORBIT_SENSITIVITY);
            let candidate = pitch * rotated;
            let polar = candidate.normalize().dot(self.up).acos();
            if polar > POLE_MARGIN && polar < std::f32::consts::PI - POLE_MARGIN {
                rotated = candidate;
            }
        }

        self.eye = self.center + rotated.normalize() * distance;
    }

    fn dolly(&mut self, factor: f32) {
        let offset = self.eye - self.center;
        let distance = (offset.length() * factor).max(MIN_DISTANCE);
        self.eye = self.center + offset.normalize() * distance;
    }

    fn pan(&mut self, delta: Vec2) {
        let forward = (self.center - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);

        let distance = self.eye.distance(self.center);
        let shift = (-right * delta.x + up * delta.y) * distance * PAN_SENSITIVITY;
        self.eye += shift;
        self.center += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn drag(controller: &mut OrbitController, button: MouseButton, from: (f64, f64), to: (f64, f64)) {
        controller.on_cursor_moved(from.0, from.1);
        controller.on_mouse_button(button, ElementState::Pressed);
        controller.on_cursor_moved(to.0, to.1);
        controller.on_mouse_button(button, ElementState::Released);
    }

    #[test]
    fn orbit_preserves_distance_to_center() {
        let mut c = OrbitController::new(Vec3::new(0.2, 1.3, -11.5), Vec3::new(0.5, 1.5, -0.1));
        let before = c.eye().distance(c.center());

        drag(&mut c, MouseButton::Left, (100.0, 100.0), (180.0, 60.0));

        let after = c.eye().distance(c.center());
        assert!((before - after).abs() < EPS);
        assert!(c.eye().distance(Vec3::new(0.2, 1.3, -11.5)) > EPS, "drag should move the eye");
    }

    #[test]
    fn orbit_leaves_center_alone() {
        let mut c = OrbitController::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
        drag(&mut c, MouseButton::Left, (0.0, 0.0), (50.0, 20.0));
        assert_eq!(c.center(), Vec3::ZERO);
    }

    #[test]
    fn dolly_respects_minimum_distance() {
        let mut c = OrbitController::new(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);
        for _ in 0..100 {
            drag(&mut c, MouseButton::Right, (0.0, 100.0), (0.0, 0.0));
        }
        assert!(c.eye().distance(c.center()) >= MIN_DISTANCE - EPS);
        assert_ne!(c.eye(), c.center());
    }

    #[test]
    fn pan_moves_both_points_by_the_same_shift() {
        let mut c = OrbitController::new(Vec3::new(0.0, 1.0, -10.0), Vec3::ZERO);
        let (eye0, center0) = (c.eye(), c.center());

        drag(&mut c, MouseButton::Middle, (0.0, 0.0), (40.0, -25.0));

        let eye_shift = c.eye() - eye0;
        let center_shift = c.center() - center0;
        assert!((eye_shift - center_shift).length() < EPS);
        assert!(eye_shift.length() > EPS);
    }

    #[test]
    fn cursor_motion_without_drag_is_ignored() {
        let mut c = OrbitController::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
        assert!(!c.on_cursor_moved(10.0, 10.0));
        assert!(!c.on_cursor_moved(300.0, 300.0));
        assert_eq!(c.eye(), Vec3::new(0.0, 0.0, -10.0));
    }
}
