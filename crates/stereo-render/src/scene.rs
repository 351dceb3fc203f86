use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Which GPU mesh a draw item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshId {
    Centerpiece,
    Note,
    Floor,
}

/// One draw call: mesh, model transform, flat color (alpha < 1 for the
/// translucent floor).
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: [f32; 4],
}

/// Animated demo scene: a rotating centerpiece over a reflective floor,
/// flanked by rows of drifting notes. Pure CPU state; the renderer owns the
/// GPU buffers.
///
/// Note trajectories are derived from a per-index seeded RNG, so the scene
/// is a deterministic function of elapsed time.
pub struct Scene {
    note_rows: i32,
}

/// The scene mirrors everything below the floor plane.
const MIRROR: Vec3 = Vec3::new(1.0, -1.0, 1.0);

impl Scene {
    pub fn new() -> Self {
        Self { note_rows: 100 }
    }

    /// Number of draw items produced per frame.
    pub fn item_count(&self) -> usize {
        // Centerpiece + mirror, notes + mirrors, floor.
        2 + (self.note_rows * 2 + 1) as usize * 2 + 1
    }

    /// Builds this frame's draw list. Opaque items first, the translucent
    /// floor last so it blends over the mirrored geometry.
    pub fn draw_items(&self, seconds: f32) -> Vec<DrawItem> {
        let mut items = Vec::with_capacity(self.item_count());

        let spin = Mat4::from_rotation_y((10.0 * seconds).to_radians());
        let gold = [0.7, 0.6, 0.0, 1.0];
        items.push(DrawItem {
            mesh: MeshId::Centerpiece,
            model: Mat4::from_translation(Vec3::new(0.0, 1.2, 0.0)) * spin,
            color: gold,
        });
        items.push(DrawItem {
            mesh: MeshId::Centerpiece,
            model: Mat4::from_scale(MIRROR) * Mat4::from_translation(Vec3::new(0.0, 1.2, 0.0)) * spin,
            color: gold,
        });

        for i in -self.note_rows..=self.note_rows {
            let mut rng = SmallRng::seed_from_u64((i + self.note_rows) as u64);
            let t = rng.gen::<f32>() * 200.0 + 2.0 * seconds;
            let r = rng.gen::<f32>() * 360.0 + 60.0 * seconds;
            let hue = rng.gen::<f32>();

            let z = (5.0 * t).rem_euclid(200.0) - 100.0;
            let translation = Vec3::new(
                i as f32 * 0.5,
                0.15 + (3.0 * t).sin().abs(),
                -z,
            );
            let model = Mat4::from_translation(translation) * Mat4::from_rotation_y(r.to_radians());

            let rgb = hsv_to_rgb(hue, 1.0, 1.0);
            let color = [rgb[0], rgb[1], rgb[2], 1.0];

            items.push(DrawItem {
                mesh: MeshId::Note,
                model,
                color,
            });
            items.push(DrawItem {
                mesh: MeshId::Note,
                model: Mat4::from_scale(MIRROR) * model,
                color,
            });
        }

        items.push(DrawItem {
            mesh: MeshId::Floor,
            model: Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0)),
            color: [1.0, 1.0, 1.0, 0.75],
        });

        items
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = (h.rem_euclid(1.0)) * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as u32 % 6 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_is_deterministic_in_time() {
        let scene = Scene::new();
        let a = scene.draw_items(12.34);
        let b = scene.draw_items(12.34);

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.mesh, y.mesh);
            assert_eq!(x.model, y.model);
            assert_eq!(x.color, y.color);
        }
    }

    #[test]
    fn item_count_matches_draw_list() {
        let scene = Scene::new();
        assert_eq!(scene.draw_items(0.0).len(), scene.item_count());
    }

    #[test]
    fn floor_is_last_and_translucent() {
        let scene = Scene::new();
        let items = scene.draw_items(3.0);
        let last = items.last().unwrap();
        assert_eq!(last.mesh, MeshId::Floor);
        assert!(last.color[3] < 1.0);
    }

    #[test]
    fn notes_stay_inside_the_drift_range() {
        let scene = Scene::new();
        for item in scene.draw_items(57.0) {
            if item.mesh == MeshId::Note {
                let p = item.model.col(3).truncate();
                assert!(p.z.abs() <= 100.0 + 1.0e-3);
                assert!(p.y.abs() >= 0.15 - 1.0e-3);
            }
        }
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        let g = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(g[1] > 0.99 && g[0] < 0.01 && g[2] < 0.01);
    }
}
