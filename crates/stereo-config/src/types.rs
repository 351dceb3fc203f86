use glam::Vec3;
use serde::{Deserialize, Serialize};
use stereo_camera::FocusMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub focus: FocusConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            focus: FocusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        // 16:9, matches the side-by-side split of most 3D displays.
        Self {
            width: 960,
            height: 540,
            title: "Stereoscopic Rendering".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Initial eye point (meters).
    #[serde(with = "vec3_serde")]
    pub eye: Vec3,
    /// Initial center of interest (meters).
    #[serde(with = "vec3_serde")]
    pub center: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Eye separation used by the modes that leave separation to the app.
    pub eye_separation: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.2, 1.3, -11.5),
            center: Vec3::new(0.5, 1.5, -0.1),
            fov_y_degrees: 60.0,
            eye_separation: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Active focal-length policy.
    pub mode: FocusMode,
    /// Convergence depth as a fraction of the surveyed range, in (0, 1].
    pub depth_fraction: f32,
    /// Maximum focal-length change per second.
    pub speed: f32,
    /// Focal-length clamp range.
    pub min_focal_length: f32,
    pub max_focal_length: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            mode: FocusMode::AutoDepth,
            depth_fraction: 1.0,
            speed: 0.05,
            min_focal_length: 0.1,
            max_focal_length: 5.0,
        }
    }
}

// Serde helper so Vec3 lands in TOML as a plain `[x, y, z]` array.
mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(d)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(back.window.width, config.window.width);
        assert_eq!(back.camera.eye, config.camera.eye);
        assert_eq!(back.focus.mode, config.focus.mode);
        assert_eq!(back.focus.depth_fraction, config.focus.depth_fraction);
    }
}
