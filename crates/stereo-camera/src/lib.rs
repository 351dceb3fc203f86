pub mod camera;
pub mod focus;
pub mod stereo;

pub use camera::Camera;
pub use focus::{AutoFocuser, FocusMode};
pub use stereo::{Eye, EyeMatrices, FrameMatrices, StereoCamera, CONVERGENCE_RATIO};
