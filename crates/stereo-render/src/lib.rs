pub mod depth;
pub mod mesh;
pub mod pipeline;
pub mod sbs;
pub mod scene;

pub use depth::DepthSampler;
pub use sbs::StereoRenderer;
pub use scene::Scene;
