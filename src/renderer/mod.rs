pub mod camera;
pub mod gpu;
pub mod scene_buffers;

pub use camera::{Eye, StereoCamera, Trackball};
pub use gpu::{GpuState, MarkerUniform, SurfaceUniform};
