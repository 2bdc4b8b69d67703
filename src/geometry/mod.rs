pub mod sphere;
pub mod surface;
pub mod tessellate;

pub use sphere::generate_sphere;
pub use surface::{SurfaceParams, surface_point};
pub use tessellate::{DEFAULT_STEP, SurfaceMesh, map_linear, tessellate};
