//! Scene graph, camera, and picking

mod camera;
mod picking;
mod scene;

pub use camera::*;
pub use picking::*;
pub use scene::*;
