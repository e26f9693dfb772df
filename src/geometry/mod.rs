pub mod hit_testing;
pub mod transform;

pub use hit_testing::{Edge, EdgeInsets};
pub use transform::ViewTransform;
