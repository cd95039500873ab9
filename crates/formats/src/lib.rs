pub mod document;
pub mod geometry;

pub use document::*;
pub use geometry::*;
