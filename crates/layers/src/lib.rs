pub mod centroid;
pub mod layer;
pub mod overlay;
pub mod selection;

pub use centroid::*;
pub use layer::*;
pub use overlay::*;
pub use selection::*;
