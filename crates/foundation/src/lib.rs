pub mod ids;
pub mod lon_lat;

// Foundation crate: small, well-tested primitives only.
pub use ids::*;
pub use lon_lat::*;
