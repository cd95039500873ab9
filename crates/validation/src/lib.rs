pub mod lint;
pub mod locate;

pub use lint::*;
pub use locate::{PathSegment, line_of};
