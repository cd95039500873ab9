pub mod augment;
pub mod editor;
pub mod events;
pub mod search;
pub mod session;

pub use augment::*;
pub use editor::*;
pub use events::*;
pub use search::*;
pub use session::*;
