pub mod enums;
pub mod models;
pub mod summary;

pub use enums::*;
pub use models::*;
pub use summary::*;
