pub mod almanax_handlers;
pub mod bonus_handlers;
pub mod ops_handlers;

pub use almanax_handlers::*;
pub use bonus_handlers::*;
pub use ops_handlers::*;
