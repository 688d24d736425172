// Domain value objects
pub mod date_range;
pub mod language;

pub use date_range::*;
pub use language::*;
