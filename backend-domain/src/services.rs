// Pure domain services

pub mod bonus_projection;
pub mod search_limit;

pub use bonus_projection::*;
pub use search_limit::*;
