pub mod almanax_mapper;
pub mod sqlite_repo;

pub use sqlite_repo::*;
