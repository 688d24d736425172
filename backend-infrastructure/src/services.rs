pub mod bonus_listing_service;
pub mod meili_service;
pub mod release_service;

pub use bonus_listing_service::*;
pub use meili_service::*;
pub use release_service::*;
