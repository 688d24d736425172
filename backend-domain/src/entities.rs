// Domain entities
pub mod almanax;
pub mod bonus_listing;
pub mod model;
pub mod reconcile;
pub mod release;

pub use almanax::*;
pub use bonus_listing::*;
pub use model::*;
pub use reconcile::*;
pub use release::*;
