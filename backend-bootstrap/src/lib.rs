pub mod context;
pub mod lifecycle;

pub use context::AppContext;
pub use lifecycle::{
    ensure_completed, run_import, run_migrate, run_reindex, run_server, MigrateDirection,
};
