pub mod almanax_commands;
pub mod import_commands;
pub mod reindex_commands;
