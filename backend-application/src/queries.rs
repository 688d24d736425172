pub mod almanax_queries;
pub mod bonus_queries;
