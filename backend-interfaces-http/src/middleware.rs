pub mod lang_path;
pub mod request_timeout;

pub use lang_path::*;
pub use request_timeout::*;
