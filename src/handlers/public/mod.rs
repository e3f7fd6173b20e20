// handlers/public/mod.rs - endpoints that need no token

pub mod drinks;
pub mod system;

pub use drinks::list as drinks_list;
pub use system::{fallback, health, method_not_allowed, root};
