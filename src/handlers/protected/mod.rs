// handlers/protected/mod.rs - endpoints behind the permission gate
//
// Each route is wrapped with middleware::require_permission for exactly one
// Permission; handlers can rely on verified Claims in the request extensions.

pub mod drinks;

pub use drinks::create as drink_create;
pub use drinks::delete as drink_delete;
pub use drinks::detail as drinks_detail;
pub use drinks::update as drink_update;
