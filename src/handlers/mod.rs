// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token + one required permission).
// The permission check happens in middleware::auth before a protected
// handler or its body extractor runs.
pub mod public;
pub mod protected;
