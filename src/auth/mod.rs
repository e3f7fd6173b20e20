// Bearer token verification and permission checks.
//
// Tokens are issued by an external identity provider; this module only
// verifies them against the provider's published signing keys.

pub mod claims;
pub mod error;
pub mod gate;
pub mod header;
pub mod jwks;
pub mod permission;

pub use claims::Claims;
pub use error::AuthError;
pub use gate::AuthGate;
pub use header::bearer_token;
pub use jwks::{Jwk, JwkSet, KeySource, RemoteJwks, StaticKeys};
pub use permission::Permission;
