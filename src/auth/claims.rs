use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthError, Permission};

/// Verified token payload handed to protected handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Absent when the identity provider did not add RBAC permissions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn require(&self, permission: Permission) -> Result<(), AuthError> {
        let granted = self.permissions.as_ref().ok_or(AuthError::PermissionsMissing)?;

        if granted.iter().any(|p| p == permission.as_str()) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied(permission.as_str().to_string()))
        }
    }
}
