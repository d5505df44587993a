//! Public types for the roles API
use serde::{Deserialize, Serialize};

use crate::roles::RoleDefinition;

#[derive(Serialize, Deserialize)]
pub struct RolesResponse {
    pub roles: Vec<RoleDefinition>,
}

/// Body for add and update. `original_name` identifies the role being
/// edited when its display name changes.
#[derive(Deserialize)]
pub struct RoleRequest {
    #[serde(flatten)]
    pub role: RoleDefinition,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRoleQuery {
    #[serde(default)]
    pub role_name: Option<String>,
}

/// JSON form of a delete request, as sent by the web client
#[derive(Deserialize)]
pub struct DeleteRoleBody {
    #[serde(alias = "role_name")]
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct RoleMutationResponse {
    pub status: String,
    pub role: RoleDefinition,
}

impl RoleMutationResponse {
    pub fn ok(role: RoleDefinition) -> Self {
        Self {
            status: "ok".to_string(),
            role,
        }
    }
}
