use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        #[default]
        Employee => "employee",
        Manager => "manager",
        Admin => "admin",
    }
}

/// The authenticated identity a use case runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub tenant_id: i64,
}

impl Actor {
    pub fn new(id: i64, role: Role, tenant_id: i64) -> Self {
        Self {
            id,
            role,
            tenant_id,
        }
    }

    pub fn employee(id: i64, tenant_id: i64) -> Self {
        Self::new(id, Role::Employee, tenant_id)
    }

    pub fn manager(id: i64, tenant_id: i64) -> Self {
        Self::new(id, Role::Manager, tenant_id)
    }

    pub fn admin(id: i64, tenant_id: i64) -> Self {
        Self::new(id, Role::Admin, tenant_id)
    }
}
