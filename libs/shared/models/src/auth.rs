use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles allowed to write appointment documents.
pub const APPOINTMENT_MANAGER_ROLES: &[&str] = &["admin", "receptionist", "doctor"];

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    pub fn can_manage_appointments(&self) -> bool {
        APPOINTMENT_MANAGER_ROLES.iter().any(|role| self.has_role(role))
    }
}
