use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Employee,
    Employer,
    Both,
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Employer => "employer",
            UserRole::Both => "both",
            UserRole::Admin => "admin",
        }
    }

    /// Roles allowed to browse, match and apply to jobs.
    pub fn can_apply(&self) -> bool {
        matches!(self, UserRole::Employee | UserRole::Both)
    }

    /// Roles allowed to post jobs and dispose of applications.
    pub fn can_post(&self) -> bool {
        matches!(self, UserRole::Employer | UserRole::Both | UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub verified: bool,
    pub barangay: String,
    pub skills: Vec<String>,
    pub sms_opt_in: Option<bool>, // Database has DEFAULT FALSE, can be NULL

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn wants_sms(&self) -> bool {
        self.sms_opt_in.unwrap_or(false) && self.phone.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        assert!(UserRole::Employee.can_apply());
        assert!(UserRole::Both.can_apply());
        assert!(!UserRole::Employer.can_apply());
        assert!(!UserRole::Admin.can_apply());

        assert!(UserRole::Employer.can_post());
        assert!(UserRole::Both.can_post());
        assert!(UserRole::Admin.can_post());
        assert!(!UserRole::Employee.can_post());
    }
}
