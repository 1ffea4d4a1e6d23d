//! User model — a member account belonging to one company.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

use crate::permissions::{PermissionFlags, UserPermissions};

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,

    /// Hyphenated UUID string
    pub uuid: String,

    /// Login name (unique)
    pub username: String,

    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Display name
    pub full_name: String,

    /// Owning company (`companies.id`)
    pub company_id: i32,

    #[sqlx(try_from = "String")]
    pub role: UserRole,

    /// JSON permission document as written by the auth service
    pub permissions: String,

    pub is_company_admin: bool,

    pub can_manage_users: bool,
    pub can_view_reports: bool,
    pub can_edit_data: bool,
    pub can_export_data: bool,

    pub is_active: bool,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Permissions from the `can_*` columns.
    pub fn permission_set(&self) -> UserPermissions {
        UserPermissions::from(self.permission_flags())
    }

    pub fn permission_flags(&self) -> PermissionFlags {
        PermissionFlags {
            can_manage_users: self.can_manage_users,
            can_view_reports: self.can_view_reports,
            can_edit_data: self.can_edit_data,
            can_export_data: self.can_export_data,
        }
    }
}

/// Role label stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `users.role` value other than `admin` or `user`.
#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Insert payload for a user registration.
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    pub uuid: Uuid,

    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username can only contain letters, numbers, underscores, and hyphens"
    ))]
    pub username: String,

    #[validate(length(min = 1, max = 255))]
    pub hashed_password: String,

    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    /// Must reference an existing company
    pub company_id: i32,

    pub role: UserRole,

    pub permissions: UserPermissions,

    pub is_company_admin: bool,

    pub is_active: bool,
}

static USERNAME_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
