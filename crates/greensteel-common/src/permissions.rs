//! Company member permissions.
//!
//! The auth service stores a user's permissions twice: as four `can_*` boolean columns and
//! as a JSON document in `users.permissions`. The boolean columns are authoritative.
//! Company admins hold every flag; ordinary members get the reporting/data defaults.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Permissions a user holds within their company.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UserPermissions: u8 {
        /// Invite, edit and deactivate other users of the company
        const MANAGE_USERS = 1 << 0;
        /// View emission reports
        const VIEW_REPORTS = 1 << 1;
        /// Edit installation and activity data
        const EDIT_DATA    = 1 << 2;
        /// Export reports and raw data
        const EXPORT_DATA  = 1 << 3;
    }
}

impl UserPermissions {
    /// Default permissions for a newly registered member.
    pub fn default_member() -> Self {
        Self::VIEW_REPORTS | Self::EDIT_DATA | Self::EXPORT_DATA
    }

    /// Permissions granted to a company administrator.
    pub fn company_admin() -> Self {
        Self::all()
    }

    /// The `users.permissions` document for this set.
    pub fn to_document(self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PermissionFlags::from(self))
    }
}

impl Default for UserPermissions {
    fn default() -> Self {
        Self::default_member()
    }
}

/// Boolean view of [`UserPermissions`]: the `can_*` columns and the JSON document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
    pub can_manage_users: bool,
    pub can_view_reports: bool,
    pub can_edit_data: bool,
    pub can_export_data: bool,
}

impl From<UserPermissions> for PermissionFlags {
    fn from(p: UserPermissions) -> Self {
        Self {
            can_manage_users: p.contains(UserPermissions::MANAGE_USERS),
            can_view_reports: p.contains(UserPermissions::VIEW_REPORTS),
            can_edit_data: p.contains(UserPermissions::EDIT_DATA),
            can_export_data: p.contains(UserPermissions::EXPORT_DATA),
        }
    }
}

impl From<PermissionFlags> for UserPermissions {
    fn from(f: PermissionFlags) -> Self {
        let mut p = UserPermissions::empty();
        p.set(UserPermissions::MANAGE_USERS, f.can_manage_users);
        p.set(UserPermissions::VIEW_REPORTS, f.can_view_reports);
        p.set(UserPermissions::EDIT_DATA, f.can_edit_data);
        p.set(UserPermissions::EXPORT_DATA, f.can_export_data);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_member_matches_column_defaults() {
        // can_manage_users DEFAULT FALSE, the other three DEFAULT TRUE
        let flags = PermissionFlags::from(UserPermissions::default());
        assert!(!flags.can_manage_users);
        assert!(flags.can_view_reports && flags.can_edit_data && flags.can_export_data);
    }

    #[test]
    fn test_company_admin_has_everything() {
        let flags = PermissionFlags::from(UserPermissions::company_admin());
        assert!(flags.can_manage_users);
        assert!(flags.can_view_reports);
        assert!(flags.can_edit_data);
        assert!(flags.can_export_data);
    }

    #[test]
    fn test_flags_convert_back() {
        let flags = PermissionFlags {
            can_manage_users: false,
            can_view_reports: true,
            can_edit_data: false,
            can_export_data: true,
        };
        let p = UserPermissions::from(flags);
        assert_eq!(p, UserPermissions::VIEW_REPORTS | UserPermissions::EXPORT_DATA);
        assert_eq!(PermissionFlags::from(p), flags);
    }

    #[test]
    fn test_document_is_json_object_of_flags() {
        let doc = UserPermissions::default_member().to_document().unwrap();
        let json: serde_json::Value = serde_json::from_str(&doc).unwrap();
        assert_eq!(json["can_manage_users"], false);
        assert_eq!(json["can_export_data"], true);

        let back: PermissionFlags = serde_json::from_str(&doc).unwrap();
        assert_eq!(UserPermissions::from(back), UserPermissions::default_member());
    }
}
