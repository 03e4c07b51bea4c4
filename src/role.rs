//! Role router: maps each account role to the root of its dashboard.

use serde::{Deserialize, Serialize};

/// Account roles known to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    OrganizationAdmin,
    Agent,
}

/// Dashboard root for super admins.
pub const ADMIN_DASHBOARD_PATH: &str = "/admin";

/// Dashboard root for organization admins.
pub const ORGANIZATION_DASHBOARD_PATH: &str = "/organization";

/// Dashboard root for agents.
pub const AGENT_DASHBOARD_PATH: &str = "/agent";

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::OrganizationAdmin, Role::Agent];

    /// Parse the role string used by the backend. Unknown roles yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "super_admin" => Some(Role::SuperAdmin),
            "organization_admin" => Some(Role::OrganizationAdmin),
            "agent" => Some(Role::Agent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::OrganizationAdmin => "organization_admin",
            Role::Agent => "agent",
        }
    }

    /// Canonical dashboard root for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin => ADMIN_DASHBOARD_PATH,
            Role::OrganizationAdmin => ORGANIZATION_DASHBOARD_PATH,
            Role::Agent => AGENT_DASHBOARD_PATH,
        }
    }

    /// Path segment of the role-scoped login endpoint (`/{segment}/login`).
    pub fn login_segment(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "admin",
            Role::OrganizationAdmin => "organization",
            Role::Agent => "agent",
        }
    }

    pub fn from_login_segment(segment: &str) -> Option<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.login_segment() == segment)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
