//! Access resolution types
//!
//! Core types shared by the resolver, the directory and callers.

use crate::error::AccessError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Membership role, ordered by ascending privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Viewer,
    Member,
    Manager,
    Owner,
}

impl Role {
    /// Get the role name as it appears in results
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Member => "MEMBER",
            Role::Manager => "MANAGER",
            Role::Owner => "OWNER",
        }
    }

    /// Manager and Owner are elevated; Viewer and Member are not
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Role::Manager | Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global (instance-wide) role carried by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRole {
    #[default]
    User,
    SuperAdmin,
}

/// Tenancy level a resource lives at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Organization,
    Workspace,
    Project,
    Task,
}

impl ScopeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Organization => "organization",
            ScopeKind::Workspace => "workspace",
            ScopeKind::Project => "project",
            ScopeKind::Task => "task",
        }
    }

    /// Try to parse a scope kind from a string
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "organization" => Some(ScopeKind::Organization),
            "workspace" => Some(ScopeKind::Workspace),
            "project" => Some(ScopeKind::Project),
            "task" => Some(ScopeKind::Task),
            _ => None,
        }
    }

    /// Get all scope kinds, outermost first
    pub fn all() -> &'static [ScopeKind] {
        &[
            ScopeKind::Organization,
            ScopeKind::Workspace,
            ScopeKind::Project,
            ScopeKind::Task,
        ]
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScopeKind {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScopeKind::try_parse(s).ok_or_else(|| AccessError::invalid_scope(s))
    }
}

/// Role reported in an [`AccessResult`]
///
/// Serializes as a bare string: `"SUPER_ADMIN"` or one of the membership role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedRole {
    SuperAdmin,
    Role(Role),
}

impl ResolvedRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResolvedRole::SuperAdmin => "SUPER_ADMIN",
            ResolvedRole::Role(role) => role.as_str(),
        }
    }
}

impl fmt::Display for ResolvedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Role> for ResolvedRole {
    fn from(role: Role) -> Self {
        ResolvedRole::Role(role)
    }
}

impl Serialize for ResolvedRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which terminal branch of the resolution produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionPath {
    /// Caller carries the global super-admin flag
    SuperAdminBypass,
    /// Caller owns the organization at the root of the chain
    OwnerBypass,
    /// An ancestor membership was Manager or Owner
    EarlyElevated { level: ScopeKind },
    /// Most specific membership found in the chain
    EffectiveRole { level: ScopeKind },
}

/// Outcome of a successful resolution
///
/// `can_change` always equals `is_elevated`; both are derived from the same role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub is_elevated: bool,
    pub role: ResolvedRole,
    pub can_change: bool,
    pub user_id: String,
    pub scope_id: String,
    pub scope_type: ScopeKind,
    pub is_super_admin: bool,
    pub path: ResolutionPath,
}

impl AccessResult {
    pub(crate) fn super_admin(user_id: &str, scope_type: ScopeKind, scope_id: &str) -> Self {
        Self {
            is_elevated: true,
            role: ResolvedRole::SuperAdmin,
            can_change: true,
            user_id: user_id.to_string(),
            scope_id: scope_id.to_string(),
            scope_type,
            is_super_admin: true,
            path: ResolutionPath::SuperAdminBypass,
        }
    }

    pub(crate) fn with_role(
        user_id: &str,
        scope_type: ScopeKind,
        scope_id: &str,
        role: Role,
        path: ResolutionPath,
    ) -> Self {
        let elevated = role.is_elevated();
        Self {
            is_elevated: elevated,
            role: role.into(),
            can_change: elevated,
            user_id: user_id.to_string(),
            scope_id: scope_id.to_string(),
            scope_type,
            is_super_admin: false,
            path,
        }
    }

    /// Membership role behind this result, or `None` for a super-admin bypass
    pub fn membership_role(&self) -> Option<Role> {
        match self.role {
            ResolvedRole::SuperAdmin => None,
            ResolvedRole::Role(role) => Some(role),
        }
    }

    /// Require change capability, for callers that enforce on the result
    pub fn require_change(&self) -> Result<&Self, AccessError> {
        if self.can_change {
            Ok(self)
        } else {
            Err(AccessError::forbidden(
                &self.user_id,
                self.scope_type,
                &self.scope_id,
            ))
        }
    }
}
