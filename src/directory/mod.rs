//! Directory module
//!
//! Read interface to the collaborators that own users, the tenancy tree and
//! memberships. The resolver only ever reads through [`Directory`]; it never
//! mutates anything.

pub mod memory;
pub mod seed;

pub use memory::InMemoryDirectory;
pub use seed::DirectorySeed;

use crate::access::{GlobalRole, Role};
use crate::error::StoreResult;
// async_trait required for dyn-compatibility with Arc<dyn Directory>
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub global_role: GlobalRole,
}

impl UserRecord {
    pub fn is_super_admin(&self) -> bool {
        self.global_role == GlobalRole::SuperAdmin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrganizationRecord {
    pub id: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceRecord {
    pub id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub slug: String,
    pub workspace_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub project_id: String,
}

/// A user's standing at one scope; a record always carries a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub role: Role,
}

impl From<Role> for Membership {
    fn from(role: Role) -> Self {
        Self { role }
    }
}

/// Read-only lookups over users, resources and memberships
///
/// Resource lookups return `Ok(None)` when the resource does not exist;
/// membership lookups return `Ok(None)` when no relationship exists.
/// `Err` is reserved for upstream read failures.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;

    async fn organization(&self, id: &str) -> StoreResult<Option<OrganizationRecord>>;

    async fn workspace(&self, id: &str) -> StoreResult<Option<WorkspaceRecord>>;

    async fn project(&self, id: &str) -> StoreResult<Option<ProjectRecord>>;

    async fn project_by_slug(&self, slug: &str) -> StoreResult<Option<ProjectRecord>>;

    async fn task(&self, id: &str) -> StoreResult<Option<TaskRecord>>;

    async fn organization_member(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> StoreResult<Option<Membership>>;

    async fn workspace_member(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> StoreResult<Option<Membership>>;

    async fn project_member(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> StoreResult<Option<Membership>>;
}

/// Shared handle type for directories
pub type SharedDirectory = Arc<dyn Directory>;
