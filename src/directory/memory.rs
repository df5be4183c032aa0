//! In-memory directory
//!
//! A [`Directory`] backed by maps behind a `tokio` read/write lock. Used by the
//! CLI (built from a seed document) and as the collaborator fake in tests.
//! The mutation helpers stand in for the services that own the data.

use crate::access::{GlobalRole, Role};
use crate::directory::seed::DirectorySeed;
use crate::directory::{
    Directory, Membership, OrganizationRecord, ProjectRecord, TaskRecord, UserRecord,
    WorkspaceRecord,
};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

type MemberKey = (String, String);

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    organizations: HashMap<String, OrganizationRecord>,
    workspaces: HashMap<String, WorkspaceRecord>,
    projects: HashMap<String, ProjectRecord>,
    project_slugs: HashMap<String, String>,
    tasks: HashMap<String, TaskRecord>,
    organization_members: HashMap<MemberKey, Role>,
    workspace_members: HashMap<MemberKey, Role>,
    project_members: HashMap<MemberKey, Role>,
}

/// Entity counts, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct DirectoryStats {
    pub users: usize,
    pub organizations: usize,
    pub workspaces: usize,
    pub projects: usize,
    pub tasks: usize,
    pub memberships: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    tables: RwLock<Tables>,
}

fn key(user_id: &str, scope_id: &str) -> MemberKey {
    (user_id.to_string(), scope_id.to_string())
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from an already validated seed
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let mut tables = Tables::default();

        for user in seed.users {
            tables.users.insert(user.id.clone(), user);
        }
        for org in seed.organizations {
            tables.organizations.insert(org.id.clone(), org);
        }
        for ws in seed.workspaces {
            tables.workspaces.insert(ws.id.clone(), ws);
        }
        for project in seed.projects {
            tables
                .project_slugs
                .insert(project.slug.clone(), project.id.clone());
            tables.projects.insert(project.id.clone(), project);
        }
        for task in seed.tasks {
            tables.tasks.insert(task.id.clone(), task);
        }
        for m in seed.organization_members {
            tables
                .organization_members
                .insert(key(&m.user_id, &m.scope_id), m.role);
        }
        for m in seed.workspace_members {
            tables
                .workspace_members
                .insert(key(&m.user_id, &m.scope_id), m.role);
        }
        for m in seed.project_members {
            tables
                .project_members
                .insert(key(&m.user_id, &m.scope_id), m.role);
        }

        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn stats(&self) -> DirectoryStats {
        let t = self.tables.read().await;
        DirectoryStats {
            users: t.users.len(),
            organizations: t.organizations.len(),
            workspaces: t.workspaces.len(),
            projects: t.projects.len(),
            tasks: t.tasks.len(),
            memberships: t.organization_members.len()
                + t.workspace_members.len()
                + t.project_members.len(),
        }
    }

    pub async fn insert_user(&self, id: &str, super_admin: bool) {
        let global_role = if super_admin {
            GlobalRole::SuperAdmin
        } else {
            GlobalRole::User
        };
        self.tables.write().await.users.insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                global_role,
            },
        );
    }

    pub async fn insert_organization(&self, id: &str, owner_id: &str) {
        self.tables.write().await.organizations.insert(
            id.to_string(),
            OrganizationRecord {
                id: id.to_string(),
                owner_id: owner_id.to_string(),
            },
        );
    }

    pub async fn insert_workspace(&self, id: &str, organization_id: &str) {
        self.tables.write().await.workspaces.insert(
            id.to_string(),
            WorkspaceRecord {
                id: id.to_string(),
                organization_id: organization_id.to_string(),
            },
        );
    }

    /// Insert or replace a project, keeping the slug index in step
    pub async fn insert_project(&self, id: &str, slug: &str, workspace_id: &str) {
        let mut t = self.tables.write().await;
        if let Some(previous) = t.projects.get(id).map(|p| p.slug.clone()) {
            t.project_slugs.remove(&previous);
        }
        t.project_slugs.insert(slug.to_string(), id.to_string());
        t.projects.insert(
            id.to_string(),
            ProjectRecord {
                id: id.to_string(),
                slug: slug.to_string(),
                workspace_id: workspace_id.to_string(),
            },
        );
    }

    pub async fn insert_task(&self, id: &str, project_id: &str) {
        self.tables.write().await.tasks.insert(
            id.to_string(),
            TaskRecord {
                id: id.to_string(),
                project_id: project_id.to_string(),
            },
        );
    }

    pub async fn insert_organization_member(&self, user_id: &str, organization_id: &str, role: Role) {
        self.tables
            .write()
            .await
            .organization_members
            .insert(key(user_id, organization_id), role);
    }

    pub async fn insert_workspace_member(&self, user_id: &str, workspace_id: &str, role: Role) {
        self.tables
            .write()
            .await
            .workspace_members
            .insert(key(user_id, workspace_id), role);
    }

    pub async fn insert_project_member(&self, user_id: &str, project_id: &str, role: Role) {
        self.tables
            .write()
            .await
            .project_members
            .insert(key(user_id, project_id), role);
    }

    pub async fn remove_organization_member(&self, user_id: &str, organization_id: &str) -> bool {
        self.tables
            .write()
            .await
            .organization_members
            .remove(&key(user_id, organization_id))
            .is_some()
    }

    pub async fn remove_workspace_member(&self, user_id: &str, workspace_id: &str) -> bool {
        self.tables
            .write()
            .await
            .workspace_members
            .remove(&key(user_id, workspace_id))
            .is_some()
    }

    pub async fn remove_project_member(&self, user_id: &str, project_id: &str) -> bool {
        self.tables
            .write()
            .await
            .project_members
            .remove(&key(user_id, project_id))
            .is_some()
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn user(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn organization(&self, id: &str) -> StoreResult<Option<OrganizationRecord>> {
        Ok(self.tables.read().await.organizations.get(id).cloned())
    }

    async fn workspace(&self, id: &str) -> StoreResult<Option<WorkspaceRecord>> {
        Ok(self.tables.read().await.workspaces.get(id).cloned())
    }

    async fn project(&self, id: &str) -> StoreResult<Option<ProjectRecord>> {
        Ok(self.tables.read().await.projects.get(id).cloned())
    }

    async fn project_by_slug(&self, slug: &str) -> StoreResult<Option<ProjectRecord>> {
        let t = self.tables.read().await;
        Ok(t
            .project_slugs
            .get(slug)
            .and_then(|id| t.projects.get(id))
            .cloned())
    }

    async fn task(&self, id: &str) -> StoreResult<Option<TaskRecord>> {
        Ok(self.tables.read().await.tasks.get(id).cloned())
    }

    async fn organization_member(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> StoreResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .organization_members
            .get(&key(user_id, organization_id))
            .map(|role| Membership::from(*role)))
    }

    async fn workspace_member(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> StoreResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .workspace_members
            .get(&key(user_id, workspace_id))
            .map(|role| Membership::from(*role)))
    }

    async fn project_member(
        &self,
        user_id: &str,
        project_id: &str,
    ) -> StoreResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .project_members
            .get(&key(user_id, project_id))
            .map(|role| Membership::from(*role)))
    }
}
