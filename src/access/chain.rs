//! Ancestor chains
//!
//! A chain is the resolved resource plus every ancestor up to its
//! organization, loaded one explicit lookup per level.

use crate::access::types::ScopeKind;
use crate::directory::{Directory, OrganizationRecord, ProjectRecord};
use crate::error::AccessError;
use tracing::trace;

/// Key used to look up a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKey<'a> {
    Id(&'a str),
    Slug(&'a str),
}

impl ProjectKey<'_> {
    fn as_str(&self) -> &str {
        match self {
            ProjectKey::Id(key) | ProjectKey::Slug(key) => key,
        }
    }
}

/// A membership relation applicable to a scope, keyed by the scope's id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipLevel {
    Organization(String),
    Workspace(String),
    Project(String),
}

impl MembershipLevel {
    pub fn scope(&self) -> ScopeKind {
        match self {
            MembershipLevel::Organization(_) => ScopeKind::Organization,
            MembershipLevel::Workspace(_) => ScopeKind::Workspace,
            MembershipLevel::Project(_) => ScopeKind::Project,
        }
    }

    pub fn scope_id(&self) -> &str {
        match self {
            MembershipLevel::Organization(id)
            | MembershipLevel::Workspace(id)
            | MembershipLevel::Project(id) => id,
        }
    }
}

/// Resolved resource and its ancestors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    pub scope: ScopeKind,
    /// Canonical id of the resolved resource
    pub scope_id: String,
    pub organization: OrganizationRecord,
    pub workspace_id: Option<String>,
    pub project_id: Option<String>,
}

impl AncestorChain {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.organization.owner_id == user_id
    }

    /// Membership levels consulted for this scope, outermost first
    ///
    /// The last entry is the current-scope level. A task has no membership
    /// relation of its own, so its current level is its project's.
    pub fn membership_levels(&self) -> Vec<MembershipLevel> {
        let mut levels = vec![MembershipLevel::Organization(self.organization.id.clone())];
        if let Some(workspace_id) = &self.workspace_id {
            levels.push(MembershipLevel::Workspace(workspace_id.clone()));
        }
        if let Some(project_id) = &self.project_id {
            levels.push(MembershipLevel::Project(project_id.clone()));
        }
        levels
    }

    pub async fn load_organization(
        directory: &dyn Directory,
        id: &str,
    ) -> Result<Self, AccessError> {
        let organization = fetch_organization(directory, ScopeKind::Organization, id, id).await?;
        Ok(Self {
            scope: ScopeKind::Organization,
            scope_id: organization.id.clone(),
            organization,
            workspace_id: None,
            project_id: None,
        })
    }

    pub async fn load_workspace(directory: &dyn Directory, id: &str) -> Result<Self, AccessError> {
        let workspace = directory
            .workspace(id)
            .await?
            .ok_or_else(|| AccessError::not_found(ScopeKind::Workspace, id))?;
        trace!(workspace = %workspace.id, organization = %workspace.organization_id, "Loaded workspace");

        let organization =
            fetch_organization(directory, ScopeKind::Workspace, id, &workspace.organization_id)
                .await?;
        Ok(Self {
            scope: ScopeKind::Workspace,
            scope_id: workspace.id.clone(),
            organization,
            workspace_id: Some(workspace.id),
            project_id: None,
        })
    }

    pub async fn load_project(
        directory: &dyn Directory,
        key: ProjectKey<'_>,
    ) -> Result<Self, AccessError> {
        let project = fetch_project(directory, key).await?;
        let mut chain = Self::load_workspace(directory, &project.workspace_id)
            .await
            .map_err(|e| reattribute(e, ScopeKind::Project, key.as_str()))?;
        chain.scope = ScopeKind::Project;
        chain.scope_id = project.id.clone();
        chain.project_id = Some(project.id);
        Ok(chain)
    }

    pub async fn load_task(directory: &dyn Directory, id: &str) -> Result<Self, AccessError> {
        let task = directory
            .task(id)
            .await?
            .ok_or_else(|| AccessError::not_found(ScopeKind::Task, id))?;
        trace!(task = %task.id, project = %task.project_id, "Loaded task");

        let mut chain = Self::load_project(directory, ProjectKey::Id(&task.project_id))
            .await
            .map_err(|e| reattribute(e, ScopeKind::Task, id))?;
        chain.scope = ScopeKind::Task;
        chain.scope_id = task.id;
        Ok(chain)
    }
}

async fn fetch_project(
    directory: &dyn Directory,
    key: ProjectKey<'_>,
) -> Result<ProjectRecord, AccessError> {
    let project = match key {
        ProjectKey::Id(id) => directory.project(id).await?,
        ProjectKey::Slug(slug) => directory.project_by_slug(slug).await?,
    };
    let project =
        project.ok_or_else(|| AccessError::not_found(ScopeKind::Project, key.as_str()))?;
    trace!(project = %project.id, slug = %project.slug, workspace = %project.workspace_id, "Loaded project");
    Ok(project)
}

async fn fetch_organization(
    directory: &dyn Directory,
    scope: ScopeKind,
    scope_id: &str,
    organization_id: &str,
) -> Result<OrganizationRecord, AccessError> {
    let organization = directory
        .organization(organization_id)
        .await?
        .ok_or_else(|| AccessError::not_found(scope, scope_id))?;
    trace!(organization = %organization.id, "Loaded organization");
    Ok(organization)
}

/// A missing ancestor makes the requested resource unresolvable
fn reattribute(error: AccessError, scope: ScopeKind, id: &str) -> AccessError {
    match error {
        AccessError::NotFound { .. } => AccessError::not_found(scope, id),
        other => other,
    }
}
