//! Access resolver
//!
//! Resolves a user's effective role at a resource with the following
//! precedence (highest to lowest):
//! 1. Global super-admin flag
//! 2. Ownership of the organization at the root of the chain
//! 3. Outermost existing ancestor membership, if Manager or Owner
//! 4. Most specific membership in the chain (current scope, then ancestors)
//!
//! A user with no membership anywhere in the chain is forbidden.

use crate::access::chain::{AncestorChain, MembershipLevel, ProjectKey};
use crate::access::types::{AccessResult, ResolutionPath, Role, ScopeKind};
use crate::directory::{Directory, Membership, SharedDirectory};
use crate::error::{AccessError, StoreError};
use std::sync::Arc;
use tracing::{debug, trace};

/// Access resolver
///
/// Stateless apart from the directory handle; every call is a fresh read.
#[derive(Clone)]
pub struct AccessResolver {
    directory: SharedDirectory,
}

impl AccessResolver {
    pub fn new(directory: SharedDirectory) -> Self {
        Self { directory }
    }

    pub fn from_directory<D: Directory + 'static>(directory: D) -> Self {
        Self::new(Arc::new(directory))
    }

    pub fn directory(&self) -> &SharedDirectory {
        &self.directory
    }

    /// Resolve access for a scope given by name
    ///
    /// The super-admin bypass is checked before the scope name is validated,
    /// so a super admin never sees `InvalidArgument` or `NotFound`.
    pub async fn resolve_access(
        &self,
        scope_kind: &str,
        resource_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        debug!(scope = scope_kind, resource = resource_id, user = user_id, "Resolving access");

        if self.is_super_admin(user_id).await? {
            // Unknown scope names still get a typed result; organization is the outermost scope.
            let scope = ScopeKind::try_parse(scope_kind).unwrap_or(ScopeKind::Organization);
            debug!(user = user_id, "Super admin bypass");
            return Ok(AccessResult::super_admin(user_id, scope, resource_id));
        }

        let scope: ScopeKind = scope_kind.parse()?;
        self.dispatch(scope, resource_id, user_id).await
    }

    /// Resolve access for a typed scope
    pub async fn resolve(
        &self,
        scope: ScopeKind,
        resource_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        if let Some(result) = self.global_bypass(scope, resource_id, user_id).await? {
            return Ok(result);
        }
        self.dispatch(scope, resource_id, user_id).await
    }

    pub async fn resolve_organization_access(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        self.resolve(ScopeKind::Organization, organization_id, user_id)
            .await
    }

    pub async fn resolve_workspace_access(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        self.resolve(ScopeKind::Workspace, workspace_id, user_id)
            .await
    }

    pub async fn resolve_project_access(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        self.resolve(ScopeKind::Project, project_id, user_id).await
    }

    /// Resolve project access by slug; the result carries the project's id
    ///
    /// A super admin gets the project's id when the slug resolves and the slug
    /// itself otherwise, so the bypass still never fails on a missing project.
    pub async fn resolve_project_access_by_slug(
        &self,
        slug: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        if self.is_super_admin(user_id).await? {
            let project = self.directory.project_by_slug(slug).await?;
            let scope_id = project.as_ref().map_or(slug, |p| p.id.as_str());
            debug!(user = user_id, slug, "Super admin bypass");
            return Ok(AccessResult::super_admin(
                user_id,
                ScopeKind::Project,
                scope_id,
            ));
        }
        let chain = AncestorChain::load_project(self.directory.as_ref(), ProjectKey::Slug(slug))
            .await?;
        self.evaluate(chain, user_id).await
    }

    pub async fn resolve_task_access(
        &self,
        task_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        self.resolve(ScopeKind::Task, task_id, user_id).await
    }

    /// Shared precondition: the super-admin result if the user carries the flag
    async fn global_bypass(
        &self,
        scope: ScopeKind,
        resource_id: &str,
        user_id: &str,
    ) -> Result<Option<AccessResult>, AccessError> {
        if self.is_super_admin(user_id).await? {
            debug!(user = user_id, scope = %scope, "Super admin bypass");
            return Ok(Some(AccessResult::super_admin(user_id, scope, resource_id)));
        }
        Ok(None)
    }

    /// Unknown users are ordinary users
    async fn is_super_admin(&self, user_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .directory
            .user(user_id)
            .await?
            .is_some_and(|user| user.is_super_admin()))
    }

    /// Load the chain for a scope and evaluate it; assumes the bypass has run
    async fn dispatch(
        &self,
        scope: ScopeKind,
        resource_id: &str,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        let directory = self.directory.as_ref();
        let chain = match scope {
            ScopeKind::Organization => {
                AncestorChain::load_organization(directory, resource_id).await?
            }
            ScopeKind::Workspace => AncestorChain::load_workspace(directory, resource_id).await?,
            ScopeKind::Project => {
                AncestorChain::load_project(directory, ProjectKey::Id(resource_id)).await?
            }
            ScopeKind::Task => AncestorChain::load_task(directory, resource_id).await?,
        };
        self.evaluate(chain, user_id).await
    }

    /// Owner bypass, early elevation, then most-specific-wins
    async fn evaluate(
        &self,
        chain: AncestorChain,
        user_id: &str,
    ) -> Result<AccessResult, AccessError> {
        let scope = chain.scope;
        let scope_id = chain.scope_id.as_str();

        if chain.is_owned_by(user_id) {
            debug!(user = user_id, scope = %scope, id = scope_id, "Organization owner bypass");
            return Ok(AccessResult::with_role(
                user_id,
                scope,
                scope_id,
                Role::Owner,
                ResolutionPath::OwnerBypass,
            ));
        }

        let mut levels = chain.membership_levels();
        let current = levels.pop();

        let mut held: Vec<(ScopeKind, Option<Membership>)> = Vec::with_capacity(levels.len() + 1);
        for level in &levels {
            held.push(self.membership(level, user_id).await?);
        }

        // Only the outermost existing ancestor membership can elevate early
        if let Some((level, membership)) = held.iter().find_map(|(l, m)| m.map(|m| (*l, m)))
            && membership.role.is_elevated()
        {
            debug!(user = user_id, scope = %scope, id = scope_id, level = %level, role = %membership.role, "Elevated by ancestor membership");
            return Ok(AccessResult::with_role(
                user_id,
                scope,
                scope_id,
                membership.role,
                ResolutionPath::EarlyElevated { level },
            ));
        }

        if let Some(level) = &current {
            held.push(self.membership(level, user_id).await?);
        }

        let Some((level, role)) = effective_role(&held) else {
            debug!(user = user_id, scope = %scope, id = scope_id, "No membership in chain");
            return Err(AccessError::forbidden(user_id, scope, scope_id));
        };

        debug!(user = user_id, scope = %scope, id = scope_id, level = %level, role = %role, "Resolved effective role");
        Ok(AccessResult::with_role(
            user_id,
            scope,
            scope_id,
            role,
            ResolutionPath::EffectiveRole { level },
        ))
    }

    async fn membership(
        &self,
        level: &MembershipLevel,
        user_id: &str,
    ) -> Result<(ScopeKind, Option<Membership>), StoreError> {
        let membership = match level {
            MembershipLevel::Organization(id) => {
                self.directory.organization_member(user_id, id).await?
            }
            MembershipLevel::Workspace(id) => self.directory.workspace_member(user_id, id).await?,
            MembershipLevel::Project(id) => self.directory.project_member(user_id, id).await?,
        };
        trace!(user = user_id, level = %level.scope(), id = level.scope_id(), role = ?membership.map(|m| m.role), "Membership lookup");
        Ok((level.scope(), membership))
    }
}

/// Most specific membership wins; `held` is ordered outermost first
fn effective_role(held: &[(ScopeKind, Option<Membership>)]) -> Option<(ScopeKind, Role)> {
    held.iter()
        .rev()
        .find_map(|(level, membership)| membership.map(|m| (*level, m.role)))
}
