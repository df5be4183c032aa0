//! Directory seed documents
//!
//! A seed is a TOML document describing users, the tenancy tree and
//! memberships. It is validated for referential integrity before it is
//! turned into an [`InMemoryDirectory`](crate::directory::InMemoryDirectory).
//!
//! ```toml
//! [[users]]
//! id = "alice"
//! global_role = "SUPER_ADMIN"
//!
//! [[users]]
//! id = "bob"
//!
//! [[users]]
//! id = "carol"
//!
//! [[organizations]]
//! id = "acme"
//! owner_id = "bob"
//!
//! [[workspaces]]
//! id = "eng"
//! organization_id = "acme"
//!
//! [[projects]]
//! id = "p-42"
//! slug = "billing-api"
//! workspace_id = "eng"
//!
//! [[project_members]]
//! user_id = "carol"
//! project_id = "p-42"
//! role = "MEMBER"
//! ```

use crate::access::Role;
use crate::directory::{
    OrganizationRecord, ProjectRecord, TaskRecord, UserRecord, WorkspaceRecord,
};
use crate::error::SeedError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is valid")
});

/// Membership row; the scope column is named after its relation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberSeed {
    pub user_id: String,
    #[serde(alias = "organization_id", alias = "workspace_id", alias = "project_id")]
    pub scope_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DirectorySeed {
    pub users: Vec<UserRecord>,
    pub organizations: Vec<OrganizationRecord>,
    pub workspaces: Vec<WorkspaceRecord>,
    pub projects: Vec<ProjectRecord>,
    pub tasks: Vec<TaskRecord>,
    pub organization_members: Vec<MemberSeed>,
    pub workspace_members: Vec<MemberSeed>,
    pub project_members: Vec<MemberSeed>,
}

impl DirectorySeed {
    /// Parse and validate a seed from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self, SeedError> {
        let seed: DirectorySeed = toml::from_str(source)?;
        seed.validate()?;
        Ok(seed)
    }

    /// Read, parse and validate a seed file; `~` is expanded
    pub fn load(path: &str) -> Result<Self, SeedError> {
        let expanded = shellexpand::tilde(path);
        let source = std::fs::read_to_string(Path::new(expanded.as_ref()))?;
        let seed = Self::from_toml_str(&source)?;
        debug!(
            path = %expanded,
            organizations = seed.organizations.len(),
            projects = seed.projects.len(),
            "Loaded directory seed"
        );
        Ok(seed)
    }

    /// Check id uniqueness, slug format and every cross reference
    pub fn validate(&self) -> Result<(), SeedError> {
        let users = unique_ids("user", self.users.iter().map(|u| u.id.as_str()))?;
        let organizations =
            unique_ids("organization", self.organizations.iter().map(|o| o.id.as_str()))?;
        let workspaces = unique_ids("workspace", self.workspaces.iter().map(|w| w.id.as_str()))?;
        let projects = unique_ids("project", self.projects.iter().map(|p| p.id.as_str()))?;
        unique_ids("task", self.tasks.iter().map(|t| t.id.as_str()))?;

        let mut slugs = HashSet::new();
        for project in &self.projects {
            if !SLUG_PATTERN.is_match(&project.slug) {
                return Err(SeedError::InvalidSlug {
                    slug: project.slug.clone(),
                });
            }
            if !slugs.insert(project.slug.as_str()) {
                return Err(SeedError::Duplicate {
                    kind: "project slug",
                    key: project.slug.clone(),
                });
            }
        }

        for org in &self.organizations {
            require("organization", &org.id, "user", &org.owner_id, &users)?;
        }
        for ws in &self.workspaces {
            require("workspace", &ws.id, "organization", &ws.organization_id, &organizations)?;
        }
        for project in &self.projects {
            require("project", &project.id, "workspace", &project.workspace_id, &workspaces)?;
        }
        for task in &self.tasks {
            require("task", &task.id, "project", &task.project_id, &projects)?;
        }

        check_members(
            "organization member",
            "organization",
            &self.organization_members,
            &users,
            &organizations,
        )?;
        check_members(
            "workspace member",
            "workspace",
            &self.workspace_members,
            &users,
            &workspaces,
        )?;
        check_members(
            "project member",
            "project",
            &self.project_members,
            &users,
            &projects,
        )?;

        Ok(())
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, SeedError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SeedError::Duplicate {
                kind,
                key: id.to_string(),
            });
        }
    }
    Ok(seen)
}

fn require(
    kind: &'static str,
    id: &str,
    target: &'static str,
    target_id: &str,
    known: &HashSet<&str>,
) -> Result<(), SeedError> {
    if known.contains(target_id) {
        Ok(())
    } else {
        Err(SeedError::DanglingReference {
            kind,
            id: id.to_string(),
            target,
            target_id: target_id.to_string(),
        })
    }
}

/// Memberships are unique on (user, scope)
fn check_members(
    kind: &'static str,
    scope: &'static str,
    members: &[MemberSeed],
    users: &HashSet<&str>,
    scopes: &HashSet<&str>,
) -> Result<(), SeedError> {
    let mut seen = HashSet::new();
    for m in members {
        require(kind, &m.user_id, "user", &m.user_id, users)?;
        require(kind, &m.user_id, scope, &m.scope_id, scopes)?;
        if !seen.insert((m.user_id.as_str(), m.scope_id.as_str())) {
            return Err(SeedError::Duplicate {
                kind,
                key: format!("{}@{}", m.user_id, m.scope_id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"
[[users]]
id = "u1"

[[users]]
id = "root"
global_role = "SUPER_ADMIN"

[[organizations]]
id = "o1"
owner_id = "u1"

[[workspaces]]
id = "w1"
organization_id = "o1"

[[projects]]
id = "p1"
slug = "billing-api"
workspace_id = "w1"

[[tasks]]
id = "t1"
project_id = "p1"

[[project_members]]
user_id = "root"
project_id = "p1"
role = "VIEWER"
"#;

    #[test]
    fn test_parse_seed() {
        let seed = DirectorySeed::from_toml_str(SEED).unwrap();
        assert_eq!(seed.users.len(), 2);
        assert!(seed.users[1].is_super_admin());
        assert!(!seed.users[0].is_super_admin());
        assert_eq!(seed.project_members[0].scope_id, "p1");
        assert_eq!(seed.project_members[0].role, Role::Viewer);
    }

    #[test]
    fn test_empty_seed_is_valid() {
        let seed = DirectorySeed::from_toml_str("").unwrap();
        assert!(seed.organizations.is_empty());
    }

    #[test]
    fn test_invalid_slug() {
        let source = SEED.replace("billing-api", "Billing API");
        assert!(matches!(
            DirectorySeed::from_toml_str(&source),
            Err(SeedError::InvalidSlug { .. })
        ));
    }

    #[test]
    fn test_dangling_workspace() {
        let source = SEED.replace("organization_id = \"o1\"", "organization_id = \"o9\"");
        let err = DirectorySeed::from_toml_str(&source).unwrap_err();
        assert!(matches!(
            err,
            SeedError::DanglingReference {
                kind: "workspace",
                target: "organization",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_membership() {
        let source = format!(
            "{SEED}\n[[project_members]]\nuser_id = \"root\"\nproject_id = \"p1\"\nrole = \"OWNER\"\n"
        );
        assert!(matches!(
            DirectorySeed::from_toml_str(&source),
            Err(SeedError::Duplicate {
                kind: "project member",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let source = SEED.replace("role = \"VIEWER\"", "role = \"ADMIN\"");
        assert!(matches!(
            DirectorySeed::from_toml_str(&source),
            Err(SeedError::Parse(_))
        ));
    }
}
