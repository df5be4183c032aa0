//! Tenancy access resolution
//!
//! Resolves a user's effective role and capability flags at any resource of a
//! four-level tenancy tree.
//!
//! ## Features
//!
//! - **One algorithm, five entry points** - organization, workspace, project (by id or slug)
//!   and task resolution share a single precedence evaluation
//! - **Bypasses** - global super admins and organization owners skip membership checks
//! - **Pluggable reads** - all lookups go through the [`directory::Directory`] trait
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Tenancy Model
//!
//! ```text
//! organization (owner) → workspace → project → task
//! ```
//!
//! Memberships exist at the organization, workspace and project levels and
//! carry a role: `VIEWER < MEMBER < MANAGER < OWNER`. `MANAGER` and `OWNER`
//! are elevated and may change the resource.
//!
//! ## Example
//!
//! ```no_run
//! use tenancy_access::{AccessResolver, InMemoryDirectory, Role};
//!
//! # async fn run() -> Result<(), tenancy_access::AccessError> {
//! let directory = InMemoryDirectory::new();
//! directory.insert_organization("acme", "bob").await;
//! directory.insert_workspace("eng", "acme").await;
//! directory.insert_workspace_member("carol", "eng", Role::Manager).await;
//!
//! let resolver = AccessResolver::from_directory(directory);
//! let access = resolver.resolve_access("workspace", "eng", "carol").await?;
//! assert!(access.can_change);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod config;
pub mod directory;
pub mod error;

// Re-export main types
pub use access::{AccessResolver, AccessResult, ResolvedRole, Role, ScopeKind};
pub use config::{AppConfig, load_config};
pub use directory::{Directory, DirectorySeed, InMemoryDirectory};
pub use error::{AccessError, AppError, Result};
