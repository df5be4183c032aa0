//! Access resolution module
//!
//! Determines a user's effective role and capability flags at a resource in
//! the Organization → Workspace → Project → Task tenancy tree.
//!
//! ## Resolution Model
//!
//! Every scope follows the same shape; only the ancestor chain and the
//! membership levels consulted differ:
//!
//! 1. **Super admin** - the global flag bypasses everything, even a missing resource
//! 2. **Organization owner** - the owner of the chain's organization is `OWNER` everywhere below it
//! 3. **Early elevation** - the outermost ancestor membership that exists elevates if it is
//!    `MANAGER` or `OWNER`
//! 4. **Most specific wins** - otherwise the current scope's membership, then the workspace's,
//!    then the organization's; no record anywhere is `Forbidden`
//!
//! | Scope        | Ancestor levels (step 3) | Current level (step 4) |
//! |--------------|--------------------------|------------------------|
//! | organization | -                        | organization           |
//! | workspace    | organization             | workspace              |
//! | project      | organization, workspace  | project                |
//! | task         | organization, workspace  | project of the task    |

pub mod chain;
pub mod resolver;
pub mod types;

pub use chain::{AncestorChain, MembershipLevel, ProjectKey};
pub use resolver::AccessResolver;
pub use types::{AccessResult, GlobalRole, ResolutionPath, ResolvedRole, Role, ScopeKind};
