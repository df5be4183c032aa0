//! Configuration and seed loading tests

use std::env;
use std::fs;
use tempfile::tempdir;
use tenancy_access::config::{LogFormat, load_config, load_config_from_str};
use tenancy_access::directory::{Directory, DirectorySeed, InMemoryDirectory};
use tenancy_access::error::{ConfigError, SeedError};
use tenancy_access::{AccessResolver, ResolvedRole, Role};

const FULL_CONFIG: &str = r#"
[directory]
seed_path = "~/tenancy/seed.toml"

[logging]
level = "warn"
format = "json"
"#;

const SEED: &str = r#"
[[users]]
id = "ada"
global_role = "SUPER_ADMIN"

[[users]]
id = "bo"

[[users]]
id = "cy"

[[organizations]]
id = "acme"
owner_id = "bo"

[[workspaces]]
id = "eng"
organization_id = "acme"

[[projects]]
id = "p-42"
slug = "billing-api"
workspace_id = "eng"

[[tasks]]
id = "t-7"
project_id = "p-42"

[[workspace_members]]
user_id = "cy"
workspace_id = "eng"
role = "MEMBER"

[[project_members]]
user_id = "cy"
project_id = "p-42"
role = "MANAGER"
"#;

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(
        config.directory.seed_path.as_deref(),
        Some("~/tenancy/seed.toml")
    );
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_unknown_log_format_rejected() {
    let config_str = r#"
[logging]
format = "xml"
"#;

    let result = load_config_from_str(config_str);
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial_test::serial]
fn test_config_file_loaded_from_explicit_path() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("tenancy-access.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial_test::serial]
fn test_env_var_overrides_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("tenancy-access.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    unsafe {
        env::set_var("TENANCY_ACCESS__LOGGING__LEVEL", "debug");
        env::set_var("TENANCY_ACCESS__DIRECTORY__SEED_PATH", "/srv/seed.toml");
    }

    let config = load_config(Some(config_path.to_str().unwrap()));

    unsafe {
        env::remove_var("TENANCY_ACCESS__LOGGING__LEVEL");
        env::remove_var("TENANCY_ACCESS__DIRECTORY__SEED_PATH");
    }

    let config = config.unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.directory.seed_path.as_deref(), Some("/srv/seed.toml"));
    // Untouched keys still come from the file
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
#[serial_test::serial]
fn test_invalid_env_value_rejected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("tenancy-access.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    unsafe {
        env::set_var("TENANCY_ACCESS__LOGGING__LEVEL", "chatty");
    }

    let result = load_config(Some(config_path.to_str().unwrap()));

    unsafe {
        env::remove_var("TENANCY_ACCESS__LOGGING__LEVEL");
    }

    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[tokio::test]
async fn test_seed_file_round_trip_through_resolver() {
    let dir = tempdir().unwrap();
    let seed_path = dir.path().join("seed.toml");
    fs::write(&seed_path, SEED).unwrap();

    let seed = DirectorySeed::load(seed_path.to_str().unwrap()).unwrap();
    let directory = InMemoryDirectory::from_seed(seed);

    let stats = directory.stats().await;
    assert_eq!(stats.users, 3);
    assert_eq!(stats.tasks, 1);
    assert_eq!(stats.memberships, 2);
    assert!(directory.user("ada").await.unwrap().unwrap().is_super_admin());

    let resolver = AccessResolver::from_directory(directory);

    let cy = resolver
        .resolve_access("task", "t-7", "cy")
        .await
        .unwrap();
    assert_eq!(cy.role, ResolvedRole::Role(Role::Manager));
    assert!(cy.can_change);

    let bo = resolver
        .resolve_project_access_by_slug("billing-api", "bo")
        .await
        .unwrap();
    assert_eq!(bo.role, ResolvedRole::Role(Role::Owner));
    assert_eq!(bo.scope_id, "p-42");
}

#[test]
fn test_missing_seed_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = DirectorySeed::load(missing.to_str().unwrap());
    assert!(matches!(result, Err(SeedError::Io(_))));
}

#[test]
fn test_seed_duplicate_slug() {
    let source = format!(
        "{SEED}\n[[projects]]\nid = \"p-43\"\nslug = \"billing-api\"\nworkspace_id = \"eng\"\n"
    );
    let result = DirectorySeed::from_toml_str(&source);
    assert!(matches!(
        result,
        Err(SeedError::Duplicate {
            kind: "project slug",
            ..
        })
    ));
}

#[test]
fn test_seed_owner_must_exist() {
    let source = SEED.replace("owner_id = \"bo\"", "owner_id = \"zed\"");
    let err = DirectorySeed::from_toml_str(&source).unwrap_err();
    assert_eq!(
        err.to_string(),
        "organization 'acme' references unknown user 'zed'"
    );
}
