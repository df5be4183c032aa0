//! Tenancy access CLI
//!
//! Resolves access against a directory loaded from a seed document.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tenancy_access::{
    AccessError, AccessResolver, AppConfig, DirectorySeed, InMemoryDirectory,
    config::{LogFormat, load_config},
    error::ConfigError,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Tenancy access - resolve effective roles in an organization tree
#[derive(Parser, Debug)]
#[command(name = "tenancy-access")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TENANCY_ACCESS_CONFIG")]
    config: Option<String>,

    /// Path to the directory seed (overrides directory.seed_path)
    #[arg(short, long, env = "TENANCY_ACCESS_SEED")]
    seed: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TENANCY_ACCESS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a user's access to a resource
    Resolve {
        /// Scope kind (organization, workspace, project, task)
        scope: String,
        /// Resource identifier
        resource: String,
        /// User identifier
        user: String,
    },
    /// Resolve a user's access to a project by slug
    ResolveSlug {
        slug: String,
        user: String,
    },
    /// Validate the seed document and print entity counts
    CheckSeed,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn exit_code(error: &AccessError) -> ExitCode {
    match error {
        AccessError::InvalidArgument { .. } => ExitCode::from(2),
        AccessError::Forbidden { .. } => ExitCode::from(3),
        AccessError::NotFound { .. } => ExitCode::from(4),
        AccessError::Store(_) => ExitCode::FAILURE,
    }
}

fn load_directory(config: &AppConfig, seed: Option<&str>) -> anyhow::Result<InMemoryDirectory> {
    let path = seed
        .or(config.directory.seed_path.as_deref())
        .ok_or_else(|| ConfigError::Missing {
            field: "directory.seed_path (or --seed)".to_string(),
        })?;
    let seed = DirectorySeed::load(path)
        .inspect_err(|e| error!(error = %e, path, "Failed to load directory seed"))?;
    Ok(InMemoryDirectory::from_seed(seed))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.log_level.as_deref());

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting tenancy-access");

    let directory = load_directory(&config, args.seed.as_deref())?;

    let outcome = match args.command {
        Command::CheckSeed => {
            let stats = directory.stats().await;
            info!(?stats, "Seed is valid");
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Resolve {
            scope,
            resource,
            user,
        } => {
            let resolver = AccessResolver::from_directory(directory);
            resolver.resolve_access(&scope, &resource, &user).await
        }
        Command::ResolveSlug { slug, user } => {
            let resolver = AccessResolver::from_directory(directory);
            resolver.resolve_project_access_by_slug(&slug, &user).await
        }
    };

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(exit_code(&e))
        }
    }
}
