//! DocHub: CRM folder hierarchy & template reconciliation engine.
//!
//! Command-line entry point that wires the crates together: database
//! pool, cache provider, document-store adapter, and the reconciler on
//! top of them.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use dochub_cache::CacheManager;
use dochub_core::config::AppConfig;
use dochub_core::error::AppError;
use dochub_core::traits::cache::CacheProvider;
use dochub_core::traits::store::FolderStore;
use dochub_core::types::EntityKind;
use dochub_database::DatabasePool;
use dochub_database::repositories::directory::PgEntityDirectory;
use dochub_database::repositories::mapping::PgMappingRepository;
use dochub_database::repositories::template::PgTemplateRepository;
use dochub_service::{CachedListing, HierarchyReconciler, TemplateMaterializer};
use dochub_store::StoreManager;

/// DocHub CRM folder hierarchy reconciliation engine
#[derive(Debug, Parser)]
#[command(name = "dochub", version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ensure an entity's folder structure exists (idempotent)
    Ensure {
        /// Entity kind: company, lead, deal or system_root
        kind: EntityKind,
        /// Entity identifier in the CRM
        entity_id: String,
    },
    /// Re-apply the active template to heal out-of-band deletions
    Repair {
        kind: EntityKind,
        entity_id: String,
    },
    /// Retire an entity's mapping (soft delete; folder is left in place)
    Retire {
        kind: EntityKind,
        entity_id: String,
        /// Who is retiring the mapping
        #[arg(long, default_value = "cli")]
        actor: String,
        /// Free-form reason recorded on the mapping row
        #[arg(long, default_value = "retired via cli")]
        reason: String,
    },
    /// Provision a fresh folder for an entity whose mapping was retired
    Reinstate {
        kind: EntityKind,
        entity_id: String,
    },
    /// Seed a flat folder template and make it the active one for a kind
    SeedTemplate {
        kind: EntityKind,
        /// Template name (unique)
        name: String,
        /// Folder names in display order; repeat for each folder
        #[arg(long = "folder", required = true)]
        folders: Vec<String>,
    },
    /// Check database, cache and document-store connectivity
    Health,
}

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let cli = Cli::parse();
    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DOCHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocHub v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    dochub_database::migration::run_migrations(db.pool()).await?;

    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    let store_manager = StoreManager::new(&config.store)?;

    let pool = db.pool().clone();
    let mappings = Arc::new(PgMappingRepository::new(pool.clone()));
    let templates = Arc::new(PgTemplateRepository::new(pool.clone()));
    let directory = Arc::new(PgEntityDirectory::new(pool));

    let ttl = Duration::from_secs(config.cache.default_ttl_seconds);
    let listing = Arc::new(CachedListing::new(
        store_manager.store(),
        Arc::clone(&cache),
        ttl,
    ));
    let materializer = Arc::new(TemplateMaterializer::new(
        templates.clone(),
        Arc::clone(&listing),
    ));
    let reconciler = HierarchyReconciler::new(
        mappings,
        directory,
        Arc::clone(&listing),
        materializer,
        Arc::clone(&cache),
        config.structure.clone(),
        ttl,
    );

    match cli.command {
        Commands::Ensure { kind, entity_id } => {
            let mapping = reconciler.ensure_structure(kind, &entity_id).await?;
            println!(
                "{} {} -> folder {} ({})",
                kind,
                entity_id,
                mapping.external_folder_id,
                mapping.external_folder_url.as_deref().unwrap_or("no url")
            );
        }
        Commands::Repair { kind, entity_id } => {
            if reconciler.repair_structure(kind, &entity_id).await? {
                println!("Repaired structure for {} {}", kind, entity_id);
            } else {
                println!("No live mapping for {} {}; nothing to repair", kind, entity_id);
            }
        }
        Commands::Retire {
            kind,
            entity_id,
            actor,
            reason,
        } => {
            if reconciler
                .retire_structure(kind, &entity_id, &actor, &reason)
                .await?
            {
                println!("Retired mapping for {} {}", kind, entity_id);
            } else {
                println!("No live mapping for {} {}", kind, entity_id);
            }
        }
        Commands::Reinstate { kind, entity_id } => {
            let mapping = reconciler.reinstate_structure(kind, &entity_id).await?;
            println!(
                "{} {} -> folder {} ({})",
                kind,
                entity_id,
                mapping.external_folder_id,
                mapping.external_folder_url.as_deref().unwrap_or("no url")
            );
        }
        Commands::SeedTemplate {
            kind,
            name,
            folders,
        } => {
            templates.deactivate_all(kind).await?;
            let template = templates.create_template(&name, kind, true).await?;
            for (i, folder) in folders.iter().enumerate() {
                templates
                    .add_node(template.id, None, folder, i as i32)
                    .await?;
            }
            println!(
                "Seeded template '{}' for {} with {} folders",
                name,
                kind,
                folders.len()
            );
        }
        Commands::Health => {
            let db_ok = db.health_check().await.unwrap_or(false);
            let cache_ok = cache.health_check().await.unwrap_or(false);
            let store_ok = store_manager
                .store()
                .health_check()
                .await
                .unwrap_or(false);
            println!("database: {}", if db_ok { "ok" } else { "unreachable" });
            println!("cache:    {}", if cache_ok { "ok" } else { "unreachable" });
            println!("store:    {}", if store_ok { "ok" } else { "unreachable" });
            if !(db_ok && cache_ok && store_ok) {
                return Err(AppError::internal("One or more backends are unreachable"));
            }
        }
    }

    Ok(())
}
