mod config;
mod order_cmds;
mod plan_cmds;
mod serve_cmd;
mod services;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::PgPool;

use geoplan_db::config::DbConfig;
use geoplan_db::pool;

use config::GeoplanConfig;
use services::Services;

#[derive(Parser)]
#[command(name = "geoplan", about = "Delivery plans and their order boards")]
struct Cli {
    /// Database URL (overrides GEOPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a geoplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Days before today included in recent plans
        #[arg(long, default_value_t = geoplan_core::plan::PlanningWindow::DEFAULT_DAYS_BACK, allow_hyphen_values = true)]
        days_back: i32,
        /// Days after today included in recent plans
        #[arg(long, default_value_t = geoplan_core::plan::PlanningWindow::DEFAULT_DAYS_FORWARD, allow_hyphen_values = true)]
        days_forward: i32,
        /// Directory of daily ERP exports (<YYYY-MM-DD>.json)
        #[arg(long)]
        erp_dir: Option<PathBuf>,
        /// TOML gazetteer used for geocoding
        #[arg(long)]
        gazetteer: Option<PathBuf>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the geoplan database (requires config file or env vars)
    DbInit,
    /// Plan lookups and creation
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Change a plan's orders and save them
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Start the HTTP API for plans and order boards
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create an empty plan for a delivery date
    Create {
        /// Delivery date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// List plans inside the configured window around today
    Recent,
    /// List plans delivered on a date
    On {
        /// Delivery date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Show a plan and its orders
    Show {
        /// Plan ID to show
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Merge the ERP's orders for the plan's delivery date, then save
    Fetch {
        /// Plan ID
        plan_id: String,
    },
    /// Geocode every order with an address, then save
    Geocode {
        /// Plan ID
        plan_id: String,
    },
    /// Add an order by hand, then save
    Add {
        /// Plan ID
        plan_id: String,
        /// Order name
        name: String,
        /// Delivery address
        #[arg(long)]
        address: Option<String>,
    },
}

/// Execute the `geoplan init` command: write config file.
fn cmd_init(cfg: config::ConfigFile, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {}", cfg.database.url);
    println!(
        "  planning      = {} days back, {} days forward",
        cfg.planning.days_back, cfg.planning.days_forward
    );
    if let Some(dir) = &cfg.erp.export_dir {
        println!("  erp.export_dir = {}", dir.display());
    }
    if let Some(path) = &cfg.geocoder.gazetteer {
        println!("  geocoder.gazetteer = {}", path.display());
    }
    println!();
    println!("Next: run `geoplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `geoplan db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = GeoplanConfig::resolve(cli_db_url)?;

    println!("Initializing geoplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("geoplan db-init complete.");
    Ok(())
}

/// Resolve config, connect, and wire the services for one command.
async fn connect(cli_db_url: Option<&str>) -> anyhow::Result<(PgPool, Services)> {
    let resolved = GeoplanConfig::resolve(cli_db_url)?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    match Services::from_config(&resolved, db_pool.clone()) {
        Ok(services) => Ok((db_pool, services)),
        Err(e) => {
            db_pool.close().await;
            Err(e)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            days_back,
            days_forward,
            erp_dir,
            gazetteer,
            force,
        } => {
            let cfg = config::ConfigFile {
                database: config::DatabaseSection { url: db_url },
                planning: config::PlanningSection {
                    days_back,
                    days_forward,
                },
                erp: config::ErpSection {
                    export_dir: erp_dir,
                },
                geocoder: config::GeocoderSection { gazetteer },
            };
            cmd_init(cfg, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { command } => {
            let (db_pool, services) = connect(cli.database_url.as_deref()).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool, &services).await;
            db_pool.close().await;
            result?;
        }
        Commands::Orders { command } => {
            let (db_pool, services) = connect(cli.database_url.as_deref()).await?;
            let result = order_cmds::run_order_command(command, &services).await;
            db_pool.close().await;
            result?;
        }
        Commands::Serve { bind, port } => {
            let (db_pool, services) = connect(cli.database_url.as_deref()).await?;
            let result = serve_cmd::run_serve(services, &bind, port).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
