//! CLI for moderation and dashboard queries
//!
//! Every command prints its result as JSON on stdout.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use marketplace_core::common::{Actor, ListingId, MemberId};
use marketplace_core::config::{init_tracing, Config};
use marketplace_core::domains::analytics::{AggregationEngine, WindowPreset};
use marketplace_core::domains::listings::{transition, ListingStatus};
use marketplace_core::kernel::ServerDeps;

#[derive(Parser)]
#[command(name = "marketplace_cli")]
#[command(about = "Listing moderation and dashboard queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// All-time totals
    Totals,

    /// Activity in a window compared with the window before it
    Deltas {
        /// 30d, 90d, 6m or 1y
        #[arg(long, default_value = "30d")]
        window: WindowPreset,
    },

    /// Active listings by property type
    Types,

    /// Busiest locations
    Locations {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Listing counts per price band
    Prices,

    /// New listings, users and views per calendar month
    Monthly {
        #[arg(long)]
        months: Option<u32>,
    },

    /// Dashboard for one owner
    Owner { owner_id: MemberId },

    /// Move a listing to another status
    Transition {
        listing_id: ListingId,
        status: ListingStatus,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        actor: MemberId,
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Serialize)]
struct Response<T: Serialize> {
    success: bool,
    data: T,
}

fn output<T: Serialize>(data: T) -> Result<()> {
    let json = serde_json::to_string_pretty(&Response {
        success: true,
        data,
    })?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = get_pool(&config).await?;

    if let Commands::Migrate = cli.command {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
        return output("migrations applied");
    }

    let deps = ServerDeps::postgres(pool).with_timeout(config.store_timeout);
    let engine = AggregationEngine::new(deps.clone());

    match cli.command {
        Commands::Migrate => Ok(()),
        Commands::Totals => output(engine.totals().await?),
        Commands::Deltas { window } => {
            output(engine.compare_windows(&window.resolve(Utc::now())).await?)
        }
        Commands::Types => output(engine.distribution_by_type(ListingStatus::Active).await?),
        Commands::Locations { limit } => output(
            engine
                .top_locations(limit.unwrap_or(config.dashboard_top_locations))
                .await?,
        ),
        Commands::Prices => output(engine.price_distribution().await?),
        Commands::Monthly { months } => output(
            engine
                .monthly_series(months.unwrap_or(config.dashboard_months_back))
                .await?,
        ),
        Commands::Owner { owner_id } => output(engine.owner_summary(owner_id).await?),
        Commands::Transition {
            listing_id,
            status,
            reason,
            actor,
            admin,
        } => {
            let actor = Actor::new(actor, admin);
            let listing = transition(&deps, &actor, listing_id, status, reason.as_deref()).await?;
            output(listing)
        }
    }
}

async fn get_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}
