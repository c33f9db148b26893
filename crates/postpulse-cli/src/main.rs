mod analyze;
mod query;

use clap::{Parser, Subcommand};
use postpulse_core::{AppConfig, Granularity};
use postpulse_sentiment::{SentimentConfig, DEFAULT_TOP_N};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postpulse")]
#[command(about = "Social post sentiment ingestion and reporting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search recent posts and score the new ones
    Analyze {
        /// Search query; also the subject the run is filed under
        #[arg(long)]
        query: String,

        /// Number of posts to fetch (defaults to `POSTPULSE_DEFAULT_POST_COUNT`)
        #[arg(long)]
        count: Option<u32>,

        /// Score against an in-memory store without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch a user's recent posts plus their replies and score the new ones
    User {
        /// Twitter handle, with or without a leading `@`
        username: String,

        /// Number of the user's own posts to fetch
        #[arg(long)]
        max_posts: Option<u32>,

        /// Score against an in-memory store without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a markdown report across every run for a subject
    Report {
        subject: String,

        /// Posts listed per sentiment
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: u32,
    },
    /// Print the sentiment distribution per calendar period
    Distribution {
        subject: String,

        #[arg(long, default_value = "monthly")]
        group_by: Granularity,
    },
    /// List analysis runs for a subject, newest first
    Runs { subject: String },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = postpulse_db::PoolConfig::from_app_config(config);
    let pool = postpulse_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("postpulse: no command given; see `postpulse --help`");
        return Ok(());
    };

    let config = postpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    let sentiment_config = SentimentConfig::from_app_config(&config);

    match command {
        Commands::Analyze {
            query,
            count,
            dry_run,
        } => analyze::run_analyze(&config, &sentiment_config, &query, count, dry_run).await,
        Commands::User {
            username,
            max_posts,
            dry_run,
        } => analyze::run_user(&config, &sentiment_config, &username, max_posts, dry_run).await,
        Commands::Report { subject, top } => {
            let store = analyze::open_store(&config, false).await?;
            query::run_report(store.as_ref(), &subject, top).await
        }
        Commands::Distribution { subject, group_by } => {
            let store = analyze::open_store(&config, false).await?;
            query::run_distribution(store.as_ref(), &subject, group_by).await
        }
        Commands::Runs { subject } => {
            let store = analyze::open_store(&config, false).await?;
            query::run_runs(store.as_ref(), &subject).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    postpulse_db::health_check(&pool).await?;
                    println!("database reachable");
                }
                DbCommands::Migrate => {
                    let applied = postpulse_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
