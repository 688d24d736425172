use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use backend_bootstrap::{
    ensure_completed, run_import, run_migrate, run_reindex, run_server, AppContext,
    MigrateDirection,
};

#[derive(Parser, Debug)]
#[command(name = "almanax-backend")]
#[command(version, about = "Dofus Almanax API", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Serve Prometheus metrics on API_PORT + 1
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long)]
        metrics: bool,
    },
    /// Apply or revert database migrations
    Migrate {
        #[arg(value_enum)]
        direction: MigrateDirection,
    },
    /// Sync the bonus search indexes with the live bonus listing
    Reindex {
        /// Rebuild every index from scratch
        #[arg(long)]
        init: bool,
    },
    /// Import the mapped almanax data of a release
    Import {
        #[arg(long)]
        tag: String,
    },
}

fn init_tracing() {
    // RUST_LOG first, then LOG_LEVEL
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| EnvFilter::try_new(level).ok())
            .unwrap_or_else(|| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let context = AppContext::load(args.config.as_deref()).await?;

    match args.command {
        None => run_server(context, args.metrics).await,
        Some(Command::Serve { metrics }) => run_server(context, metrics || args.metrics).await,
        Some(Command::Migrate { direction }) => run_migrate(&context, direction).await,
        Some(Command::Reindex { init }) => {
            let report = run_reindex(&context, init).await;
            println!("{}", report.added);
            ensure_completed(&report)
        }
        Some(Command::Import { tag }) => {
            let summary = run_import(&context, &tag).await?;
            println!("created {} skipped {}", summary.created, summary.skipped);
            Ok(())
        }
    }
}
