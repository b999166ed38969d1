//! Auraa CLI - Run and inspect bulk product imports.
//!
//! # Usage
//!
//! ```bash
//! # Import 500 products and follow progress until the job finishes
//! auraa import --count 500 --query "jewelry accessories"
//!
//! # Import from Amazon, giving up after ten minutes
//! auraa import -c 50 -q "silk scarves" -p amazon --timeout 600
//!
//! # Check a job once
//! auraa status 4f1c2e
//!
//! # Ask the backend to sync a provider now
//! auraa sync --provider aliexpress
//! ```
//!
//! # Commands
//!
//! - `import` - Submit an import job and poll it to completion
//! - `status` - Fetch a job's status once
//! - `sync` - Trigger an immediate provider sync

#![cfg_attr(not(test), forbid(unsafe_code))]

use auraa_admin::AdminConfig;
use auraa_core::{JobId, Provider};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "auraa")]
#[command(author, version, about = "Auraa Luxury admin import tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a bulk import job and follow it until it finishes
    Import {
        /// Number of products to import
        #[arg(short, long)]
        count: u32,

        /// Search query sent to the provider
        #[arg(short, long)]
        query: String,

        /// Product source (`aliexpress`, `amazon`, `custom`)
        #[arg(short, long, default_value = "aliexpress")]
        provider: Provider,

        /// Stop following the job after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Fetch the current status of a job once
    Status {
        /// Job identifier returned by `import`
        job_id: String,
    },
    /// Trigger an immediate provider sync
    Sync {
        /// Provider to sync (`aliexpress`, `amazon`, `custom`)
        #[arg(short, long, default_value = "aliexpress")]
        provider: Provider,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(log_json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "auraa_admin=info,auraa=info".into());

    let json_layer = log_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AdminConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Import {
            count,
            query,
            provider,
            timeout,
        } => {
            let options = commands::import::ImportOptions {
                count,
                query,
                provider,
                timeout: timeout.map(std::time::Duration::from_secs),
            };
            commands::import::run(config, options).await?;
        }
        Commands::Status { job_id } => commands::status::run(config, JobId::new(job_id)).await?,
        Commands::Sync { provider } => commands::sync::run(config, provider).await?,
    }
    Ok(())
}
