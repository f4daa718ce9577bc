//! Storyboard - ordered per-scene artifact store
//!
//! Serves the scene collections over HTTP and offers a few maintenance
//! commands against the same directories.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storyboard::{
    api::{build_app, AppState},
    collection::CollectionKind,
    config::StoryboardConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storyboard")]
#[command(version)]
#[command(about = "Ordered per-scene artifact store for novel-to-video pipelines")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STORYBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the storage base directory
    #[arg(long, env = "STORYBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ingest a raw novel file into the fragments collection
    Ingest {
        /// Raw source (defaults to the configured one)
        file: Option<PathBuf>,
    },

    /// Print one collection with the index of each item
    List {
        /// fragments, prompts or prompts_en
        collection: CollectionKind,
    },

    /// Show the combined scene view
    Show,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("storyboard={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = match cli.config {
        Some(path) => StoryboardConfig::from_file(path)?,
        None => StoryboardConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.storage.base_dir = data_dir;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Ingest { file } => {
            run_ingest(config, file).await?;
        }
        Commands::List { collection } => {
            run_list(config, collection).await?;
        }
        Commands::Show => {
            run_show(config).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(config: StoryboardConfig) -> Result<()> {
    let state = AppState::from_config(&config.storage);
    state.collections.gallery.ensure_dir().await?;

    let app = build_app(state, &config.server.cors_origins);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        data_dir = %config.storage.base_dir.display(),
        audio_dir = %config.storage.audio_path().display(),
        "Storyboard is running. Press Ctrl+C to stop."
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

async fn run_ingest(config: StoryboardConfig, file: Option<PathBuf>) -> Result<()> {
    let state = AppState::from_config(&config.storage);
    let source = file.unwrap_or_else(|| config.storage.raw_source_path());

    let count = state.collections.fragments.ingest_file(&source).await?;
    println!(
        "Ingested {} fragments from {} into {}",
        count,
        source.display(),
        state.collections.fragments.dir().display()
    );
    Ok(())
}

async fn run_list(config: StoryboardConfig, kind: CollectionKind) -> Result<()> {
    let state = AppState::from_config(&config.storage);
    let collection = match kind {
        CollectionKind::Fragments => &state.collections.fragments,
        CollectionKind::Prompts => &state.collections.prompts,
        CollectionKind::PromptsEn => &state.collections.prompts_en,
    };

    let items = collection.fetch_indexed().await?;
    println!("{} ({} items)", kind, items.len());
    for item in items {
        println!("{:>4}  {}", item.index, item.text);
    }
    Ok(())
}

async fn run_show(config: StoryboardConfig) -> Result<()> {
    let state = AppState::from_config(&config.storage);
    let composite = state.aggregate.aggregator.build_composite().await?;
    let lengths = composite.lengths();

    println!(
        "fragments: {}  prompts: {}  images: {}",
        lengths.fragments, lengths.prompts, lengths.images
    );
    for record in composite.records() {
        println!();
        println!("[{}]", record.position);
        println!("  fragment: {}", record.fragment.unwrap_or("-"));
        println!("  prompt:   {}", record.prompt.unwrap_or("-"));
        println!("  image:    {}", record.image.unwrap_or("-"));
    }
    Ok(())
}

fn show_config(config: Option<&StoryboardConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
