//! Vesta - a fast static file server
//!
//! This is the main entry point for the Vesta CLI.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vesta_core::config::{ConfigLoader, VestaConfig};
use vesta_core::StaticFileOptions;
use vesta_pipeline::PipelineBuilder;

/// Vesta - static file serving without ceremony
#[derive(Parser)]
#[command(name = "vesta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server with a configuration file
    Run {
        /// Path to the configuration file (.json or .toml)
        config: String,
    },

    /// Start a quick file server for a directory
    Serve {
        /// Address to listen on
        #[arg(long, default_value = ":8080")]
        listen: String,

        /// Root directory to serve
        #[arg(long, default_value = ".")]
        root: String,

        /// Enable directory browsing
        #[arg(long)]
        browse: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        config: String,
    },

    /// Show version information
    Version,
}

/// RUST_LOG wins; otherwise fall back to the configured level
fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config: config_path } => {
            let config = match ConfigLoader::load(&config_path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to load config: {}", e);
                    std::process::exit(1);
                }
            };

            init_tracing(if cli.verbose { "debug" } else { config.logging.level.as_str() });
            tracing::info!("🚀 Starting Vesta v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("📄 Loaded configuration from: {}", config_path);
            tracing::info!("🔧 Configured {} site(s)", config.sites.len());

            run(config).await?;
        }

        Commands::Serve { listen, root, browse } => {
            init_tracing(if cli.verbose { "debug" } else { "info" });
            tracing::info!("Serving {} on {}", root, listen);

            let root = std::fs::canonicalize(&root)
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or(root);

            let mut options = StaticFileOptions::for_root(root);
            options.browse = browse;

            let mut builder = PipelineBuilder::new();
            builder.use_static_files_opts(options)?;
            serve_all(vec![listen], builder).await?;
        }

        Commands::Validate { config } => {
            init_tracing("info");
            match ConfigLoader::load(&config) {
                Ok(_) => {
                    println!("✅ Configuration '{}' is valid!", config);
                }
                Err(e) => {
                    eprintln!("❌ Configuration Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Vesta v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn run(config: VestaConfig) -> anyhow::Result<()> {
    if config.sites.is_empty() {
        tracing::warn!("No sites configured");
    }

    let mut builder = PipelineBuilder::new();
    for site in config.sites {
        builder.use_static_files_opts(site.into())?;
    }

    serve_all(config.listen, builder).await
}

async fn serve_all(listen: Vec<String>, builder: PipelineBuilder) -> anyhow::Result<()> {
    let pipeline = Arc::new(builder.build());

    let addrs = if listen.is_empty() {
        vec!["0.0.0.0:8080".to_string()]
    } else {
        listen
    };

    let mut handles = Vec::new();
    for addr in addrs {
        let addr: SocketAddr = normalize_listen(&addr).parse()?;
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            vesta_server::run_server(addr, pipeline).await
        }));
    }

    for handle in handles {
        handle.await??;
    }

    Ok(())
}

/// Accept ":8080" shorthand for "0.0.0.0:8080"
fn normalize_listen(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
