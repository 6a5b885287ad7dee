mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prodsync_core::{AppConfig, ProductId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prodsync")]
#[command(about = "Fetch products from the products API and re-upload their images")]
struct Cli {
    /// API root, e.g. `http://localhost:3131/api`. Overrides `PRODSYNC_API_BASE_URL`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory asset paths are resolved against. Overrides `PRODSYNC_ASSETS_DIR`.
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the product collection and print every record (the default).
    List,
    /// Fetch and print a single product.
    Show { id: String },
    /// Attach each product's encoded thumbnail and packshot and PUT it back.
    Update {
        /// Fetch and encode, but send nothing.
        #[arg(long)]
        dry_run: bool,
        /// Only update the product with this identifier.
        #[arg(long)]
        id: Option<String>,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.api_base_url.clone_from(base_url);
        }
        if let Some(assets_dir) = &self.assets_dir {
            config.assets_dir.clone_from(assets_dir);
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the configured level. An invalid
/// value in either is an error rather than a silent fallback.
fn build_env_filter(rust_log: Option<&str>, log_level: &str) -> anyhow::Result<EnvFilter> {
    match rust_log {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| anyhow::anyhow!("invalid {}: {e}", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(log_level)
            .map_err(|e| anyhow::anyhow!("invalid PRODSYNC_LOG_LEVEL: {e}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = prodsync_core::load_app_config()?;
    cli.apply_overrides(&mut config);

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_env_filter(rust_log.as_deref(), &config.log_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = prodsync_client::ProductsClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build products client: {e}"))?;
    let mut out = std::io::stdout();

    match cli.command {
        None | Some(Commands::List) => sync::run_list(&client, &mut out).await,
        Some(Commands::Show { id }) => {
            sync::run_show(&client, &ProductId::from(id.as_str()), &mut out).await
        }
        Some(Commands::Update { dry_run, id }) => {
            let only = id.as_deref().map(ProductId::from);
            let options = sync::UpdateOptions {
                assets_dir: &config.assets_dir,
                dry_run,
                only: only.as_ref(),
            };
            let summary = sync::run_update(&client, &options, &mut out).await?;
            tracing::info!(
                updated = summary.updated,
                failed = summary.failed,
                skipped = summary.skipped,
                dry_run,
                "update run finished"
            );
            Ok(())
        }
    }
}
