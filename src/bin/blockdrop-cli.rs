use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use blockdrop::chain::{ChainClient, ChainGateway, LedgerGateway, VaultRegistry, Wallet};
use blockdrop::config::{load_or_default, ReleaseConfig};
use blockdrop::countdown::{decompose, project};
use blockdrop::media::LighthouseClient;
use blockdrop::observability::{logging, metrics};
use blockdrop::records::{FileRecordStore, RecordStore, RightsClass};
use blockdrop::register::{ReleaseMeta, RequestBuilder};
use blockdrop::resolve::Lifecycle;
use blockdrop::session::{ReleaseSession, ReleaseSnapshot, SessionTiming};
use blockdrop::timelock::RemoteSealer;

#[derive(Parser)]
#[command(name = "blockdrop-cli")]
#[command(about = "Time-locked media releases on Filecoin Calibration", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults target Calibration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal a media file behind a future block height
    Register {
        /// Media file to seal
        #[arg(long)]
        file: PathBuf,

        /// Release title
        #[arg(long)]
        title: String,

        /// Release description
        #[arg(long, default_value = "")]
        description: String,

        /// Usage rights: exclusive, non-exclusive or limited
        #[arg(long, default_value = "non-exclusive")]
        rights: String,

        /// Creation date shown alongside the release
        #[arg(long)]
        created: String,

        /// Absolute unlock height
        #[arg(long)]
        target_block: Option<u64>,

        /// Unlock height relative to the current one
        #[arg(long)]
        blocks_ahead: Option<u64>,
    },
    /// Watch a release count down until it resolves
    Watch {
        /// Release record ID
        id: String,
    },
    /// Show a one-shot status for a release
    Status {
        /// Release record ID
        id: String,
    },
    /// List registered releases
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store: Arc<dyn RecordStore> = Arc::new(FileRecordStore::open(&config.store.path)?);

    match cli.command {
        Commands::Register {
            file,
            title,
            description,
            rights,
            created,
            target_block,
            blocks_ahead,
        } => {
            register(
                &config,
                store,
                &file,
                title,
                description,
                rights,
                created,
                target_block,
                blocks_ahead,
            )
            .await?;
        }
        Commands::Watch { id } => {
            watch(&config, store, &id).await?;
        }
        Commands::Status { id } => {
            status(&config, store, &id).await?;
        }
        Commands::List => {
            println!("{}", serde_json::to_string_pretty(&store.list())?);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn register(
    config: &ReleaseConfig,
    store: Arc<dyn RecordStore>,
    file: &Path,
    title: String,
    description: String,
    rights: String,
    created: String,
    target_block: Option<u64>,
    blocks_ahead: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rights: RightsClass = rights.parse()?;
    let payload = tokio::fs::read(file).await?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("release.bin")
        .to_string();

    let wallet = Wallet::from_env(config.chain.chain_id)?;
    let client = ChainClient::new(config.chain.clone()).await?;
    let registry = VaultRegistry::connect(&config.chain, &config.vault, Some(&wallet))?;
    let gateway: Arc<dyn LedgerGateway> = ChainGateway::new(client, registry);

    let target_block = match (target_block, blocks_ahead) {
        (Some(height), _) => height,
        (None, Some(ahead)) => gateway.current_height().await? + ahead,
        (None, None) => {
            return Err("pass either --target-block or --blocks-ahead".into());
        }
    };

    let builder = RequestBuilder::new(
        Arc::new(LighthouseClient::from_config(&config.media)?),
        Arc::new(RemoteSealer::from_config(&config.sealer)?),
        gateway,
        store,
        config.vault.explorer_base_url.clone(),
    );

    let meta = ReleaseMeta {
        title,
        description,
        media_type: media_type_for(file).to_string(),
        rights,
        created_at: created,
    };
    let record = builder
        .register(Uuid::new_v4().to_string(), payload, &filename, meta, target_block)
        .await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn watch(
    config: &ReleaseConfig,
    store: Arc<dyn RecordStore>,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = store.get(id)?;
    let client = ChainClient::new(config.chain.clone()).await?;
    let registry = VaultRegistry::connect(&config.chain, &config.vault, None)?;
    let gateway: Arc<dyn LedgerGateway> = ChainGateway::new(client, registry);

    let handle = ReleaseSession::spawn(record, gateway, store, SessionTiming::from_config(config));
    let mut snapshots = handle.snapshots();
    render(&snapshots.borrow().clone());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&snapshots.borrow().clone());
            }
            _ = tokio::signal::ctrl_c() => {
                handle.stop();
                break;
            }
        }
    }
    handle.join().await;

    let last = snapshots.borrow().clone();
    match last.decrypted_media_url {
        Some(url) => println!("decrypted media: {}", url),
        None => println!("stopped while still sealed"),
    }
    Ok(())
}

async fn status(
    config: &ReleaseConfig,
    store: Arc<dyn RecordStore>,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = store.get(id)?;
    let client = ChainClient::new(config.chain.clone()).await?;
    let current_block = client.current_height().await?;

    let blocks_remaining = record.target_block.saturating_sub(current_block);
    let countdown = decompose(project(
        i64::try_from(blocks_remaining).unwrap_or(i64::MAX),
        config.chain.seconds_per_block,
    ));

    let status = serde_json::json!({
        "record": record,
        "current_block": current_block,
        "blocks_remaining": blocks_remaining,
        "countdown": countdown,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn render(snapshot: &ReleaseSnapshot) {
    let height = snapshot
        .current_block
        .map(|h| h.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "[{:>13}] {:02}d:{:02}h:{:02}m:{:02}s  height {}/{}  ({} blocks left)",
        lifecycle_label(snapshot.lifecycle),
        snapshot.parts.days,
        snapshot.parts.hours,
        snapshot.parts.minutes,
        snapshot.parts.seconds,
        height,
        snapshot.target_block,
        snapshot.blocks_remaining,
    );
}

fn lifecycle_label(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Locked => "locked",
        Lifecycle::ConditionMet => "condition met",
        Lifecycle::Resolving => "resolving",
        Lifecycle::Decrypted => "decrypted",
    }
}

fn media_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
