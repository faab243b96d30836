//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use debrid_core::provider::{DebridProvider, JobSnapshot, TorrentJob};
use debrid_core::trackers::TrackerListError;
use debrid_core::{
    DebridConfig, LiveConfig, RealDebridClient, Result, TrackerEnricher, TrackerListFetcher,
    TrackerSource,
};
use tokio::fs;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the configured enrichment tracker list
    Trackers,
    /// Add the tracker list to a magnet link
    EnrichMagnet {
        /// Magnet link to enrich
        magnet: String,
    },
    /// Add the tracker list to a torrent file
    EnrichTorrent {
        /// Path to the torrent file
        input: PathBuf,
        /// Where to write the result (default: <INPUT stem>.enriched.torrent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List jobs on the provider
    Jobs,
    /// Show the provider account
    User,
    /// Resolve final download links for a job
    Links {
        /// Provider job id
        provider_id: String,
    },
}

/// Runs one CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn run_command(command: Commands) -> Result<()> {
    let config = LiveConfig::shared(DebridConfig::from_env());

    match command {
        Commands::Trackers => list_trackers(config).await,
        Commands::EnrichMagnet { magnet } => enrich_magnet(config, &magnet).await,
        Commands::EnrichTorrent { input, output } => enrich_torrent(config, input, output).await,
        Commands::Jobs => list_jobs(config).await,
        Commands::User => show_user(config).await,
        Commands::Links { provider_id } => resolve_links(config, provider_id).await,
    }
}

fn tracker_fetcher(config: Arc<LiveConfig>) -> Result<TrackerListFetcher> {
    TrackerListFetcher::with_http(config)
        .map_err(|source| TrackerListError::Unavailable { source }.into())
}

/// Print the tracker list
///
/// # Errors
/// - `DebridError::Trackers` - Tracker list could not be fetched
pub async fn list_trackers(config: Arc<LiveConfig>) -> Result<()> {
    let trackers = tracker_fetcher(config)?.trackers().await?;

    if trackers.is_empty() {
        println!("No trackers available (is DEBRID_TRACKER_LIST_URL set?)");
        return Ok(());
    }

    for tracker in trackers.iter() {
        println!("{tracker}");
    }
    println!("{} trackers", trackers.len());

    Ok(())
}

/// Print an enriched magnet link
///
/// # Errors
/// - `DebridError::Enrichment` - Tracker list could not be fetched
pub async fn enrich_magnet(config: Arc<LiveConfig>, magnet: &str) -> Result<()> {
    let enricher = TrackerEnricher::new(tracker_fetcher(config)?);
    println!("{}", enricher.enrich_magnet_link(magnet).await?);
    Ok(())
}

/// Write an enriched torrent file
///
/// # Errors
/// - `DebridError::Io` - Input could not be read or output could not be written
/// - `DebridError::Enrichment` - Input is not a torrent or trackers could not be fetched
pub async fn enrich_torrent(
    config: Arc<LiveConfig>,
    input: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let torrent = fs::read(&input).await?;
    let enricher = TrackerEnricher::new(tracker_fetcher(config)?);

    let enriched = enricher.enrich_torrent_bytes(&torrent).await?;

    let output = output.unwrap_or_else(|| enriched_path(&input));
    fs::write(&output, &enriched).await?;
    println!("Wrote {} ({} bytes)", output.display(), enriched.len());

    Ok(())
}

/// Default output path next to the input file.
fn enriched_path(input: &Path) -> PathBuf {
    input.with_extension("enriched.torrent")
}

/// List provider jobs
///
/// # Errors
/// - `DebridError::Provider` - Provider request failed
pub async fn list_jobs(config: Arc<LiveConfig>) -> Result<()> {
    let provider = RealDebridClient::with_http(config);
    let jobs = provider.torrents().await?;

    if jobs.is_empty() {
        println!("No jobs found");
        return Ok(());
    }

    println!("Jobs ({} total):", jobs.len());
    for job in &jobs {
        println!(
            "  {:<16} {:<28} {:>6.1}%  {}",
            job.provider_id,
            job.normalized_status.to_string(),
            job.progress_percent,
            display_name(job)
        );
    }

    Ok(())
}

fn display_name(job: &JobSnapshot) -> &str {
    job.display_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .or(job.original_display_name.as_deref())
        .unwrap_or("-")
}

/// Show the provider account
///
/// # Errors
/// - `DebridError::Provider` - Provider request failed
pub async fn show_user(config: Arc<LiveConfig>) -> Result<()> {
    let provider = RealDebridClient::with_http(config);
    let user = provider.user().await?;

    println!("User: {}", user.username);
    match user.expiration {
        Some(expiration) => println!("  Premium until: {expiration}"),
        None => println!("  No premium subscription"),
    }

    Ok(())
}

/// Resolve and unrestrict a job's download links
///
/// # Errors
/// - `DebridError::Provider` - Provider request failed
pub async fn resolve_links(config: Arc<LiveConfig>, provider_id: String) -> Result<()> {
    let provider = RealDebridClient::with_http(config);

    let mut job = TorrentJob::new(String::new());
    job.provider_id = Some(provider_id);
    let job = provider.update_data(job, None).await?;

    let Some(links) = provider.download_links(&job).await? else {
        println!(
            "Links are not ready yet (status: {})",
            job.remote.status_raw.as_deref().unwrap_or("unknown")
        );
        return Ok(());
    };

    let downloads =
        futures::future::try_join_all(links.iter().map(|link| provider.unrestrict(link))).await?;

    for download in downloads {
        println!("{download}");
    }

    Ok(())
}
