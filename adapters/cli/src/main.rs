#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter exposing heatmaps, recommendations and tree reports.

mod config;
mod replay_token;

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use uhi_greening_core::BoundingBox;
use uhi_greening_geojson::{heatmap_features, recommendation_features};
use uhi_greening_ledger::{
    BlobStore, DirectoryBlobStore, JsonFileLedger, ReportSink, TreeHealth, TreeReportInput,
};
use uhi_greening_system_scenario::{HeatmapRequest, RecommendationRequest, Scenario};

use crate::config::CliConfig;

/// Command-line arguments for the UHI greening tool.
#[derive(Debug, Parser)]
#[command(
    name = "uhi-greening",
    version,
    about = "Scores urban heat exposure and recommends greening sites"
)]
struct CliArgs {
    /// TOML file with request defaults and storage locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enables debug logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Operation to run.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the service banner and the available operations.
    Status,
    /// Prints the per-cell heatmap as a GeoJSON FeatureCollection.
    Heatmap(HeatmapArgs),
    /// Prints recommended planting sites as a GeoJSON FeatureCollection.
    Recommend(RecommendArgs),
    /// Records a tree-health observation.
    ReportTree(ReportTreeArgs),
    /// Lists recorded tree-health observations.
    Reports,
    /// Copies a file into the uploads directory.
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
struct HeatmapArgs {
    /// Western edge in degrees longitude.
    #[arg(long, allow_negative_numbers = true)]
    minx: f64,
    /// Southern edge in degrees latitude.
    #[arg(long, allow_negative_numbers = true)]
    miny: f64,
    /// Eastern edge in degrees longitude.
    #[arg(long, allow_negative_numbers = true)]
    maxx: f64,
    /// Northern edge in degrees latitude.
    #[arg(long, allow_negative_numbers = true)]
    maxy: f64,
    /// Cells per axis.
    #[arg(long)]
    grid_size: Option<u32>,
    /// Base seed of the simulated layers.
    #[arg(long)]
    seed: Option<u64>,
    /// Writes the JSON to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RecommendArgs {
    /// Western edge in degrees longitude.
    #[arg(long, allow_negative_numbers = true, required_unless_present = "replay")]
    minx: Option<f64>,
    /// Southern edge in degrees latitude.
    #[arg(long, allow_negative_numbers = true, required_unless_present = "replay")]
    miny: Option<f64>,
    /// Eastern edge in degrees longitude.
    #[arg(long, allow_negative_numbers = true, required_unless_present = "replay")]
    maxx: Option<f64>,
    /// Northern edge in degrees latitude.
    #[arg(long, allow_negative_numbers = true, required_unless_present = "replay")]
    maxy: Option<f64>,
    /// Cells per axis.
    #[arg(long)]
    grid_size: Option<u32>,
    /// Base seed of the simulated layers.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of sites to return.
    #[arg(long)]
    top_k: Option<u32>,
    /// Minimum spacing between sites in meters.
    #[arg(long)]
    min_distance_m: Option<f64>,
    /// Replays the request captured in a token from `--emit-token`.
    #[arg(
        long,
        value_name = "TOKEN",
        conflicts_with_all = [
            "minx", "miny", "maxx", "maxy", "grid_size", "seed", "top_k", "min_distance_m",
        ]
    )]
    replay: Option<String>,
    /// Prints the replay token for the request instead of its sites.
    ///
    /// The request still runs first, so only replayable requests get a token.
    #[arg(long)]
    emit_token: bool,
    /// Writes the JSON to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReportTreeArgs {
    /// Latitude of the tree in degrees.
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude of the tree in degrees.
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
    /// Observed condition: good, fair or poor.
    #[arg(long)]
    health: TreeHealth,
    /// Free-form remarks.
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    /// File to copy into the uploads directory.
    file: PathBuf,
}

/// Entry point for the UHI greening command-line interface.
fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(args: CliArgs) -> Result<()> {
    let config = CliConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Status => print_json(&json!({
            "message": "UHI greening engine",
            "status": "ok",
            "operations": ["heatmap", "recommend", "report-tree", "reports", "upload"],
        })),
        Command::Heatmap(heatmap) => run_heatmap(&config, heatmap),
        Command::Recommend(recommend) => run_recommend(&config, recommend),
        Command::ReportTree(report) => run_report_tree(&config, report),
        Command::Reports => {
            let ledger = JsonFileLedger::open(&config.ledger_path)?;
            let reports = ledger.reports()?;
            print_json(&json!({ "count": reports.len(), "reports": reports }))
        }
        Command::Upload(upload) => run_upload(&config, &upload.file),
    }
}

fn run_heatmap(config: &CliConfig, args: HeatmapArgs) -> Result<()> {
    let bbox = BoundingBox::new(args.minx, args.miny, args.maxx, args.maxy)?;
    let request = HeatmapRequest {
        grid_size: args.grid_size.unwrap_or(config.grid_size),
        seed: args.seed.unwrap_or(config.seed),
        ..HeatmapRequest::new(bbox)
    };

    let heatmap = Scenario::default().heatmap(&request)?;
    let rendered = heatmap_features(&heatmap)
        .to_json_pretty()
        .context("failed to render heatmap")?;
    emit(&rendered, args.output.as_deref())
}

fn run_recommend(config: &CliConfig, args: RecommendArgs) -> Result<()> {
    let request = match &args.replay {
        Some(token) => replay_token::decode(token).context("invalid replay token")?,
        None => recommendation_request(config, &args)?,
    };

    let recommendations = Scenario::default().recommendations(&request)?;
    if args.emit_token {
        let token = replay_token::encode(&request).context("failed to encode replay token")?;
        return emit(&token, args.output.as_deref());
    }

    let rendered = recommendation_features(&recommendations)
        .to_json_pretty()
        .context("failed to render recommendations")?;
    emit(&rendered, args.output.as_deref())
}

fn recommendation_request(
    config: &CliConfig,
    args: &RecommendArgs,
) -> Result<RecommendationRequest> {
    let (Some(minx), Some(miny), Some(maxx), Some(maxy)) =
        (args.minx, args.miny, args.maxx, args.maxy)
    else {
        return Err(anyhow!(
            "--minx, --miny, --maxx and --maxy are required without --replay"
        ));
    };

    Ok(RecommendationRequest {
        grid_size: args.grid_size.unwrap_or(config.grid_size),
        seed: args.seed.unwrap_or(config.seed),
        top_k: args.top_k.unwrap_or(config.top_k),
        min_distance_m: args.min_distance_m.unwrap_or(config.min_distance_m),
        ..RecommendationRequest::new(BoundingBox::new(minx, miny, maxx, maxy)?)
    })
}

fn run_report_tree(config: &CliConfig, args: ReportTreeArgs) -> Result<()> {
    let mut ledger = JsonFileLedger::open(&config.ledger_path)?;
    let receipt = ledger.record(TreeReportInput {
        lat: args.lat,
        lon: args.lon,
        health: args.health,
        notes: args.notes,
    })?;
    print_json(&json!({ "status": "ok", "id": receipt.id, "uuid": receipt.uuid }))
}

fn run_upload(config: &CliConfig, file: &Path) -> Result<()> {
    let file_name = file
        .file_name()
        .ok_or_else(|| anyhow!("{} does not name a file", file.display()))?
        .to_string_lossy();
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    let store = DirectoryBlobStore::new(&config.uploads_dir);
    let path = store.store(&file_name, &bytes)?;
    print_json(&json!({ "status": "saved", "path": path }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    emit(&rendered, None)
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
