//! FaceFind terminal front end.
//!
//! With no subcommand, runs the interactive workflow: take a selfie or pick a
//! photo, watch the search progress, browse the matches, search again.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use facefind_common::Config;
use facefind_media::FfmpegCamera;
use facefind_workflow::WorkflowController;
use recognition_client::RecognitionClient;
use tracing_subscriber::EnvFilter;

mod interactive;
mod oneshot;
mod render;

#[derive(Parser)]
#[command(name = "facefind")]
#[command(about = "Find event photos of yourself from a selfie")]
#[command(version)]
struct Cli {
    /// Base URL of the recognition service (overrides FACEFIND_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Camera device passed to ffmpeg (overrides FACEFIND_CAMERA_DEVICE)
    #[arg(long, global = true)]
    camera_device: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search with an existing photo
    Search {
        /// Image file to submit
        #[arg(long)]
        image: PathBuf,
    },

    /// Take a selfie with the camera and search with it
    Snap,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.json_logs) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(2);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("facefind=info".parse()?)
        .add_directive("recognition_client=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(device) = cli.camera_device {
        config.camera_device = device;
    }
    config.log_redacted();

    let camera = Arc::new(FfmpegCamera::from_config(&config));
    let recognizer = Arc::new(RecognitionClient::from_config(&config));
    let mut controller = WorkflowController::new(camera, recognizer);

    match cli.command {
        Some(Commands::Search { image }) => oneshot::search(&mut controller, &image).await,
        Some(Commands::Snap) => oneshot::snap(&mut controller).await,
        None => {
            interactive::run(&mut controller).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
