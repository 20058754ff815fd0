use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use card_detector::{api, Capability, Detector, DetectorConfig, ServerConfig};

#[derive(Parser)]
#[command(name = "card-detector")]
#[command(about = "Locate playing cards in photos and return their bounding boxes")]
struct Cli {
    #[command(flatten)]
    server: ServerConfig,

    #[command(flatten)]
    detector: DetectorConfig,

    /// Always answer with the mock box set
    #[arg(long, env = "CV_MOCK_ONLY")]
    mock_only: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Run detection on a single image file and print the JSON result
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Save per-step images to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    args.detector.validate()?;

    let capability = Capability::resolve(args.mock_only);
    if capability == Capability::Unavailable {
        tracing::warn!("contour detection unavailable, every response will use mock boxes");
    }
    let detector = Detector::new(capability, args.detector);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve(detector, &args.server).await,
        Command::Detect {
            image_path,
            debug_out,
        } => {
            let bytes = tokio::fs::read(&image_path).await?;
            tracing::info!("loaded {} bytes from {}", bytes.len(), image_path.display());

            let detector = match debug_out {
                Some(dir) => detector.with_debug(dir)?,
                None => detector,
            };
            let result =
                tokio::task::spawn_blocking(move || detector.detect(Some(bytes.as_slice())))
                    .await??;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
