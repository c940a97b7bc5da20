use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hair_lens::{
    config::Settings, logging, AppError, Completion, SyntheticCamera, WorkflowController,
    WorkflowControllerBuilder,
};
use image::ImageFormat;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "hair-lens", version, about = "Analyze a hair photo from an upload or a camera still")]
struct Cli {
    /// Settings file (TOML, JSON or YAML). Defaults to ./hair-lens.* when present.
    #[arg(long, global = true, env = "HAIR_LENS_CONFIG")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an image file.
    Upload {
        path: PathBuf,
        /// Declared MIME type; guessed from the extension when omitted.
        #[arg(long)]
        mime: Option<String>,
    },
    /// Analyze a still from the synthetic camera.
    Capture {
        /// Simulate the user refusing camera access.
        #[arg(long)]
        deny: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    logging::init(&settings.logging)?;

    let camera = match &cli.command {
        Command::Capture { deny: true } => SyntheticCamera::denying("Permission denied"),
        _ => SyntheticCamera::new(),
    };
    let workflow = WorkflowControllerBuilder::new(settings)
        .video_source(Arc::new(camera))
        .build()?;

    let result = run(&workflow, cli.command, cli.json).await;
    workflow.dispose().await;
    result
}

async fn run(workflow: &WorkflowController, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Upload { path, mime } => {
            let bytes = tokio::fs::read(&path).await?;
            let mime = mime
                .or_else(|| {
                    ImageFormat::from_path(&path)
                        .ok()
                        .map(|format| format.to_mime_type().to_string())
                })
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let size = bytes.len() as u64;
            info!("Uploading {} ({}, {} bytes)", path.display(), mime, size);
            workflow.upload(bytes, &mime, size).await?;
        }
        Command::Capture { .. } => {
            workflow.start_camera().await?;
            workflow.capture_photo().await?;
        }
    }

    match workflow.submit().await? {
        Completion::Applied(_) => {}
        Completion::Discarded => {
            warn!("Analysis result was superseded");
            return Ok(());
        }
    }

    if let Some(model) = workflow.display_model().await {
        if json {
            println!("{}", serde_json::to_string_pretty(&model)?);
        } else {
            print!("{}", model.render_text());
        }
    }
    Ok(())
}
