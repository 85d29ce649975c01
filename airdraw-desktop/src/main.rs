//! # Air Draw Desktop
//!
//! Headless replay host for the Air Draw engine.

use airdraw_desktop::{run, CliArgs, DesktopConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "airdraw_desktop=info,airdraw_app=info,airdraw_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Air Draw Desktop");

    let args = CliArgs::parse();
    let config = DesktopConfig::from(args);
    tracing::info!(
        "Video {}x{} at {} fps, output to {}",
        config.width,
        config.height,
        config.frame_loop.target_fps,
        config.output_dir.display()
    );

    let summary = run(&config).await?;

    if let Some(diagnostics) = &summary.diagnostics {
        tracing::info!(
            "Final status: {} (hand detected: {}, pinching: {})",
            diagnostics.status,
            diagnostics.hand_detected,
            diagnostics.pinching
        );
    }
    if summary.exit_requested {
        tracing::info!("Back control was activated during the replay");
    }
    let note = if summary.has_ink {
        ""
    } else {
        " (drawing is empty)"
    };
    tracing::info!(
        "Processed {} frames, wrote {} files{}",
        summary.frames,
        summary.exported.len(),
        note
    );
    Ok(())
}
