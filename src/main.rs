// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use viewfinder::backends::camera::{FlashMode, LensFacing, QualityTier};

mod cli;

#[derive(Parser)]
#[command(name = "viewfinder")]
#[command(about = "Camera viewfinder core driven against the virtual camera")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LensArg {
    Back,
    Front,
}

impl From<LensArg> for LensFacing {
    fn from(arg: LensArg) -> Self {
        match arg {
            LensArg::Back => LensFacing::Back,
            LensArg::Front => LensFacing::Front,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FlashArg {
    Off,
    On,
    Auto,
}

impl From<FlashArg> for FlashMode {
    fn from(arg: FlashArg) -> Self {
        match arg {
            FlashArg::Off => FlashMode::Off,
            FlashArg::On => FlashMode::On,
            FlashArg::Auto => FlashMode::Auto,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Photo {
        /// Lens to use
        #[arg(short, long, value_enum, default_value = "back")]
        lens: LensArg,

        /// Flash mode
        #[arg(short, long, value_enum, default_value = "off")]
        flash: FlashArg,

        /// Zoom ratio (clamped to the lens range)
        #[arg(short, long, default_value = "1.0")]
        zoom: f32,

        /// Quality tier: high or balanced (default: saved preference)
        #[arg(short, long, value_parser = cli::parse_quality)]
        quality: Option<QualityTier>,

        /// Tap-to-focus position in preview pixels, e.g. 320,240
        #[arg(long, value_parser = cli::parse_point)]
        tap: Option<(f32, f32)>,

        /// Vertical exposure drag in preview pixels after the tap (negative brightens)
        #[arg(long, allow_hyphen_values = true, requires = "tap")]
        drag: Option<f32>,

        /// Output directory (default: ~/Pictures/Viewfinder)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List captured photos, newest first
    Gallery {
        /// Photos directory (default: ~/Pictures/Viewfinder)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show or change the saved quality preference
    Quality {
        /// New quality tier: high or balanced
        #[arg(value_parser = cli::parse_quality)]
        tier: Option<QualityTier>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=viewfinder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Photo {
            lens,
            flash,
            zoom,
            quality,
            tap,
            drag,
            output,
        } => cli::take_photo(cli::PhotoOptions {
            lens: lens.into(),
            flash: flash.into(),
            zoom,
            quality,
            tap,
            drag,
            output,
        }),
        Commands::Gallery { dir } => cli::list_gallery(dir),
        Commands::Quality { tier } => cli::quality(tier),
    }
}
