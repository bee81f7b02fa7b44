//! Photobooth CLI: composing, headless sessions and gallery administration.
//!
//! Usage:
//!   booth compose <JSON> -o <PNG>       Render a composition file
//!   booth layout <LAYOUT>               Print photo placements
//!   booth session <FRAMES>...           Run one kiosk session from image files
//!   booth gallery <COMMAND>             List, save, or delete gallery photos
//!   booth stickers <COMMAND>            Manage custom stickers
//!   booth send --to <N> --image <REF>   Send an image to a phone number
//!   booth check                         Show configuration and asset status

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "booth",
    about = "Photobooth compositing and kiosk administration",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a composition JSON file to a PNG
    Compose {
        /// Composition file
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the gallery JPEG preview here
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Print the photo placements of a layout
    Layout {
        /// postcard | strips
        layout: String,

        /// Number of supplied photos (defaults to the layout's count)
        #[arg(long)]
        photos: Option<usize>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a kiosk session headlessly, replaying image files as the camera
    Session {
        /// Frames to replay, in capture order
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// postcard | strips (defaults to the configured layout)
        #[arg(short, long)]
        layout: Option<String>,

        /// Built-in sticker to add, repeatable
        #[arg(long = "sticker")]
        stickers: Vec<String>,

        /// Frame color as #rrggbb
        #[arg(long)]
        frame_color: Option<String>,

        /// Phone number to attach to the saved photo
        #[arg(long)]
        recipient: Option<String>,

        /// Write the composite PNG here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Administer the photo gallery
    Gallery {
        /// Admin PIN
        #[arg(long, env = "BOOTH_ADMIN_PIN", hide_env_values = true)]
        pin: String,

        #[command(subcommand)]
        action: commands::gallery::GalleryAction,
    },

    /// Administer custom stickers
    Stickers {
        /// Admin PIN
        #[arg(long, env = "BOOTH_ADMIN_PIN", hide_env_values = true)]
        pin: String,

        #[command(subcommand)]
        action: commands::stickers::StickerAction,
    },

    /// Send an image to a phone number through the messaging relay
    Send {
        /// Admin PIN
        #[arg(long, env = "BOOTH_ADMIN_PIN", hide_env_values = true)]
        pin: String,

        /// Recipient phone number
        #[arg(long)]
        to: String,

        /// Image URL or local file
        #[arg(long)]
        image: String,

        /// Message caption (defaults to the configured caption)
        #[arg(long)]
        caption: Option<String>,
    },

    /// Show configuration and check the built-in sticker assets
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = booth_common::config::AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    booth_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Compose {
            input,
            output,
            preview,
        } => commands::compose::run(input, output, preview).await,
        Commands::Layout {
            layout,
            photos,
            json,
        } => commands::layout::run(&layout, photos, json),
        Commands::Session {
            frames,
            layout,
            stickers,
            frame_color,
            recipient,
            output,
        } => {
            commands::session::run(
                &config,
                commands::session::SessionArgs {
                    frames,
                    layout,
                    stickers,
                    frame_color,
                    recipient,
                    output,
                },
            )
            .await
        }
        Commands::Gallery { pin, action } => commands::gallery::run(config, &pin, action).await,
        Commands::Stickers { pin, action } => commands::stickers::run(&config, &pin, action).await,
        Commands::Send {
            pin,
            to,
            image,
            caption,
        } => commands::send::run(&config, &pin, &to, &image, caption).await,
        Commands::Check => commands::check::run(&config),
    }
}
