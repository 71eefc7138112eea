//! ymexport - Export Yandex Music playlists and likes to tagged MP3 files

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod error;
mod export;
mod utils;
mod yandex;

use cli::commands::{self, Session};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so clap sees variables from .env
    let env_file = config::load_env();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "ymexport=debug,reqwest=debug"
    } else {
        "ymexport=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &env_file {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let session = Session {
        token: cli.token,
        user: cli.user,
        output: cli.output,
        api_url: cli.api_url,
        show_progress: !cli.no_progress,
    };

    match cli.command {
        Commands::Auth { logout } => commands::auth(&session, logout).await?,
        Commands::Playlist { id } => commands::playlist(&session, &id).await?,
        Commands::Likes => commands::likes(&session).await?,
        Commands::Album { id } => commands::album(&session, &id).await?,
        Commands::ListPlaylists => commands::list_playlists(&session).await?,
        Commands::DownloadPlaylist { id, to } => {
            commands::download_playlist(&session, &id, &to).await?
        }
        Commands::DownloadLikes { to } => commands::download_likes(&session, &to).await?,
        Commands::DownloadAlbum { id, to } => commands::download_album(&session, &id, &to).await?,
        Commands::Completion { shell } => commands::completion(shell),
    }

    Ok(())
}
