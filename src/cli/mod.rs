//! CLI module for ymexport

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod auth;
pub mod commands;
pub mod output;

pub use auth::TokenStore;
pub use output::OutputFormat;

use crate::config::{API_URL_VAR, TOKEN_VAR};
use crate::yandex::client::DEFAULT_BASE_URL;

#[derive(Parser, Debug)]
#[command(
    name = "ymexport",
    about = "Export Yandex Music playlists and liked tracks to tagged MP3 files"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// OAuth access token (falls back to the keyring)
    #[arg(long, global = true, env = TOKEN_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// Account to read from; "me" is the token's owner
    #[arg(long, global = true, default_value = "me")]
    pub user: String,

    /// Output format for listings
    #[arg(long = "out", global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// API base URL
    #[arg(long, global = true, env = API_URL_VAR, default_value = DEFAULT_BASE_URL, hide = true)]
    pub api_url: String,

    /// Do not draw per-track progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify an access token and store it in the system keyring
    Auth {
        /// Remove the stored token instead
        #[arg(long)]
        logout: bool,
    },

    /// List a playlist's tracks with MP3 links
    Playlist {
        /// Playlist kind or UUID
        #[arg(long = "id", value_name = "ID")]
        id: String,
    },

    /// List liked tracks with MP3 links
    #[command(alias = "favorites")]
    Likes,

    /// List an album's tracks with MP3 links
    Album {
        /// Album id
        #[arg(long = "id", value_name = "ID")]
        id: String,
    },

    /// List the account's playlists
    ListPlaylists,

    /// Download every track of a playlist into a folder
    DownloadPlaylist {
        /// Playlist kind or UUID
        #[arg(long = "id", value_name = "ID")]
        id: String,

        /// Destination folder (created if missing)
        #[arg(long, value_name = "DIR")]
        to: PathBuf,
    },

    /// Download all liked tracks into a folder
    DownloadLikes {
        /// Destination folder (created if missing)
        #[arg(long, value_name = "DIR")]
        to: PathBuf,
    },

    /// Download every track of an album into a folder
    DownloadAlbum {
        /// Album id
        #[arg(long = "id", value_name = "ID")]
        id: String,

        /// Destination folder (created if missing)
        #[arg(long, value_name = "DIR")]
        to: PathBuf,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
