//! CLI command handlers

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, warn};

use super::output::{self, OutputFormat, PlaylistRow, TrackRow};
use super::TokenStore;
use crate::error::ExportError;
use crate::export::{BatchOutcome, CatalogFetcher, ExportEngine, ExportOptions, LinkResolver};
use crate::yandex::{ClientConfig, Track, YandexClient};

/// Global settings shared by every command
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Option<String>,
    pub user: String,
    pub output: OutputFormat,
    pub api_url: String,
    pub show_progress: bool,
}

impl Session {
    /// Build an API client; fails before any request when no token is configured
    fn client(&self) -> Result<YandexClient> {
        let token = TokenStore::resolve(self.token.clone())?;
        let client = YandexClient::new(ClientConfig::new(token).with_base_url(&self.api_url))?;
        Ok(client)
    }
}

/// Handle the `auth` command
pub async fn auth(session: &Session, logout: bool) -> Result<()> {
    if logout {
        TokenStore::clear()?;
        println!("{}", "Stored token removed.".green());
        return Ok(());
    }

    println!("{}", "Verifying Yandex Music token...".cyan());

    let login = TokenStore::authenticate(session.token.clone(), &session.api_url).await?;

    println!();
    println!("{}", "Authentication successful!".green().bold());
    println!("  Account: {}", login);
    println!();
    println!("Token stored securely in system keyring.");

    Ok(())
}

/// Handle the `list-playlists` command
pub async fn list_playlists(session: &Session) -> Result<()> {
    let client = session.client()?;
    let playlists = CatalogFetcher::new(&client).playlists(&session.user).await?;

    let rows: Vec<PlaylistRow> = playlists.iter().map(PlaylistRow::new).collect();
    match session.output {
        OutputFormat::Json => println!("{}", output::to_json(&rows)?),
        OutputFormat::Text => {
            for row in &rows {
                println!("{}", row.text_line());
            }
        }
    }

    Ok(())
}

/// Handle the `playlist` command
pub async fn playlist(session: &Session, id: &str) -> Result<()> {
    require("playlist", "--id", id)?;
    let client = session.client()?;
    let tracks = CatalogFetcher::new(&client)
        .playlist_tracks(&session.user, id)
        .await?;
    print_tracks(session, &client, &tracks).await
}

/// Handle the `likes` command
pub async fn likes(session: &Session) -> Result<()> {
    let client = session.client()?;
    let tracks = CatalogFetcher::new(&client)
        .liked_tracks(&session.user)
        .await?;
    print_tracks(session, &client, &tracks).await
}

/// Handle the `album` command
pub async fn album(session: &Session, id: &str) -> Result<()> {
    require("album", "--id", id)?;
    let client = session.client()?;
    let tracks = CatalogFetcher::new(&client).album_tracks(id).await?;
    print_tracks(session, &client, &tracks).await
}

/// Handle the `download-playlist` command
pub async fn download_playlist(session: &Session, id: &str, to: &Path) -> Result<()> {
    require("download-playlist", "--id", id)?;
    require_destination("download-playlist", to)?;
    let client = session.client()?;

    println!("{}", "Fetching playlist...".cyan());
    let tracks = CatalogFetcher::new(&client)
        .playlist_tracks(&session.user, id)
        .await?;

    download(session, &client, tracks, to).await
}

/// Handle the `download-likes` command
pub async fn download_likes(session: &Session, to: &Path) -> Result<()> {
    require_destination("download-likes", to)?;
    let client = session.client()?;

    println!("{}", "Fetching liked tracks...".cyan());
    let tracks = CatalogFetcher::new(&client)
        .liked_tracks(&session.user)
        .await?;

    download(session, &client, tracks, to).await
}

/// Handle the `download-album` command
pub async fn download_album(session: &Session, id: &str, to: &Path) -> Result<()> {
    require("download-album", "--id", id)?;
    require_destination("download-album", to)?;
    let client = session.client()?;

    println!("{}", "Fetching album...".cyan());
    let tracks = CatalogFetcher::new(&client).album_tracks(id).await?;

    download(session, &client, tracks, to).await
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    generate(shell, &mut cmd, "ymexport", &mut io::stdout());
}

async fn download(
    session: &Session,
    client: &YandexClient,
    tracks: Vec<Track>,
    to: &Path,
) -> Result<()> {
    println!("Found {} tracks", tracks.len().to_string().bold());

    let mut options = ExportOptions::new(PathBuf::from(to));
    if !session.show_progress {
        options = options.quiet();
    }
    let engine = ExportEngine::new(client, options);
    engine.prepare().await?;
    println!("Saving to {}", engine.destination().display().to_string().cyan());
    println!();

    let outcome = engine.run(&tracks).await;
    print_summary(&outcome);

    Ok(())
}

fn print_summary(outcome: &BatchOutcome) {
    println!();
    println!("{}", "Export complete".green().bold());
    println!("  Downloaded: {}", outcome.downloaded.to_string().green());
    println!("  Skipped:    {}", outcome.skipped.to_string().yellow());
    if outcome.failed > 0 {
        println!("  Failed:     {}", outcome.failed.to_string().red());
    } else {
        println!("  Failed:     {}", outcome.failed);
    }
    println!("  Total:      {}", outcome.total());
}

/// Resolve a link per track and print the listing
///
/// A track whose link cannot be resolved is still listed, with an empty link.
async fn print_tracks(session: &Session, client: &YandexClient, tracks: &[Track]) -> Result<()> {
    let resolver = LinkResolver::new(client);
    let mut rows = Vec::with_capacity(tracks.len());

    for track in tracks {
        let link = match track.canonical_id() {
            Some(id) => match resolver.resolve(&id).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Could not resolve link for {}: {}", track.title, e);
                    None
                }
            },
            None => {
                warn!("Track without id: {}", track.title);
                None
            }
        };
        rows.push(TrackRow::new(track, link));
    }

    debug!("Resolved {} track rows", rows.len());

    match session.output {
        OutputFormat::Json => println!("{}", output::to_json(&rows)?),
        OutputFormat::Text => {
            for row in &rows {
                println!("{}", row.text_line());
            }
        }
    }

    Ok(())
}

fn require(subcommand: &str, flag: &str, value: &str) -> Result<(), ExportError> {
    if value.trim().is_empty() {
        return Err(usage_error(subcommand, format!("{flag} must not be empty")));
    }
    Ok(())
}

fn require_destination(subcommand: &str, to: &Path) -> Result<(), ExportError> {
    if to.as_os_str().is_empty() {
        return Err(usage_error(subcommand, "--to must not be empty".to_string()));
    }
    Ok(())
}

/// Print the subcommand's help to stderr and build the matching error
fn usage_error(subcommand: &str, message: String) -> ExportError {
    if let Some(help) = usage_text(subcommand) {
        eprintln!("{help}");
    }
    ExportError::Usage(message)
}

/// Rendered help for one subcommand
fn usage_text(subcommand: &str) -> Option<String> {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    cmd.build();
    cmd.find_subcommand_mut(subcommand)
        .map(|sub| sub.render_help().to_string())
}
