// src/engine.rs
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, warn};

use rusbit_meta::bencode::{bvalue_to_json, parse};
use rusbit_meta::config::{Config, DEFAULT_CONFIG_PATH};
use rusbit_meta::torrent::Torrent;
use rusbit_meta::tracker::{AnnounceRequest, HttpTracker, TrackerEvent};
use rusbit_meta::utils;

#[derive(Debug, Parser)]
#[command(name = "rusbit-meta", version, about = "Inspect torrent files and query trackers")]
pub struct Cli {
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a bencoded string and print it as JSON.
    Decode { value: String },
    /// Print the metadata of a .torrent file.
    Info {
        path: PathBuf,
        /// Print a JSON summary instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Announce to the torrent's trackers and print the returned peers.
    Peers { path: PathBuf },
}

pub async fn use_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Decode { value } => {
            let decoded = parse(value.as_bytes()).context("decoding bencode")?;
            println!("{}", serde_json::to_string(&bvalue_to_json(&decoded))?);
        }
        Command::Info { path, json } => {
            let torrent = Torrent::from_file(&path)
                .with_context(|| format!("reading torrent {}", path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&torrent)?);
            } else {
                print_info(&torrent);
            }
        }
        Command::Peers { path } => {
            let config = Config::load(&cli.config)?;
            let torrent = Torrent::from_file(&path)
                .with_context(|| format!("reading torrent {}", path.display()))?;
            announce(&config, &torrent).await?;
        }
    }
    Ok(())
}

fn print_info(torrent: &Torrent) {
    println!("Info Hash: {}", torrent.info_hash());
    println!("Tracker URL: {}", torrent.announce());
    for tracker in torrent.trackers() {
        println!("Tracker: {}", tracker);
    }
    println!("Name: {}", torrent.name());
    if let Some(comment) = torrent.comment() {
        println!("Comment: {}", comment);
    }
    if let Some(created_by) = torrent.created_by() {
        println!("Created By: {}", created_by);
    }
    if let Some(date) = torrent.creation_date() {
        println!("Creation Date: {}", date);
    }
    println!("Length: {}", torrent.total_size());
    println!("Piece Length: {}", torrent.piece_length());
    println!("Number of Pieces: {}", torrent.piece_count());

    for file in torrent.files() {
        println!("File: {} ({} bytes at offset {})", file.path.display(), file.length, file.offset);
    }
    for piece_hash in torrent.piece_hashes() {
        println!("{}", piece_hash);
    }
}

/// Tries each HTTP tracker in order until one answers.
async fn announce(config: &Config, torrent: &Torrent) -> anyhow::Result<()> {
    let tracker = HttpTracker::new(config.request_timeout(), &config.user_agent)?;
    let mut request = AnnounceRequest::new(
        *torrent.info_hash(),
        utils::generate_peer_id(&config.peer_id_prefix),
        config.listen_port,
        torrent.total_size(),
    );
    request.event = TrackerEvent::Started;
    request.numwant = Some(config.numwant);

    for url in torrent.trackers() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            info!("skipping non-HTTP tracker {}", url);
            continue;
        }
        match tracker.announce(url, &request).await {
            Ok(response) => {
                info!(
                    "{} returned {} peers ({} seeders, {} leechers)",
                    url,
                    response.peers().len(),
                    response.complete(),
                    response.incomplete()
                );
                for peer in response.peers() {
                    println!("{}", peer);
                }
                return Ok(());
            }
            Err(e) => warn!("announce to {} failed: {}", url, e),
        }
    }

    bail!("no tracker returned peers for {}", torrent.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_command() {
        let cli = Cli::try_parse_from(["rusbit-meta", "info", "a.torrent", "--json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(matches!(cli.command, Command::Info { json: true, .. }));
    }

    #[test]
    fn test_parse_config_flag() {
        let cli =
            Cli::try_parse_from(["rusbit-meta", "--config", "x.toml", "peers", "a.torrent"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(cli.command, Command::Peers { .. }));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["rusbit-meta"]).is_err());
    }

    #[tokio::test]
    async fn test_decode_command() {
        let cli = Cli::try_parse_from(["rusbit-meta", "decode", "d3:bari42e3:fool1:aee"]).unwrap();
        assert!(use_command(cli).await.is_ok());
    }

    #[tokio::test]
    async fn test_decode_command_rejects_bad_input() {
        for value in ["i42", "i42eX", "x"] {
            let cli = Cli::try_parse_from(["rusbit-meta", "decode", value]).unwrap();
            let err = use_command(cli).await.unwrap_err();
            assert!(err.to_string().contains("decoding bencode"), "{}", err);
        }
    }
}
