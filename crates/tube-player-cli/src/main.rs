//! Tube Player CLI - Headless driver for the video player component
//!
//! Features:
//! - Simulate engine lifecycle events against a mounted player
//! - Reproduce context menu gestures
//! - Print the Plyr options and source objects for a set of props
//! - Resolve posters through the image CDN

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tube_player_core::Position;

mod commands;
mod output;

/// Tube Player CLI - Video player QA toolkit
#[derive(Parser)]
#[command(name = "tube-player")]
#[command(version)]
#[command(about = "Headless driver for the Tube video player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where the player props come from
#[derive(clap::Args, Debug, Clone)]
pub struct PropsArgs {
    /// JSON file with player props
    #[arg(short, long, conflicts_with = "source")]
    pub props: Option<PathBuf>,

    /// Video source URL
    #[arg(short, long)]
    pub source: Option<String>,

    /// Raw poster URL
    #[arg(long, default_value = "")]
    pub poster: String,

    /// Start time in seconds
    #[arg(short, long)]
    pub time: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a player against a simulated engine and fire events
    Simulate {
        #[command(flatten)]
        props: PropsArgs,

        /// Events to fire, in order
        #[arg(short, long, value_delimiter = ',', default_value = "ready,loadedmetadata")]
        events: Vec<String>,

        /// Number of renders before events fire
        #[arg(short, long, default_value = "1")]
        renders: u32,

        /// Right-click at X,Y (repeatable)
        #[arg(long = "right-click", value_parser = parse_position)]
        right_clicks: Vec<Position>,

        /// Dismiss the context menu after the clicks
        #[arg(long)]
        hide: bool,

        /// Engine reports no source after mount
        #[arg(long)]
        unbound: bool,

        /// Delay between events in milliseconds
        #[arg(long, default_value = "25")]
        delay_ms: u64,
    },

    /// Print the engine options and source for a set of props
    Options {
        #[command(flatten)]
        props: PropsArgs,
    },

    /// Resolve a poster through the image CDN
    Poster {
        /// Raw poster URL
        poster: String,

        /// Video source used as fallback
        #[arg(short, long)]
        source: String,

        /// CDN transformation name
        #[arg(long)]
        transform: Option<String>,
    },

    /// List the default player controls
    Controls,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Position::new(x, y))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    tube_player_core::init();

    match cli.command {
        Commands::Simulate {
            props,
            events,
            renders,
            right_clicks,
            hide,
            unbound,
            delay_ms,
        } => {
            let settings = commands::SimulateSettings {
                events,
                renders,
                right_clicks,
                hide,
                unbound,
                delay_ms,
            };
            commands::simulate(&props, settings, &cli.format).await?;
        }
        Commands::Options { props } => {
            commands::options(&props, &cli.format)?;
        }
        Commands::Poster { poster, source, transform } => {
            commands::poster(&poster, &source, transform, &cli.format)?;
        }
        Commands::Controls => {
            commands::controls(&cli.format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("10,20.5").unwrap(), Position::new(10.0, 20.5));
        assert_eq!(parse_position(" 1 , 2 ").unwrap(), Position::new(1.0, 2.0));
        assert!(parse_position("10").is_err());
        assert!(parse_position("a,b").is_err());
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "tube-player",
            "simulate",
            "--source",
            "https://v/a.mp4",
            "--time",
            "42",
            "--events",
            "ready,loadedmetadata,loadedmetadata",
            "--right-click",
            "5,6",
            "--right-click",
            "7,8",
        ])
        .unwrap();

        match cli.command {
            Commands::Simulate { props, events, right_clicks, .. } => {
                assert_eq!(props.time, Some(42.0));
                assert_eq!(events.len(), 3);
                assert_eq!(right_clicks, vec![Position::new(5.0, 6.0), Position::new(7.0, 8.0)]);
            }
            _ => panic!("expected simulate"),
        }
    }
}
