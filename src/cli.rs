use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "subtitle-matcher")]
#[command(about = "Match subtitle files to the videos in your media libraries and move them alongside")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match subtitles (files, directories or packs) and move them next to their videos
    Process(ProcessArgs),

    /// Index media libraries and write their caches
    Scan {
        /// Only scan this library
        #[arg(long)]
        library: Option<String>,
    },

    /// Show or edit the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Subtitle files, directories or subtitle packs
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Language tag to put between the video name and the extension
    #[arg(long, conflicts_with = "keep_suffix")]
    pub lang: Option<String>,

    /// Keep the text that follows the episode number in the subtitle name
    #[arg(long)]
    pub keep_suffix: bool,

    /// Replace subtitles that already exist at the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Minimum score for a match (defaults to the configured threshold)
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Match against library caches written by `scan` instead of walking the libraries
    #[arg(long)]
    pub use_cache: bool,

    /// Match on season and episode alone when no show name is close enough
    #[arg(long)]
    pub ignore_show_name: bool,

    /// Show what would be moved without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show,

    /// Register a media library
    AddLibrary {
        path: PathBuf,

        /// Library name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Unregister a media library
    RemoveLibrary { name: String },
}
