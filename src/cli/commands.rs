use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sharenote")]
#[command(version, about = "A note-taking backend with public share links")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Create a note in the local database
    Add {
        /// Note title
        title: String,

        /// Note content
        content: String,

        #[command(flatten)]
        store: StoreArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all notes in the local database
    List {
        #[command(flatten)]
        store: StoreArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note ID
        id: String,

        #[command(flatten)]
        store: StoreArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note by ID
    Delete {
        /// Note ID
        id: String,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, value_name = "PATH", conflicts_with = "memory")]
    pub database: Option<PathBuf>,

    /// Keep notes in memory only
    #[arg(long)]
    pub memory: bool,

    /// Prefix for generated share links
    #[arg(long, value_name = "URL")]
    pub share_base_url: Option<String>,
}
