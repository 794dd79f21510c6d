use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::Priority;
use crate::panel::PageKind;

#[derive(Parser, Debug)]
#[command(
    name = "torprops",
    version,
    about = "Inspect and edit the properties of a torrent",
    author = "torprops contributors"
)]
pub struct Cli {
    /// Verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to config.toml in the config directory)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Resume data file (defaults to <info hash>.json in the resume directory)
    #[arg(long = "resume", value_name = "FILE", global = true)]
    pub resume: Option<PathBuf>,

    /// Save path used when there is no resume data yet
    /// (defaults to the directory holding the .torrent file)
    #[arg(long = "save-path", value_name = "DIR", global = true)]
    pub save_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one page of a torrent's properties
    Show(ShowArgs),
    /// Rename a file or a folder of a torrent
    Rename(RenameArgs),
    /// Set the download priority of files or folders
    Priority(PriorityArgs),
    /// List, add or remove URL seeds
    Seeds(SeedsArgs),
    /// Move the torrent's data to another directory
    Move(MoveArgs),
    /// Verify the data on disk against the piece hashes
    Recheck(RecheckArgs),
    /// Print the location on disk of a file or folder
    Open(OpenArgs),
    /// Refresh a page periodically
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Page to show
    #[arg(short = 'p', long = "page", value_enum, default_value = "main")]
    pub page: PageKind,

    /// Print the page as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// File or folder to rename, as a `/` separated path in the file tree
    #[arg(value_name = "PATH")]
    pub path: String,

    /// New name of the file or folder
    #[arg(value_name = "NEW_NAME")]
    pub new_name: String,
}

#[derive(Args, Debug)]
pub struct PriorityArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// ignored, normal, high or maximum
    #[arg(value_name = "LEVEL")]
    pub level: Priority,

    /// Files or folders to change
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SeedsArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    #[command(subcommand)]
    pub action: SeedsAction,
}

#[derive(Subcommand, Debug)]
pub enum SeedsAction {
    /// List the URL seeds
    List,
    /// Add a URL seed
    Add {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Remove URL seeds
    Remove {
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// New save path; `~` and environment variables are expanded
    #[arg(value_name = "DIR")]
    pub dir: String,
}

#[derive(Args, Debug)]
pub struct RecheckArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// File or folder, as a `/` separated path in the file tree
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// The .torrent file
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Page to show (defaults to the last page watched)
    #[arg(short = 'p', long = "page", value_enum)]
    pub page: Option<PageKind>,

    /// Stop after this many refreshes
    #[arg(short = 'n', long = "ticks", value_name = "N")]
    pub ticks: Option<u64>,
}
