use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    /// Image to open at startup
    #[arg(long, short)]
    pub image: Option<PathBuf>,
}

/// One line typed at the prompt
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create and format an image, or open it if it already exists
    Initfs {
        path: PathBuf,
        /// Total blocks of 1024 bytes
        blocks: usize,
        inodes: usize,
    },
    /// Open an existing image
    Openfs { path: PathBuf },
    /// List the current directory
    Ls,
    Mkdir { name: String },
    Cd { name: String },
    /// Print the current directory
    Pwd,
    /// Copy a host file into the current directory
    Cpin { host: PathBuf, name: String },
    /// Copy a file out to the host
    Cpout { name: String, host: PathBuf },
    Rm { name: String },
    /// Remove an empty directory
    #[command(alias = "remdir")]
    Rmdir { name: String },
    Stat { name: String },
    /// Write the superblock back to the image
    Sync,
    /// Sync and leave
    #[command(aliases = ["q", "exit"])]
    Quit,
}
