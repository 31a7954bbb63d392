//! Command-line surface of the `litefs` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A synchronous file-access layer for scripting hosts
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    /// JSON config file
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer line-delimited JSON requests from stdin until EOF
    Serve,
    /// Print HOME, TEMP, UUID and MODEL
    Constants,
    /// Print type, length and modification time of a path
    Stat { path: PathBuf },
    /// Print 0 (absent), 1 (directory) or 2 (regular file)
    Exists { path: PathBuf },
    /// List the children of a directory
    Ls { path: PathBuf },
    /// Remove a file or directory tree
    Rm { path: PathBuf },
    /// Move a file or directory to a path that does not exist yet
    Mv { src: PathBuf, dst: PathBuf },
    /// Copy a regular file to a path that does not exist yet
    Cp { src: PathBuf, dst: PathBuf },
    /// Create an empty file
    Touch {
        path: PathBuf,
        /// Create missing parent directories as well
        #[arg(short = 'p', long = "parents")]
        parents: bool,
    },
    /// Create a directory
    Mkdir {
        path: PathBuf,
        /// Create missing parent directories as well
        #[arg(short = 'p', long = "parents")]
        parents: bool,
    },
    /// Print a file's contents as hex, read through a descriptor
    Cat {
        path: PathBuf,
        /// Bytes per read call
        #[arg(long = "chunk", value_name = "BYTES", default_value_t = 4096)]
        chunk: i64,
    },
}
