// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List notes with their image URLs
    List {
        /// Output notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note, optionally attaching an image
    Create {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(value_name = "DESCRIPTION")]
        description: String,

        /// Image file to attach
        #[arg(short, long, value_name = "FILE")]
        image: Option<PathBuf>,

        /// Output the resulting notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note and its image
    Delete {
        #[arg(value_name = "NOTE_ID")]
        id: String,

        /// Note name, used to find the image when the note is not listed
        #[arg(value_name = "NAME")]
        name: String,

        /// Output the resulting notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
