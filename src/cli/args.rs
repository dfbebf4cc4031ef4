//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate Markdown documentation from Python sources
#[derive(Parser, Debug)]
#[command(name = "docmark")]
#[command(about = "Generate Markdown documentation from Python sources")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate documentation for the configured modules
    Build {
        /// Module roots, replacing the configured ones
        modules: Vec<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not namespace pages under the module root name
        #[arg(long)]
        no_root_directories: bool,

        /// Document files starting with a dot
        #[arg(long)]
        include_dot_files: bool,

        /// Document files starting with an underscore
        #[arg(long)]
        include_underscore_files: bool,

        /// Glob patterns to skip (can be repeated)
        #[arg(long)]
        ignore: Vec<String>,

        /// Keep functions and classes in declaration order
        #[arg(long)]
        keep_order: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove previously generated documentation
    Clean {
        /// Module roots, replacing the configured ones
        modules: Vec<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the description of one Python file as JSON
    Inspect {
        /// Python source file
        file: PathBuf,
    },

    /// Show version information
    Version,
}
