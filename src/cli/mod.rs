//! CLI for ragbot
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.
//! Each pipeline stage is a subcommand; `start` runs the preflight checks and
//! then serves.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragbot - question answering over a PDF collection
#[derive(Parser, Debug)]
#[command(
    name = "ragbot",
    version,
    about = "Retrieval-augmented question answering over a PDF collection",
    long_about = "Extracts text and tables from PDFs, attaches image captions, builds a\n\
                  vector index and answers questions over HTTP with a local Ollama model.",
    after_help = "EXAMPLES:\n    \
                  ragbot init                   # Write ragbot.toml\n    \
                  ragbot extract                # PDFs -> page records\n    \
                  ragbot merge                  # Attach image captions\n    \
                  ragbot build-index            # Chunk, embed and persist\n    \
                  ragbot start                  # Preflight checks, then serve"
)]
pub struct Cli {
    /// Path to the configuration file (defaults apply if it is missing)
    #[arg(short, long, default_value = "ragbot.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter ragbot.toml, .env.example and .gitignore
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Generation model
        #[arg(long, default_value = "mistral")]
        model: String,

        /// Embedding model
        #[arg(long, default_value = "nomic-embed-text")]
        embedding_model: String,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Extract text and tables from every PDF into page records
    Extract {
        /// Directory containing the PDFs
        #[arg(long)]
        pdf_dir: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Attach image captions to page records
    Merge {
        /// Page records to update in place
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Captions text file
        #[arg(long)]
        captions: Option<PathBuf>,
    },

    /// Chunk and embed page records, then save the vector index
    BuildIndex {
        /// Page records to index
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Index output directory
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },

    /// Serve POST /ask
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check Ollama, the models and the index
    Check,

    /// Run the checks, then serve (exits with status 1 if a check fails)
    Start {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration information
    Config {
        /// Print the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
