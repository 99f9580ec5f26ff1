//! CLI argument definitions for the Nelson binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use nelson::Mode;

/// Where the server gets its answers
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Source {
    /// Assemble answers from the MCP knowledge service (default)
    Retrieval,
    /// Return a fixed demonstration answer without contacting any service
    Demo,
}

/// Nelson-GPT pediatric knowledge assistant
#[derive(Parser, Debug)]
#[command(name = "nelson")]
#[command(about = "Nelson-GPT: evidence-based pediatric answers from the Nelson Textbook")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the chat API server
    Serve(ServeArgs),
    /// Check health of a running Nelson server
    Health(HealthArgs),
    /// Ask a question and stream the answer into the local session history
    Ask(AskArgs),
    /// Inspect and manage the local session history
    Sessions(SessionsArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "NELSON_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "NELSON_HOST")]
    pub host: String,

    /// Answer source
    #[arg(short, long, default_value = "retrieval", env = "NELSON_SOURCE")]
    pub source: Source,

    /// Base URL of the MCP knowledge service
    #[arg(long, default_value = "http://localhost:8000", env = "MCP_SERVER_URL")]
    pub mcp_url: String,

    /// Seconds to wait for the knowledge service before answering without it
    #[arg(long, default_value_t = 8, env = "NELSON_RETRIEVAL_TIMEOUT_SECS")]
    pub retrieval_timeout: u64,

    /// Pause between streamed chunks, in milliseconds
    #[arg(long, default_value_t = 10, env = "NELSON_CHUNK_DELAY_MS")]
    pub chunk_delay_ms: u64,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "NELSON_SERVER_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the ask command
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Response mode: academic or clinical
    #[arg(short, long, default_value = "academic")]
    pub mode: Mode,

    /// Continue this session instead of the current one
    #[arg(long, conflicts_with = "new")]
    pub session: Option<String>,

    /// Start a new session even if one is selected
    #[arg(long)]
    pub new: bool,

    /// URL of the chat server
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "NELSON_SERVER_URL")]
    pub server: String,

    /// Directory holding sessions.json
    #[arg(short = 'D', long, env = "NELSON_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Arguments for the sessions command
#[derive(clap::Args, Debug)]
pub struct SessionsArgs {
    /// Directory holding sessions.json
    #[arg(short = 'D', long, env = "NELSON_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List sessions, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the messages of a session
    Show {
        /// Session id
        id: String,
        /// Print JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },
    /// Rename a session
    Rename {
        /// Session id
        id: String,
        /// New title
        title: String,
    },
    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}
