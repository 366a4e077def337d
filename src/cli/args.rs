//! Command-line argument parsing for rolerag
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// rolerag - role-scoped question answering over a private corpus
#[derive(Parser, Debug)]
#[command(name = "rolerag")]
#[command(version)]
#[command(about = "Answer questions over private documents with per-role visibility", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -v (debug for rolerag), -vv (debug everywhere)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Snapshot index path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Ask a running server a question
    Ask {
        /// The question
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Role to ask as (c-level, employee, engineer, hr, finance, marketing, ...)
        #[arg(short, long, default_value = "employee")]
        role: String,

        /// Server base URL (defaults to the configured bind address)
        #[arg(long)]
        url: Option<String>,
    },

    /// Display current configuration
    Config,
}

impl Args {
    /// Subcommand to run; `serve` with no overrides when omitted
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            store: None,
        })
    }
}

/// Apply `serve` flag overrides onto a loaded configuration
pub fn apply_serve_overrides(
    config: &mut Config,
    host: Option<String>,
    port: Option<u16>,
    store: Option<PathBuf>,
) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(store) = store {
        config.store.path = store.to_string_lossy().into_owned();
    }
}
