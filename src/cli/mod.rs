//! CLI module for rolerag
//!
//! Handles command-line argument parsing and the `ask` client.

pub mod args;
pub mod client;

pub use args::{apply_serve_overrides, Args, Commands};
pub use client::QueryClient;
