//! rolerag - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::time::Duration;
use tracing::{error, info};

use rolerag::{
    cli::{apply_serve_overrides, Args, Commands, QueryClient},
    config::Config,
    logging,
    server::{self, AppState},
    service::{self, PipelineState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    logging::init(&logging::filter_for_verbosity(&config.logging.filter, args.verbose));

    match args.subcommand() {
        Commands::Serve { host, port, store } => {
            apply_serve_overrides(&mut config, host, port, store);
            config.validate()?;
            serve(config).await
        }
        Commands::Ask { question, role, url } => {
            let url = url.unwrap_or_else(|| format!("http://{}", config.bind_addr()));
            ask(&url, &question, &role).await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Bind, start the pipeline in the background, serve until Ctrl-C or startup failure
async fn serve(config: Config) -> Result<()> {
    let state = PipelineState::new();
    let timeout = match config.server.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let app = server::router(AppState::new(state.clone(), timeout));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    let (failed_tx, failed_rx) = tokio::sync::oneshot::channel::<()>();
    let startup_state = state.clone();
    tokio::spawn(async move {
        // Model download and weight loading block
        let capabilities =
            tokio::task::block_in_place(|| service::capabilities_from_config(&config));

        let outcome = match capabilities {
            Ok((embedder, completer)) => {
                service::start(&startup_state, &config, embedder, completer).await
            }
            Err(err) => {
                error!(error = %err, "Startup failed");
                let _ = startup_state.mark_failed(err.to_string());
                Err(err)
            }
        };

        if outcome.is_err() {
            let _ = failed_tx.send(());
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
                Ok(()) = failed_rx => {}
            }
        })
        .await
        .context("Server error")?;

    match state.failure() {
        Some(cause) => anyhow::bail!("Refusing to serve: {}", cause),
        None => Ok(()),
    }
}

/// Terminal client for a running server
async fn ask(url: &str, question: &str, role: &str) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Please enter a question.");
    }

    let client = QueryClient::new(url)?;
    let response = client
        .ask(question, role)
        .await
        .with_context(|| format!("Query to {} failed", url))?;

    println!("{}", "Answer".bold().green());
    println!("{}\n", response.answer);
    println!("{} {}", "Sources".bold().cyan(), format!("(role: {})", response.user_role).dimmed());
    if response.sources.is_empty() {
        println!("{}", "(no documents visible to this role)".dimmed());
    } else {
        println!("{}", response.sources);
    }
    Ok(())
}
