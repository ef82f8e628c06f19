//! Scriptorium CLI and web entry point.
//!
//! Binary name: `scriptorium`
//!
//! Parses CLI arguments, loads configuration and credentials, wires the
//! generation flows, then dispatches to a command or starts the server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use scriptorium_infra::config::load_config;
use scriptorium_infra::credentials::load_dotenv;
use scriptorium_observe::tracing_setup::{
    TracingOptions, init_tracing, shutdown_tracing, verbosity_filter,
};
use scriptorium_types::error::ConfigError;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or credentials
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "scriptorium", &mut std::io::stdout());
        return Ok(());
    }

    let dotenv = load_dotenv();
    let loaded = load_config(cli.config.as_deref()).await;

    init_tracing(&TracingOptions {
        default_filter: verbosity_filter(cli.verbose, cli.quiet).to_string(),
        json: loaded.config.logging.json,
        otel: loaded.config.logging.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    dotenv.report();
    loaded.report();

    let result = run(cli, loaded.config).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, config: scriptorium_types::config::AppConfig) -> anyhow::Result<()> {
    let server = config.server.clone();

    // The API key is resolved before any provider or network client exists.
    let state = match AppState::init(config).await {
        Ok(state) => state,
        Err(err) => {
            if let Some(config_err @ ConfigError::MissingApiKey { .. }) = err.downcast_ref::<ConfigError>() {
                eprintln!();
                eprintln!("  {} {config_err}", style("✗").red().bold());
                eprintln!();
                shutdown_tracing();
                std::process::exit(2);
            }
            return Err(err);
        }
    };

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(server.host);
            let port = port.unwrap_or(server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Scriptorium listening on {}",
                    style("⚡").bold(),
                    style(format!("http://{addr}")).cyan()
                );
                println!("  {}", style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, "server started");

            let sweeper = state.spawn_session_sweeper();
            let router = http::router::build_router(state);
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await;
            sweeper.abort();
            served?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Essay { topic, revisions } => {
            cli::essay::write_essay(&state, topic, revisions, cli.json).await?;
        }

        Commands::Analysts {
            topic,
            max_analysts,
        } => {
            cli::research::list_analysts(&state, topic, max_analysts, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
