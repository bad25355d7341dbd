use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use formrelay::{AppState, Config, create_app};
use formrelay_notification::EmailService;

/// formrelay - contact, newsletter and careers form relay
#[derive(Parser)]
#[command(name = "formrelay")]
#[command(about = "Validates website form submissions and relays them by email", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check that the SMTP server accepts our connection and credentials
    VerifySmtp,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    formrelay::observability::init_observability(
        "formrelay",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
        config.is_production(),
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::VerifySmtp => verify_smtp_command(config).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting formrelay server...");

    let host = host_override.unwrap_or_else(|| config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    let email_service = EmailService::new(&config.email)?;

    match email_service.verify().await {
        Ok(true) => tracing::info!("SMTP server is ready to send emails"),
        Ok(false) => tracing::warn!("SMTP server rejected the connection test"),
        Err(e) => tracing::error!(error = %e, "SMTP connection test failed"),
    }

    let state = AppState::new(config, Arc::new(email_service));
    tracing::info!(
        environment = %state.config.app.environment,
        allowed_origins = ?state.origins.origins(),
        "Application state ready"
    );

    let app = create_app(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn verify_smtp_command(config: Config) -> Result<()> {
    tracing::info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = config.email.smtp_port,
        tls = %config.email.tls,
        "Verifying SMTP connection..."
    );

    let email_service = EmailService::new(&config.email)?;

    if !email_service.verify().await? {
        anyhow::bail!("SMTP server rejected the connection test");
    }

    tracing::info!("SMTP connection verified");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
