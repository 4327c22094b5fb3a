use anyhow::Context;
use clap::{Parser, Subcommand};
use database_layer::DatabasePool;
use lexilog_server::{create_app, LexilogServer, ServerConfig, MIGRATOR};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexilog-server", about = "Study-log API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listen_addr = config.listen_addr.clone();
    let server = LexilogServer::new(config).await?;
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;

    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn migrate(config: ServerConfig) -> anyhow::Result<()> {
    let db = DatabasePool::new(&config.database_url).await?;
    db.run_migrations(&MIGRATOR).await?;

    Ok(())
}
