use clap::Parser;
use dbagent::{
    agents::AgentSystem,
    cli::{Cli, Command},
    config::Config,
    db::Database,
    demo::run_example,
    error::ApiError,
    llm::OpenAiClient,
    repl::Repl,
    server::{AppState, app_router},
};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const ENDPOINTS: [&str; 5] = [
    "POST /design - Design a database schema",
    "POST /build - Build a database from a schema",
    "POST /sample-data - Add sample data to the database",
    "POST /analyze - Analyze data based on a request",
    "POST /workflow - Run the entire workflow",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg: Config = match cli.config.as_deref() {
        Some(path) => Config::figment_from(path).extract()?,
        None => Config::load()?,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let credential_configured = cfg.llm.credential_configured();
    info!(
        database_path = %cfg.basic.database_path.display(),
        model = %cfg.llm.model,
        base_url = %cfg.llm.base_url,
        proxy = %cfg.llm.proxy.as_ref().map_or("<none>", |u| u.as_str()),
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        credential_configured,
    );

    let llm = Arc::new(OpenAiClient::new(&cfg.llm)?);
    let system = AgentSystem::new(llm, Database::from_config(&cfg.basic));

    match cli.command() {
        Command::Serve => serve(&cfg, system, credential_configured).await,
        Command::Repl | Command::Example if !credential_configured => {
            let err = ApiError::ProviderNotConfigured;
            error!("{err}");
            Err(err.into())
        }
        Command::Repl => {
            let input = BufReader::new(tokio::io::stdin());
            Repl::new(&system, input, tokio::io::stdout()).run().await?;
            Ok(())
        }
        Command::Example => {
            run_example(&system, &mut tokio::io::stdout()).await?;
            Ok(())
        }
    }
}

async fn serve(
    cfg: &Config,
    system: AgentSystem,
    credential_configured: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !credential_configured {
        error!("{}", ApiError::ProviderNotConfigured);
    }

    let app = app_router(AppState::new(system, credential_configured));

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Database Agent System running on {}", addr);
    for endpoint in ENDPOINTS {
        info!("  {endpoint}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
