//! `aftercared` — post-discharge patient assistant daemon.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aftercare::agent::create_provider;
use aftercare::config::Settings;
use aftercare::patients::PatientDirectory;
use aftercare::retrieval::RetrievalIndex;
use aftercare::router::Router;
use aftercare::server::{AppState, build_app};
use aftercare::session::SessionStore;
use aftercare::websearch::WebSearchClient;

/// Post-discharge patient assistant daemon.
#[derive(Debug, Parser)]
#[command(name = "aftercared", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1", env = "AFTERCARE_HOST")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000, env = "AFTERCARE_PORT")]
    port: u16,

    /// Path to the patient records JSON file.
    #[arg(long, env = "AFTERCARE_PATIENT_DB")]
    patient_db: Option<PathBuf>,

    /// Path to the reference corpus text document.
    #[arg(long, env = "AFTERCARE_CORPUS")]
    corpus: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "aftercared starting");

    let mut builder = Settings::builder().from_env();
    if let Some(ref path) = args.patient_db {
        builder = builder.patient_db_path(path.clone());
    }
    if let Some(ref path) = args.corpus {
        builder = builder.corpus_path(path.clone());
    }
    let settings = builder.build().context("configuration failed")?;

    let patients = match settings.patient_db_path {
        Some(ref path) => Arc::new(
            PatientDirectory::load(path)
                .with_context(|| format!("loading patient records from {}", path.display()))?,
        ),
        None => {
            warn!("no patient records file configured, using built-in sample roster");
            Arc::new(PatientDirectory::sample())
        }
    };
    info!(patients = patients.len(), "patient directory ready");

    let index = Arc::new(RetrievalIndex::new(
        settings.chunk_size,
        settings.chunk_overlap,
        settings.embed_batch_size,
    ));
    index.initialize(settings.corpus_path.as_deref());
    info!(documents = index.stats().document_count, "retrieval index ready");

    let websearch = Arc::new(WebSearchClient::new(settings.search_api_key.clone()));
    if !websearch.is_configured() {
        warn!("no web search key configured, clinical web search disabled");
    }

    let provider = create_provider(&settings).context("creating reasoning provider")?;
    let router = Router::new(
        Arc::from(provider),
        Arc::clone(&patients),
        Arc::clone(&index),
        websearch,
        settings,
    );

    let state = Arc::new(AppState {
        router,
        sessions: SessionStore::new(),
        patients,
        index,
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install shutdown handler");
    }
}
