use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use audit_log::{AuditEntry, AuditSink};
use prompt_firewall::{Firewall, Registry};
use secure_gateway::cli::Cli;
use secure_gateway::{api, backend, config, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let loaded = config::load(&cli.config)?;
    let config_found = loaded.is_some();
    let mut cfg = loaded.unwrap_or_default();

    if let Some(ref listen) = cli.listen {
        cfg.network.listen_addr = listen.clone();
    }
    if let Some(ref ext) = cli.extensions {
        cfg.firewall.extensions_file = Some(ext.clone());
    }
    if let Some(ref audit_log) = cli.audit_log {
        cfg.logging.audit_log_path = audit_log.clone();
    }

    // 3. Init tracing-subscriber with JSON format.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    if !config_found {
        config::warn_missing(&cli.config);
    }

    info!(
        config_file = %cli.config.display(),
        listen = %cfg.network.listen_addr,
        audit_log = %cfg.logging.audit_log_path.display(),
        "secure-gateway starting"
    );

    // 4. Start audit logger.
    let (audit, audit_handle) = AuditSink::start(&cfg.logging.audit_log_path)
        .await
        .context("failed to start audit logger")?;

    // 5. Build the firewall.  A registry that fails to load or compile is
    //    fatal: running with missing signatures is silently unsafe.
    let registry = match &cfg.firewall.extensions_file {
        Some(path) => prompt_firewall::load_registry(path)
            .context("failed to load firewall extensions")?,
        None => Registry::builtin(),
    };
    let firewall = Firewall::new(&registry).context("failed to compile firewall registry")?;

    info!(
        signatures = firewall.signature_count(),
        pii_categories = firewall.pii_category_count(),
        "firewall loaded"
    );

    audit
        .log(AuditEntry::info(format!(
            "GATEWAY STARTED | version {} | {} signatures, {} PII categories",
            env!("CARGO_PKG_VERSION"),
            firewall.signature_count(),
            firewall.pii_category_count()
        )))
        .await;

    // 6. Downstream LLM backend.
    let llm = backend::from_config(&cfg.backend).context("failed to build LLM backend")?;
    info!(kind = ?cfg.backend.kind, model = %cfg.backend.model, "LLM backend configured");

    // 7. Router.
    let state = AppState {
        firewall: Arc::new(firewall),
        backend: Arc::from(llm),
        audit: audit.clone(),
        max_body_bytes: cfg.network.max_body_bytes,
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.network.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.network.listen_addr))?;
    info!(addr = %cfg.network.listen_addr, "listening");

    // 8. Serve until SIGINT/SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // 9. Log shutdown and drain the audit writer.
    info!("secure-gateway shutting down");
    audit.log(AuditEntry::info("GATEWAY STOPPED")).await;
    drop(audit);
    audit_handle.await.context("audit writer task panicked")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (ctrl-c)"),
                    _ = sigterm.recv() => info!("received SIGTERM"),
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler");
                ctrl_c.await.ok();
                info!("received SIGINT (ctrl-c)");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT (ctrl-c)");
    }
}
