//! State construction for both servers, extracted from `main.rs`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use tg_broker::{AngelOneClient, BrokerApi};
use tg_domain::config::{Config, ConfigSeverity};
use tg_sessions::{SessionManager, SessionService};

use crate::rpc::{guard, RemoteSessionService, RpcState};
use crate::state::AppState;

/// Log every config issue; fail when any of them is an error.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Validate config and wire the gateway: session service (remote or
/// embedded) plus the broker client.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    check_config(&config)?;

    // ── Session service ──────────────────────────────────────────────
    let sessions: Arc<dyn SessionService> = match &config.session_service.url {
        Some(url) => {
            let remote = RemoteSessionService::from_config(&config)
                .context("creating session service client")?;
            tracing::info!(
                url = %url,
                verify_timeout_ms = config.session_service.verify_timeout_ms,
                "using remote session service"
            );
            Arc::new(remote)
        }
        None => {
            let manager = build_session_manager(&config)?;
            tracing::warn!(
                "session_service.url not set; embedding the session manager in the gateway process"
            );
            spawn_sweeper(&config, manager.clone());
            manager
        }
    };

    // ── Broker client ────────────────────────────────────────────────
    let broker: Arc<dyn BrokerApi> =
        Arc::new(AngelOneClient::new(&config.broker).context("creating broker client")?);
    tracing::info!(base_url = %config.broker.base_url, "broker client ready");

    Ok(AppState::new(config, sessions, broker))
}

/// Validate config and wire the session manager RPC service.
pub fn build_rpc_state(config: &Config) -> anyhow::Result<RpcState> {
    check_config(config)?;

    let manager = build_session_manager(config)?;
    spawn_sweeper(config, manager.clone());

    Ok(RpcState {
        service: manager,
        rpc_token_hash: guard::token_hash_from_env(&config.auth.rpc_token_env),
    })
}

/// A missing or short signing secret stops the process here.
fn build_session_manager(config: &Config) -> anyhow::Result<Arc<SessionManager>> {
    let manager = SessionManager::from_config(&config.auth).with_context(|| {
        format!(
            "initializing session manager (signing secret from {})",
            config.auth.secret_env
        )
    })?;
    tracing::info!(
        issuer = %config.auth.issuer,
        token_ttl_hours = config.auth.token_ttl_hours,
        "session manager ready"
    );
    Ok(Arc::new(manager))
}

/// Periodically drop bundles no live token can reference.  Only runs when
/// `auth.sweep_interval_secs` is set.
fn spawn_sweeper(config: &Config, manager: Arc<SessionManager>) {
    let Some(secs) = config.auth.sweep_interval_secs.filter(|s| *s > 0) else {
        return;
    };
    tracing::info!(interval_secs = secs, "expired-session sweeper enabled");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        loop {
            interval.tick().await;
            manager.purge_expired();
        }
    });
}
