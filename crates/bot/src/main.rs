use std::sync::Arc;

use anyhow::Context;

use keydrop_bot::config::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env().context("invalid configuration")?;

    keydrop_observability::init_with(config.log_format);
    if config.uses_default_jwt_secret() {
        tracing::warn!("KEYDROP_JWT_SECRET not set; using insecure dev default");
    }

    let services = keydrop_bot::app::services::build_services(&config)
        .with_context(|| format!("failed to load catalog from {}", config.catalog_path.display()))?;
    let supersede = services.engine.supersede_policy();
    let app = keydrop_bot::app::build_app(Arc::new(services), config.jwt_secret.as_bytes());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        admin_role = %config.admin_role,
        supersede = ?supersede,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
