use std::sync::Arc;

use incollege_api::config::AppConfig;
use incollege_api::{build_router, run_migrations, AppState};
use incollege_shared::clients::db::{create_pool, get_conn};
use incollege_shared::middleware::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing("incollege-api", config.log_format);
    let port = config.port;

    let db = create_pool(&config.database_url, config.db_pool_size)?;
    {
        let mut conn = get_conn(&db).map_err(|e| anyhow::anyhow!("{e}"))?;
        run_migrations(&mut conn)?;
    }

    let metrics_handle = init_metrics()?;

    let state = Arc::new(AppState {
        db,
        config,
        metrics_handle: Some(metrics_handle),
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "incollege-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
