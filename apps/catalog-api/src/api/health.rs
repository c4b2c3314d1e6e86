//! Readiness endpoint

use axum::{extract::State, response::Response, routing::get, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
}

/// Ready when MongoDB answers a ping and the uploads directory exists
async fn ready(State(state): State<AppState>) -> Response {
    let client = state.mongo_client.clone();
    let uploads_dir = state.config.catalog.uploads_dir.clone();

    let checks: Vec<(&str, HealthCheckFuture)> = vec![
        (
            "mongodb",
            Box::pin(async move {
                let status = database::mongodb::check_health_detailed(&client).await;
                if status.healthy {
                    Ok(())
                } else {
                    Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
                }
            }),
        ),
        (
            "uploads",
            Box::pin(async move {
                match tokio::fs::metadata(&uploads_dir).await {
                    Ok(meta) if meta.is_dir() => Ok(()),
                    Ok(_) => Err(format!("{} is not a directory", uploads_dir.display())),
                    Err(e) => Err(e.to_string()),
                }
            }),
        ),
    ];

    run_health_checks(checks).await
}
