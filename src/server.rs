use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};

use crate::coloring::AlgorithmMode;
use crate::config::ServerConfig;
use crate::data::{TimetableRequest, TimetableResponse};
use crate::solver;

async fn generate_handler(
    Json(input): Json<TimetableRequest>,
) -> Result<Json<TimetableResponse>, (StatusCode, String)> {
    match solver::solve(&input) {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            warn!("Rejected timetable request: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn algorithms_handler() -> Json<Vec<&'static str>> {
    Json(AlgorithmMode::names())
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/algorithms", get(algorithms_handler))
        .route("/health", get(health_handler))
}

pub async fn run_server(config: &ServerConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await?;
    Ok(())
}
