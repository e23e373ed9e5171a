// rest/mod.rs — REST API server.
//
// Axum HTTP server bridging REST calls to the task manager.
//
// Endpoints:
//   GET    /tasks/?completed={true|false}
//   POST   /tasks/
//   PUT    /tasks/{id}
//   DELETE /tasks/{id}
//   PATCH  /tasks/{id}/complete
//   DELETE /tasks/clear
//   GET    /health

pub mod routes;

use anyhow::Result;
use axum::{
    routing::{delete, get, patch, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no state beyond uptime)
        .route("/health", get(routes::health::health))
        // Tasks
        .route(
            "/tasks/",
            get(routes::tasks::list_tasks).post(routes::tasks::add_task),
        )
        // Static segment wins over `{id}`, so `clear` never captures.
        .route("/tasks/clear", delete(routes::tasks::delete_all))
        .route(
            "/tasks/{id}",
            put(routes::tasks::edit_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/{id}/complete", patch(routes::tasks::mark_completed))
        // The frontend is served separately; let it call us from any origin.
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
