use crate::twitch::TwitchClient;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use quadview_proto::protocol::{ErrorResponse, StreamersResponse};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct HttpState {
    pub twitch: Arc<TwitchClient>,
    pub channels: Arc<Vec<String>>,
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/streamers", get(get_streamers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn start_server(
    bind_address: String,
    port: u16,
    state: HttpState,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let tracked = state.channels.len();
        let app = router(state);

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("Listening on http://{}", addr);
        info!("Tracking {} channels", tracked);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

async fn get_streamers(
    State(state): State<HttpState>,
) -> Result<Json<StreamersResponse>, (StatusCode, Json<ErrorResponse>)> {
    if state.channels.is_empty() {
        return Ok(Json(StreamersResponse::default()));
    }

    match state.twitch.fetch_statuses(&state.channels).await {
        Ok(streamers) => Ok(Json(StreamersResponse { streamers })),
        Err(e) => {
            error!("GET /api/streamers: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
