use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::error::MatrixError;
use crate::saving::{DataStore, JsonFileStore};
use crate::upsert::{self, SubmitRequest};

pub struct AppState {
    store: Arc<dyn DataStore>,
    // Serializes load -> append -> save so concurrent submits don't drop each other.
    write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        AppState {
            store,
            write_lock: Mutex::new(()),
        }
    }
}

#[derive(Serialize)]
struct SubmitResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the router: the JSON API plus the front-end bundle for every other path.
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/data", get(get_data))
        .route("/api/submit", post(submit_entry))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Setup app state
    let store = Arc::new(JsonFileStore::new(&config.data_file));
    let app_state = Arc::new(AppState::new(store));

    let app = router(app_state, &config.static_dir);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    log::info!(
        "Listening on http://{} (data: {}, static: {})",
        addr,
        config.data_file.display(),
        config.static_dir.display()
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run store I/O on the blocking pool instead of an async worker.
async fn blocking<T, F>(work: F) -> Result<T, MatrixError>
where
    F: FnOnce() -> Result<T, MatrixError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MatrixError::Io(std::io::Error::other(e)))?
}

async fn get_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>, MatrixError> {
    let store = Arc::clone(&state.store);
    let document = blocking(move || store.load_document()).await?;
    Ok(Json(document))
}

async fn submit_entry(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, MatrixError> {
    let request = SubmitRequest::from_json(&body)?;

    let _guard = state.write_lock.lock().await;
    let store = Arc::clone(&state.store);
    let outcome = blocking(move || upsert::append_entry(store.as_ref(), &request)).await?;

    log::info!("{}", outcome.message);

    Ok(Json(SubmitResponse {
        status: "ok".to_string(),
        message: outcome.message,
    }))
}

impl IntoResponse for MatrixError {
    fn into_response(self) -> Response {
        let status = match self {
            MatrixError::Validation(_) => StatusCode::BAD_REQUEST,
            MatrixError::NotFound(_) => StatusCode::NOT_FOUND,
            MatrixError::Io(_) | MatrixError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if self.is_client_error() {
            log::warn!("Rejected request: {}", self);
        } else {
            log::error!("Storage failure: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
