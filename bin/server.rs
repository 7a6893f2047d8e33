// simplebank - Web Server
// JSON API over the ledger repositories (axum)

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use simplebank::{
    logging, Account, CreateAccountParams, Entry, GetTransfersParams, LedgerError, Pagination,
    Store, StoreConfig, Transfer,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Store>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Repository failure on its way out as an HTTP response
struct ApiError(StatusCode, String);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::ConstraintViolation(_) => StatusCode::BAD_REQUEST,
            LedgerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %err, "store call failed");
        }
        ApiError(status, err.to_string())
    }
}

// Extractor rejections keep the envelope instead of axum's plain-text body
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ApiResponse::err(self.1))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Run `f` against the store while holding the lock
fn with_store<T>(state: &AppState, f: impl FnOnce(&Store) -> Result<T, LedgerError>) -> ApiResult<T> {
    let store = state.db.lock().map_err(|_| {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, "store lock poisoned".to_string())
    })?;
    Ok(Json(ApiResponse::ok(f(&store)?)))
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl From<PageQuery> for Pagination {
    fn from(q: PageQuery) -> Self {
        let default = Pagination::default();
        Pagination::new(q.limit.unwrap_or(default.limit), q.offset.unwrap_or(default.offset))
    }
}

#[derive(Deserialize)]
struct TransferPairQuery {
    from: i64,
    to: i64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/accounts?limit=&offset=
async fn list_accounts(
    State(state): State<AppState>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<Account>> {
    let Query(page) = page?;
    with_store(&state, |store| store.accounts().list_accounts(page.into()))
}

/// POST /api/accounts
async fn create_account(
    State(state): State<AppState>,
    arg: Result<Json<CreateAccountParams>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let Json(arg) = arg?;
    let created = with_store(&state, |store| store.accounts().create_account(&arg))?;
    Ok((StatusCode::CREATED, created))
}

/// GET /api/accounts/:id
async fn get_account(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Account> {
    let Path(id) = id?;
    with_store(&state, |store| store.accounts().get_account(id))
}

/// GET /api/accounts/:id/entries
async fn get_account_entries(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Entry>> {
    let Path(id) = id?;
    with_store(&state, |store| store.entries().get_entries(id))
}

/// GET /api/transfers?from=&to=
async fn get_transfers(
    State(state): State<AppState>,
    pair: Result<Query<TransferPairQuery>, QueryRejection>,
) -> ApiResult<Vec<Transfer>> {
    let Query(pair) = pair?;
    let arg = GetTransfersParams {
        from_account_id: pair.from,
        to_account_id: pair.to,
    };
    with_store(&state, |store| store.transfers().get_transfers(&arg))
}

/// GET /api/transfers/:id
async fn get_transfer(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Transfer> {
    let Path(id) = id?;
    with_store(&state, |store| store.transfers().get_transfer(id))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id/entries", get(get_account_entries))
        .route("/transfers", get(get_transfers))
        .route("/transfers/:id", get(get_transfer))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = StoreConfig::from_env().context("Failed to read store configuration")?;
    let store = Store::open(&config)
        .with_context(|| format!("Failed to open database at {}", config.path.display()))?;

    let state = AppState {
        db: Arc::new(Mutex::new(store)),
    };

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .map(|p| p.parse::<u16>())
        .transpose()
        .context("PORT must be a valid port number")?
        .unwrap_or(3000);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(%addr, db = %config.path.display(), "server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
