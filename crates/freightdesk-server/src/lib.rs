pub mod config;
pub mod metrics;

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_RANGE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use freightdesk_core::{
    CollectionParams, ContentRange, EntityRegistry, QueryAssembler, QueryError, RangeRequest,
};
use freightdesk_storage::{run_collection, InMemoryExecutor, Page};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::metrics::{QUERY_SECONDS, REQUESTS_TOTAL, ROWS_RETURNED};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<EntityRegistry>,
    pub store: InMemoryExecutor,
    pub max_range_span: Option<u64>,
}

impl AppState {
    pub fn new(registry: EntityRegistry, store: InMemoryExecutor) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            max_range_span: None,
        }
    }

    pub fn with_max_range_span(mut self, span: Option<u64>) -> Self {
        self.max_range_span = span;
        self
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/v1/:entity", get(list_collection).post(insert_row))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([CONTENT_RANGE]),
        )
}

/// Error body `{"error": "..."}` with the status the error class maps to.
pub struct ApiError(pub QueryError);

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            QueryError::MalformedFilter(_) => StatusCode::BAD_REQUEST,
            QueryError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            QueryError::InvalidSortDirection(_)
            | QueryError::MalformedSort(_)
            | QueryError::MalformedRange(_)
            | QueryError::InvalidRow(_) => StatusCode::UNPROCESSABLE_ENTITY,
            QueryError::Registration(_) | QueryError::Executor(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self.0, "collection request failed");
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

/// Raw collection parameters. Each value is itself JSON text.
/// `page`/`perPage` may be present and are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub range: Option<String>,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    let _ = encoder.encode(&metric_families, &mut buf);
    (StatusCode::OK, String::from_utf8(buf).unwrap_or_default())
}

async fn list_collection(
    State(app): State<AppState>,
    Path(entity): Path<String>,
    Query(q): Query<CollectionQuery>,
) -> Result<Response, ApiError> {
    // keep unknown names out of the label space
    let label = match app.registry.get(&entity) {
        Ok(_) => entity.as_str(),
        Err(_) => "unknown",
    };
    let timer = QUERY_SECONDS.with_label_values(&[label]).start_timer();
    let result = fetch_page(&app, &entity, &q).await;
    timer.observe_duration();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) if e.is_client_error() => "rejected",
        Err(_) => "error",
    };
    REQUESTS_TOTAL.with_label_values(&[label, outcome]).inc();

    let (page, range) = result?;
    ROWS_RETURNED
        .with_label_values(&[label])
        .observe(page.rows.len() as f64);

    let header = range
        .as_ref()
        .map(|r| ContentRange::format(Some(r), page.total));
    let mut resp = Json(page.rows).into_response();
    if let Some(value) = header.and_then(|h| HeaderValue::from_str(&h).ok()) {
        resp.headers_mut().insert(CONTENT_RANGE, value);
    }
    Ok(resp)
}

async fn fetch_page(
    app: &AppState,
    entity: &str,
    q: &CollectionQuery,
) -> freightdesk_core::Result<(Page, Option<RangeRequest>)> {
    let config = app.registry.get(entity)?;
    let params =
        CollectionParams::decode(q.filter.as_deref(), q.sort.as_deref(), q.range.as_deref())?;
    if let (Some(max), Some(range)) = (app.max_range_span, params.range.as_ref()) {
        if !range.is_unbounded() {
            let span = range.span();
            if span > max {
                return Err(QueryError::MalformedRange(format!(
                    "range spans {span} rows, at most {max} allowed"
                )));
            }
        }
    }
    let (data, count) = QueryAssembler::new(&config).assemble(&params)?;
    debug!(entity, predicate = ?data.predicate, order = ?data.order_by, "compiled collection query");
    let page = run_collection(&app.store, &data, &count).await?;
    Ok((page, params.range))
}

async fn insert_row(
    State(app): State<AppState>,
    Path(entity): Path<String>,
    Json(row): Json<JsonValue>,
) -> Result<impl IntoResponse, ApiError> {
    app.registry.get(&entity)?;
    let row = app.store.insert(&entity, row)?;
    Ok((StatusCode::CREATED, Json(row)))
}
