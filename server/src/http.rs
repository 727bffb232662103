use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use platform_db::DbPool;
use products_hr::{
    HrError,
    export::{self, CSV_MIME, ExportError},
    filter::EmployeeFilter,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{config::AppConfig, directory::Directory, graphql::SchemaType};

#[derive(Clone)]
pub struct AppState {
    pub schema: SchemaType,
    pub directory: Directory,
    pub config: Arc<AppConfig>,
    /// Present for the database backend.
    pub pool: Option<DbPool>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "directory server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let layer = CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET]);
    // Credentials cannot be combined with a wildcard origin.
    if allowed.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql_handler))
        .route("/export/employees.csv", get(export_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

async fn graphiql_handler() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = match &state.pool {
        Some(pool) => Some(platform_db::ping(pool).await),
        None => None,
    };
    Json(HealthResponse {
        ok: db_ok.unwrap_or(true),
        backend: state.config.backend.as_str(),
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_ok: Option<bool>,
    version: &'static str,
}

async fn export_handler(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> HttpResult<Response> {
    let employees = state.directory.filtered_employees(&filter).await?;
    let csv = export::export_employees(&employees, Utc::now().date_naive())?;
    info!(rows = employees.len(), filename = %csv.filename, "employee export generated");
    let disposition = format!("attachment; filename=\"{}\"", csv.filename);
    Ok((
        [
            (header::CONTENT_TYPE, CSV_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.content,
    )
        .into_response())
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }
}

impl From<HrError> for HttpError {
    fn from(err: HrError) -> Self {
        let status = match &err {
            HrError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HrError::TransportFailure(detail) => {
                warn!(%detail, "directory backend failure");
                return Self::new(StatusCode::SERVICE_UNAVAILABLE, "directory backend unavailable");
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<ExportError> for HttpError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, ExportError::Empty.to_string())
            }
            other => {
                warn!(error = %other, "employee export failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "export failed")
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Backend, graphql::build_schema, seed};

    fn state(directory: Directory) -> AppState {
        AppState {
            schema: build_schema(directory.clone()),
            directory,
            config: Arc::new(AppConfig {
                backend: Backend::Memory,
                simulated_latency: Duration::ZERO,
                seed_demo_data: false,
                cors_allowed_origins: vec!["http://localhost:5173".into()],
            }),
            pool: None,
        }
    }

    async fn seeded_router() -> Router {
        let directory = Directory::in_memory(Duration::ZERO);
        seed::seed_if_empty(&directory).await.unwrap();
        build_router(state(directory))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> http::Request<Body> {
        http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_backend_and_request_id() {
        let response = seeded_router().await.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["backend"], json!("memory"));
        assert!(body.get("db_ok").is_none());
    }

    #[tokio::test]
    async fn graphql_endpoint_executes_queries() {
        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "query": "{ directoryOverview { departmentCount employeeCount } }" })
                    .to_string(),
            ))
            .unwrap();
        let response = seeded_router().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body["data"]["directoryOverview"],
            json!({ "departmentCount": 5, "employeeCount": 8 })
        );
    }

    #[tokio::test]
    async fn graphiql_page_is_served() {
        let response = seeded_router().await.oneshot(get("/graphiql")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("/graphql"));
    }

    #[tokio::test]
    async fn export_streams_filtered_csv() {
        let response = seeded_router()
            .await
            .oneshot(get("/export/employees.csv?department=Sales&q=emma"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CSV_MIME);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"employees_"));
        assert!(disposition.ends_with(".csv\""));

        let body = body_text(response).await;
        let lines: Vec<&str> = body.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"ID\",\"First Name\""));
        assert!(lines[1].contains("\"Emma\",\"Rossi\""));
        assert!(lines[1].ends_with("\"inactive\""));
    }

    #[tokio::test]
    async fn empty_export_is_unprocessable() {
        let router = build_router(state(Directory::in_memory(Duration::ZERO)));
        let response = router.oneshot(get("/export/employees.csv")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_text(response).await, "no employee data to export");
    }
}
