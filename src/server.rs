use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::cache::{Freshness, FreshnessCache};
use crate::config::Config;
use crate::error::{DashboardError, ErrorKind};
use crate::output::{DashboardRenderer, TemplateStore};
use crate::providers::GitLabProvider;

const NOT_FOUND_BODY: &str = "404 not found";
const METHOD_NOT_ALLOWED_BODY: &str = "405 method not allowed";
const INTERNAL_ERROR_BODY: &str = "500 internal server error";

/// Everything needed to answer a dashboard request.
pub struct Dashboard {
    provider: GitLabProvider,
    renderer: DashboardRenderer,
    cache: Mutex<FreshnessCache>,
}

impl Dashboard {
    pub fn new(config: &Config) -> crate::error::Result<Self> {
        let provider = GitLabProvider::new(config)?;
        let renderer = DashboardRenderer::new(
            TemplateStore::new(&config.templates),
            provider.project().to_string(),
            config.escape_html,
        );

        Ok(Self {
            provider,
            renderer,
            cache: Mutex::new(FreshnessCache::new()),
        })
    }

    /// Returns the cached dashboard or renders a new one.
    ///
    /// The cache stays locked from the fingerprint check until the new
    /// document is committed, so requests are answered one at a time.
    pub async fn document(&self) -> crate::error::Result<String> {
        let mut cache = self.cache.lock().await;

        let fingerprint = self.provider.fingerprint().await?;
        if let Freshness::Hit(document) = cache.check_and_update(fingerprint) {
            return Ok(document);
        }

        let pipelines = self.provider.collect_dashboard().await?;
        let document = self.renderer.render(&pipelines).await?;
        cache.commit(document.clone());

        Ok(document)
    }

    async fn error_response(&self, err: DashboardError) -> Response {
        error!("Failed to build dashboard: {err}");

        match err.kind() {
            ErrorKind::UpstreamShape => html(StatusCode::NOT_FOUND, NOT_FOUND_BODY.to_string()),
            ErrorKind::Internal => {
                let body = self.renderer.error_page().await.unwrap_or_else(|e| {
                    error!("Failed to load error page: {e}");
                    INTERNAL_ERROR_BODY.to_string()
                });
                html(StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        }
    }
}

fn html(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn favicon() -> Response {
    html(StatusCode::NOT_FOUND, String::new())
}

async fn dashboard(
    State(dashboard): State<Arc<Dashboard>>,
    method: Method,
    uri: Uri,
) -> Response {
    info!("{method} {}", uri.path());

    if method != Method::GET {
        return html(
            StatusCode::METHOD_NOT_ALLOWED,
            METHOD_NOT_ALLOWED_BODY.to_string(),
        );
    }

    match dashboard.document().await {
        Ok(document) => html(StatusCode::OK, document),
        Err(err) => dashboard.error_response(err).await,
    }
}

/// `/favicon.ico` is always 404; every other path serves the dashboard.
pub fn router(state: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/favicon.ico", get(favicon))
        .fallback(dashboard)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C.
pub async fn serve(config: &Config) -> Result<()> {
    let dashboard = Dashboard::new(config).context("Failed to set up GitLab provider")?;
    let app = router(Arc::new(dashboard));

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Serving dashboard for project {} at {addr}", config.id);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server encountered an error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
