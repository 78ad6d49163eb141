//! Dual-protocol development server.
//!
//! One cleartext HTTP/1.1 listener and one TLS listener (HTTP/2 via ALPN,
//! HTTP/1.1 fallback) share the same axum router. Each connection runs on
//! its own task.

use crate::config::ServerConfig;
use crate::dev::request::RequestContext;
use crate::dev::{mime, relay, resolver, tls, transfer};
use crate::error::{CliError, Result, ServerError};
use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Canonical form of `config.root`
    pub root: PathBuf,
    /// Upstream client for the CORS relay
    pub relay: reqwest::Client,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Result<Self> {
        let root = std::fs::canonicalize(&config.root).map_err(|e| {
            CliError::Custom(format!("Cannot open root {}: {}", config.root.display(), e))
        })?;
        let relay = relay::client(config.relay_timeout())
            .map_err(|e| CliError::Custom(format!("Cannot create relay client: {}", e)))?;

        Ok(Self {
            config,
            root,
            relay,
        })
    }
}

/// Router shared by both listeners.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/cors", any(handle_relay))
        .fallback(handle_static)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve a file from the root, or 404.
async fn handle_static(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    let Some(file) =
        resolver::resolve(&state.root, &ctx.path, &state.config.default_document).await
    else {
        return not_found(&ctx);
    };

    let content_type = mime::content_type_for(&file.path);
    match transfer::serve_file(&file, content_type, ctx.accepts_brotli()).await {
        Ok(response) => {
            tracing::info!(
                "{} {} {} {} {} {}",
                ctx.protocol(),
                response.status().as_u16(),
                content_type,
                file.metadata.len(),
                ctx.path,
                ctx.client_ip
            );
            response
        }
        Err(e) => {
            // Removed between resolve and open.
            tracing::debug!("Cannot open {}: {}", file.path.display(), e);
            not_found(&ctx)
        }
    }
}

fn not_found(ctx: &RequestContext) -> Response {
    let response = transfer::not_found();
    tracing::warn!(
        "{} {} {} {}",
        ctx.protocol(),
        response.status().as_u16(),
        ctx.path,
        ctx.client_ip
    );
    response
}

/// Relay the URL in the `cors` header. Any method is accepted; upstream
/// always sees a GET.
async fn handle_relay(State(state): State<SharedState>, ctx: RequestContext) -> Response {
    let url = ctx.cors.as_deref().map(str::trim).unwrap_or_default();

    let outcome = if url.is_empty() {
        relay::RelayOutcome {
            status: None,
            body: relay::empty_object(),
        }
    } else {
        relay::fetch(&state.relay, url).await
    };

    let size = outcome.body.len();
    let response = relay::json_response(outcome.body);
    tracing::info!(
        "{} {} cors {} {} {}",
        ctx.protocol(),
        outcome
            .status
            .map(|s| s.as_u16().to_string())
            .unwrap_or_else(|| "-".to_string()),
        size,
        url,
        ctx.client_ip
    );
    response
}

/// Both listeners, bound and ready to accept.
pub struct DevServer {
    state: SharedState,
    http: TcpListener,
    https: TcpListener,
    acceptor: TlsAcceptor,
}

impl DevServer {
    /// Load TLS material and bind both ports.
    ///
    /// # Errors
    ///
    /// Missing or invalid key pair, or a port that cannot be bound.
    pub async fn bind(config: Arc<ServerConfig>) -> Result<Self> {
        let acceptor = tls::load_acceptor(&config.cert_path, &config.key_path)?;
        let state = Arc::new(AppState::new(Arc::clone(&config))?);

        let http = bind(SocketAddr::new(config.host, config.http_port)).await?;
        let https = bind(SocketAddr::new(config.host, config.https_port)).await?;

        Ok(Self {
            state,
            http,
            https,
            acceptor,
        })
    }

    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http.local_addr()
    }

    pub fn https_addr(&self) -> std::io::Result<SocketAddr> {
        self.https.local_addr()
    }

    /// Serve until either listener fails.
    pub async fn run(self) -> Result<()> {
        let app = router(self.state);

        tokio::select! {
            result = serve_http(self.http, app.clone()) => result,
            result = serve_https(self.https, self.acceptor, app) => result,
        }
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source }.into())
}

async fn serve_http(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(CliError::Io)
}

async fn serve_https(listener: TcpListener, acceptor: TlsAcceptor, app: Router) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("Failed to accept TLS connection: {}", e);
                continue;
            }
        };
        let acceptor = acceptor.clone();
        let app = app.clone();

        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!("TLS handshake error from {}: {}", peer, e);
                    return;
                }
            };

            let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
                request.extensions_mut().insert(ConnectInfo(peer));
                app.clone().oneshot(request)
            });

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                tracing::debug!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
