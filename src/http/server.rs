//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all console routes
//! - Wire up middleware (tracing, limits, request ID, sessions, metrics)
//! - Serve with graceful shutdown
//! - Apply hot config reloads (atomic swap; listener changes need restart)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::compliance;
use crate::config::ConsoleConfig;
use crate::health;
use crate::http::auth;
use crate::http::middleware::session_middleware;
use crate::http::request::RequestIdLayer;
use crate::http::response;
use crate::incidents;
use crate::observability::metrics;
use crate::orgs;
use crate::security::rate_limit::{login_rate_limit_middleware, RateLimiterState};
use crate::security::sessions::{CurrentUser, SessionStore};
use crate::store::AppStore;
use crate::ui::pages;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AppStore>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<ArcSwap<ConsoleConfig>>,
    pub login_limiter: Arc<RateLimiterState>,
}

/// HTTP server for the console.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ConsoleConfig) -> Self {
        let store = Arc::new(AppStore::new());
        store.sync_users(&config.users);

        let state = AppState {
            store,
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(ArcSwap::from_pointee(config)),
            login_limiter: Arc::new(RateLimiterState::new()),
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Shared state, for tests and the reload task.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let config = state.config.load_full();

        let login_routes = Router::new()
            .route("/login", get(auth::login_page).post(auth::login))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit_middleware,
            ));

        Router::new()
            .route("/", get(home))
            .route("/logout", post(auth::logout))
            .route("/healthz", get(health::healthz))
            .route("/readyz", get(health::readyz))
            .route("/orgs", post(orgs::handlers::org_create))
            .route("/orgs/{org_id}/members", get(orgs::handlers::members_block))
            .route(
                "/orgs/{org_id}/members/{member_id}/role",
                post(orgs::handlers::member_role_update),
            )
            .route(
                "/orgs/{org_id}/members/{member_id}/toggle",
                post(orgs::handlers::member_toggle),
            )
            .route("/orgs/{org_id}/invites", post(orgs::handlers::invite_create))
            .route(
                "/orgs/{org_id}/invites/{invite_id}/cancel",
                post(orgs::handlers::invite_cancel),
            )
            .route("/invites/accept/{token}", post(orgs::handlers::invite_accept))
            .route(
                "/orgs/{org_id}/incidents",
                get(incidents::handlers::incidents_block).post(incidents::handlers::incident_create),
            )
            .route(
                "/orgs/{org_id}/incidents/{incident_id}/submit-report",
                post(incidents::handlers::incident_submit_report),
            )
            .route(
                "/orgs/{org_id}/incidents/{incident_id}/annex.json",
                get(incidents::handlers::incident_annex),
            )
            .route(
                "/orgs/{org_id}/records",
                get(compliance::handlers::records_block).post(compliance::handlers::record_create),
            )
            .route(
                "/orgs/{org_id}/records/{record_id}/status",
                post(compliance::handlers::record_status_update),
            )
            .merge(login_routes)
            .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
            .layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ConsoleConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        // Apply config updates while serving.
        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    maybe_config = config_updates.recv() => match maybe_config {
                        Some(new_config) => {
                            state.store.sync_users(&new_config.users);
                            state.config.store(Arc::new(new_config));
                            tracing::info!("Configuration reloaded");
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// GET /: the landing page.
async fn home(State(state): State<AppState>, user: Option<CurrentUser>) -> Response {
    let config = state.config.load();
    let (stored_user, orgs): (Option<crate::store::User>, Vec<crate::orgs::model::Org>) =
        match &user {
            Some(current) => {
                let orgs = state
                    .store
                    .orgs_for_user(current.user_id)
                    .into_iter()
                    .map(|(org, _)| org)
                    .collect();
                (state.store.user(current.user_id), orgs)
            }
            None => (None, Vec::new()),
        };

    let body = pages::home_body(stored_user.as_ref(), &orgs);
    response::html(pages::shell(&config.ui.title, &config.ui.busy_class, "", &body))
}

/// Record method/route/status/latency for every handled request.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}
