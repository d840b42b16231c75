pub mod error;
pub mod health;
pub mod proxy;
pub mod response;
pub mod viewer;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::ViewerConfig;
use crate::models::SharedIdentity;
use crate::services::{Coordinator, HistoryFetcher, RequestInterceptor, SharedTransport};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ViewerConfig>,
    pub identity: SharedIdentity,
    pub interceptor: RequestInterceptor,
    pub coordinator: Coordinator,
}

impl AppState {
    /// 组装组件：门户传输 → 拦截器 → 拉取器 → 协调器
    ///
    /// 代理和拉取器都只拿到拦截器，不直接接触门户传输
    pub fn new(config: ViewerConfig, portal: SharedTransport) -> Self {
        let identity = SharedIdentity::new();
        let interceptor =
            RequestInterceptor::new(portal, identity.clone(), config.portal_base_url.clone());
        let fetcher = HistoryFetcher::new(Arc::new(interceptor.clone()), identity.clone(), &config);
        let coordinator = Coordinator::new(identity.clone(), fetcher);

        Self {
            config: Arc::new(config),
            identity,
            interceptor,
            coordinator,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Headhunt Viewer Backend API v1.0" }))
        .route("/api/health", get(health::health_check))
        // Viewer
        .route("/viewer", get(viewer::get_viewer_html))
        .route("/viewer/state", get(viewer::get_viewer_state))
        .route("/viewer/host-ready", post(viewer::host_ready))
        .route("/viewer/events", post(viewer::post_event))
        // Everything else goes to the portal
        .fallback(proxy::proxy_portal)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
