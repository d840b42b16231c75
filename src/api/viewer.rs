use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};

use super::AppState;
use super::error::ApiResult;
use super::response::{success, ApiResponse};
use crate::models::ViewerEvent;

/// 当前页面 HTML
pub async fn get_viewer_html(State(state): State<AppState>) -> Html<String> {
    Html(state.coordinator.render_html().await)
}

/// 当前查看器状态
pub async fn get_viewer_state(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.coordinator.snapshot().await))
}

/// 宿主页面就绪，挂载布局并注入控件
pub async fn host_ready(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let fired = state.coordinator.mount_host_layout().await;
    let message = if fired {
        "Controls injected"
    } else {
        "Host page already mounted"
    };
    Ok(ApiResponse::success_with_message(
        state.coordinator.snapshot().await,
        message,
    ))
}

/// 处理页面事件，返回处理后的状态
pub async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<ViewerEvent>,
) -> ApiResult<impl IntoResponse> {
    tracing::debug!("Viewer event: {:?}", event);
    state.coordinator.handle_event(event).await;
    Ok(success(state.coordinator.snapshot().await))
}
