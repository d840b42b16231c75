use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    response::Response,
};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::services::{OutboundRequest, RequestOrigin, Transport};

/// 转发请求体的大小上限
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 门户代理 - 宿主页面的所有其他请求都经过拦截器转发到门户站点
pub async fn proxy_portal(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Response> {
    let (parts, body) = request.into_parts();

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {}", e)))?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut outbound = OutboundRequest::new(parts.method.as_str(), path_and_query, RequestOrigin::HostPage)
        .with_body(body.to_vec());
    for (name, value) in parts.headers.iter() {
        if let Ok(value) = value.to_str() {
            outbound = outbound.with_header(name.as_str(), value);
        }
    }

    tracing::debug!("Proxying {} {}", outbound.method, outbound.url);

    let inbound = state.interceptor.send(outbound).await?;

    let mut builder = Response::builder().status(inbound.status);
    for (name, value) in &inbound.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if inbound.synthetic {
        builder = builder.header("x-gacha-intercepted", "1");
    }

    builder
        .body(Body::from(inbound.body))
        .map_err(|e| ApiError::Internal(format!("Failed to build proxy response: {}", e)))
}
