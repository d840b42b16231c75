// 传输层抽象
//
// 所有出站请求都必须经过 `Transport`，拦截器本身也是一个 `Transport`，
// 包装真实的网络传输，这样每个请求都能被检查。

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::error::GachaError;

/// 请求来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOrigin {
    /// 宿主页面自己发出的请求
    HostPage,
    /// 本工具发出的请求
    Viewer,
}

/// 请求生命周期状态，对应页面等待的就绪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Opened,
    HeadersReceived,
    Done,
}

/// 请求完成通知
///
/// 调用方（宿主页面）通过它等待请求完成，真实请求和伪造响应都必须触发
pub trait CompletionListener: Send + Sync {
    fn on_ready_state_change(&self, state: ReadyState);
    fn on_load(&self);
}

/// 出站请求
#[derive(Clone)]
pub struct OutboundRequest {
    pub id: Uuid,
    pub method: String,
    /// 绝对地址或相对于门户站点的地址
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub origin: RequestOrigin,
    pub listener: Option<Arc<dyn CompletionListener>>,
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("origin", &self.origin)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl OutboundRequest {
    pub fn new(method: &str, url: impl Into<String>, origin: RequestOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.to_ascii_uppercase(),
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
            origin,
            listener: None,
        }
    }

    pub fn get(url: impl Into<String>, origin: RequestOrigin) -> Self {
        Self::new("GET", url, origin)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// 通知调用方：状态变为完成，然后触发 load
    pub fn notify_completion(&self) {
        if let Some(ref listener) = self.listener {
            listener.on_ready_state_change(ReadyState::Done);
            listener.on_load();
        }
    }
}

/// 入站响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// 是否为拦截器伪造的响应
    pub synthetic: bool,
}

impl InboundResponse {
    /// 构建 JSON 响应
    pub fn json<T: Serialize>(status: u16, data: &T) -> Result<Self, GachaError> {
        Ok(Self {
            status,
            headers: vec![(
                "content-type".to_string(),
                "application/json".to_string(),
            )],
            body: serde_json::to_vec(data)?,
            synthetic: false,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 出站请求的统一入口
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GachaError>;
}

/// 共享的传输句柄
pub type SharedTransport = Arc<dyn Transport>;
