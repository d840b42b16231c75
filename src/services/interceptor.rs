// 请求拦截器
//
// 包装真实传输层，检查每一个出站请求：
// - 从宿主页面的寻访记录请求中学习 self UID
// - other UID 激活时，拦截宿主页面的寻访记录请求并返回空数据
// - 记住宿主页面请求携带的会话头，附加到本工具自己发出的请求上（不解析其内容）
// - 其他请求原样转发

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::models::{GachaEnvelope, SharedIdentity, Uid};
use super::error::GachaError;
use super::transport::{InboundResponse, OutboundRequest, RequestOrigin, SharedTransport, Transport};

/// 寻访记录接口路径
pub const GACHA_ENDPOINT_SUFFIX: &str = "/api/game/gachas";

/// 需要透传的会话请求头
const SESSION_HEADERS: [&str; 2] = ["cookie", "authorization"];

/// 拦截决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    Forward,
    Suppress,
}

/// 请求拦截器
#[derive(Clone)]
pub struct RequestInterceptor {
    inner: SharedTransport,
    identity: SharedIdentity,
    base_url: Url,
    session: Arc<RwLock<Vec<(String, String)>>>,
}

impl RequestInterceptor {
    pub fn new(inner: SharedTransport, identity: SharedIdentity, base_url: Url) -> Self {
        Self {
            inner,
            identity,
            base_url,
            session: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn identity(&self) -> &SharedIdentity {
        &self.identity
    }

    /// 解析请求地址，相对地址基于门户站点
    fn resolve(&self, url: &str) -> Option<Url> {
        self.base_url.join(url).ok()
    }

    /// 路径是否以寻访记录接口结尾
    pub fn is_gacha_endpoint(url: &Url) -> bool {
        url.path().trim_end_matches('/').ends_with(GACHA_ENDPOINT_SUFFIX)
    }

    fn uid_param(url: &Url) -> Option<Uid> {
        url.query_pairs()
            .find(|(key, _)| *key == "uid")
            .and_then(|(_, value)| value.trim().parse::<Uid>().ok())
    }

    /// 检查请求并决定是否转发
    ///
    /// 宿主页面的请求会顺带学习 self UID；本工具自己的请求只做观察，不会被拦截
    pub fn inspect(&self, request: &OutboundRequest) -> InterceptDecision {
        let Some(url) = self.resolve(&request.url) else {
            tracing::debug!("Unparseable request url, forwarding: {}", request.url);
            return InterceptDecision::Forward;
        };

        if !Self::is_gacha_endpoint(&url) {
            return InterceptDecision::Forward;
        }

        let uid = if request.is_get() { Self::uid_param(&url) } else { None };
        tracing::debug!(
            "Gacha request observed: origin={:?} method={} uid={:?}",
            request.origin,
            request.method,
            uid
        );

        if request.origin != RequestOrigin::HostPage {
            return InterceptDecision::Forward;
        }

        if let Some(uid) = uid {
            if !self.identity.is_self_known() {
                self.identity.learn_self(uid);
            }
        }

        if self.identity.is_other_active() {
            tracing::warn!("Intercepted gacha request from web: {:?}", uid);
            InterceptDecision::Suppress
        } else {
            InterceptDecision::Forward
        }
    }

    /// 记住宿主页面请求中的会话头，只替换本次请求里出现的那些
    fn remember_session(&self, request: &OutboundRequest) {
        let seen: Vec<(String, String)> = request
            .headers
            .iter()
            .filter(|(name, _)| is_session_header(name))
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        if seen.is_empty() {
            return;
        }

        if let Ok(mut session) = self.session.write() {
            session.retain(|(name, _)| !seen.iter().any(|(n, _)| n == name));
            session.extend(seen);
        }
    }

    /// 本工具的请求没有自带会话头时，补上最近一次宿主页面的会话头
    fn attach_session(&self, mut request: OutboundRequest) -> OutboundRequest {
        if let Ok(session) = self.session.read() {
            for (name, value) in session.iter() {
                let present = request
                    .headers
                    .iter()
                    .any(|(n, _)| n.eq_ignore_ascii_case(name));
                if !present {
                    request.headers.push((name.clone(), value.clone()));
                }
            }
        }
        request
    }

    /// 伪造一个成功但没有数据的响应，并按真实请求的方式通知调用方
    fn synthesize(request: &OutboundRequest) -> Result<InboundResponse, GachaError> {
        let mut response = InboundResponse::json(200, &GachaEnvelope::empty_ok())?;
        response.synthetic = true;
        request.notify_completion();
        Ok(response)
    }
}

#[async_trait]
impl Transport for RequestInterceptor {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GachaError> {
        let request = match request.origin {
            RequestOrigin::HostPage => {
                self.remember_session(&request);
                request
            }
            RequestOrigin::Viewer => self.attach_session(request),
        };

        match self.inspect(&request) {
            InterceptDecision::Suppress => Self::synthesize(&request),
            InterceptDecision::Forward => self.inner.send(request).await,
        }
    }
}

fn is_session_header(name: &str) -> bool {
    SESSION_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}
