// 寻访记录拉取
//
// 为 other UID 单独拉取一页（足够大的）寻访记录，请求同样经过拦截器，
// 但标记为本工具发出，不会被拦截。

use crate::config::ViewerConfig;
use crate::models::{GachaEnvelope, PullCategory, SharedIdentity, Uid};
use super::error::GachaError;
use super::transport::{OutboundRequest, RequestOrigin, SharedTransport};

/// 单页大小，足以覆盖实际的记录数量，不再分页
pub const PAGE_SIZE: u32 = 10_000;

/// 寻访记录拉取器
#[derive(Clone)]
pub struct HistoryFetcher {
    transport: SharedTransport,
    identity: SharedIdentity,
    endpoint: String,
    referrer: String,
    lang: String,
}

impl HistoryFetcher {
    pub fn new(transport: SharedTransport, identity: SharedIdentity, config: &ViewerConfig) -> Self {
        Self {
            transport,
            identity,
            endpoint: config.gacha_endpoint(),
            referrer: config.portal_referrer.clone(),
            lang: config.portal_lang.clone(),
        }
    }

    /// 构建查询地址
    pub fn build_url(&self, category: PullCategory, uid: Uid) -> String {
        format!(
            "{}?key=ark&index=1&size={}&type={}&uid={}",
            self.endpoint,
            PAGE_SIZE,
            category.query_value(),
            uid
        )
    }

    /// 拉取指定类型的寻访记录
    ///
    /// UID 无效时不访问网络；网络或解析失败时记录日志并返回 `None`
    pub async fn fetch(&self, category: PullCategory, uid: Uid) -> Option<GachaEnvelope> {
        if !self.identity.is_valid_uid(uid) {
            tracing::warn!("UID is not valid for lookup: {}", uid);
            return None;
        }

        match self.request(category, uid).await {
            Ok(envelope) => {
                tracing::info!(
                    "Fetched {} history for uid {}: code={}",
                    category.label(),
                    uid,
                    envelope.code
                );
                Some(envelope)
            }
            Err(e) => {
                tracing::error!("Error fetching gacha history: {}", e);
                None
            }
        }
    }

    async fn request(&self, category: PullCategory, uid: Uid) -> Result<GachaEnvelope, GachaError> {
        let request = OutboundRequest::get(self.build_url(category, uid), RequestOrigin::Viewer)
            .with_header("accept", "application/json, text/plain, */*")
            .with_header("lang", &self.lang)
            .with_header("referer", &self.referrer);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::warn!("Gacha endpoint answered with status {}", response.status);
        }

        let envelope: GachaEnvelope = serde_json::from_slice(&response.body)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::{InboundResponse, Transport};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// 返回固定内容并记录请求的假传输层
    struct StubTransport {
        body: Vec<u8>,
        requests: Mutex<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: body.as_bytes().to_vec(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GachaError> {
            self.requests.lock().unwrap().push(request);
            Ok(InboundResponse {
                status: 200,
                headers: Vec::new(),
                body: self.body.clone(),
                synthetic: false,
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: OutboundRequest) -> Result<InboundResponse, GachaError> {
            Err(GachaError::Timeout)
        }
    }

    fn fetcher(transport: SharedTransport, identity: SharedIdentity) -> HistoryFetcher {
        HistoryFetcher::new(transport, identity, &ViewerConfig::default())
    }

    #[test]
    fn test_build_url() {
        let f = fetcher(StubTransport::new("{}"), SharedIdentity::new());
        assert_eq!(
            f.build_url(PullCategory::Limited, 2002),
            "https://account.yo-star.com/api/game/gachas?key=ark&index=1&size=10000&type=Limited+Headhunting&uid=2002"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_headers_and_parses_envelope() {
        let transport = StubTransport::new(
            r##"{"code":0,"message":"ok","data":{"rows":[{"poolName":"P","charName":"C","color":"#fff","atStr":"2024-01-01 00:00:00"}],"count":1}}"##,
        );
        let identity = SharedIdentity::new();
        identity.learn_self(1001);

        let envelope = fetcher(transport.clone(), identity)
            .fetch(PullCategory::Regular, 2002)
            .await
            .unwrap();

        assert_eq!(envelope.history().unwrap().rows.len(), 1);
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].origin, RequestOrigin::Viewer);
        assert!(requests[0].headers.contains(&("lang".to_string(), "en".to_string())));
        assert!(requests[0]
            .headers
            .iter()
            .any(|(name, value)| name == "referer" && value.contains("tab=gacha")));
    }

    #[tokio::test]
    async fn test_invalid_uid_skips_network() {
        let transport = StubTransport::new("{}");
        let identity = SharedIdentity::new();
        identity.learn_self(1001);
        let f = fetcher(transport.clone(), identity);

        assert!(f.fetch(PullCategory::Limited, 1001).await.is_none());
        assert!(f.fetch(PullCategory::Limited, 0).await.is_none());
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_returns_none() {
        let f = fetcher(Arc::new(FailingTransport), SharedIdentity::new());
        assert!(f.fetch(PullCategory::Special, 2002).await.is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_returns_none() {
        let f = fetcher(StubTransport::new("<html>login</html>"), SharedIdentity::new());
        assert!(f.fetch(PullCategory::Special, 2002).await.is_none());
    }
}
