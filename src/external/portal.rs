use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::services::error::GachaError;
use crate::services::transport::{InboundResponse, OutboundRequest, ReadyState, Transport};

/// 转发时不复制的逐跳请求头
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// 门户站点的真实网络传输
#[derive(Clone)]
pub struct PortalTransport {
    client: Client,
    base_url: Url,
}

impl PortalTransport {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, GachaError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn should_copy_header(name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        name != "host" && name != "content-length" && !HOP_BY_HOP_HEADERS.contains(&name.as_str())
    }
}

#[async_trait]
impl Transport for PortalTransport {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, GachaError> {
        let url = self.base_url.join(&request.url)?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| GachaError::Request(e.to_string()))?;

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in request.headers.iter().filter(|(n, _)| Self::should_copy_header(n)) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        if let Some(ref listener) = request.listener {
            listener.on_ready_state_change(ReadyState::Opened);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Portal request failed: {} {}", request.method, e);
            GachaError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| Self::should_copy_header(name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        if let Some(ref listener) = request.listener {
            listener.on_ready_state_change(ReadyState::HeadersReceived);
        }

        let body = response.bytes().await?.to_vec();
        tracing::debug!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());

        request.notify_completion();

        Ok(InboundResponse {
            status,
            headers,
            body,
            synthetic: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_filtering() {
        assert!(PortalTransport::should_copy_header("Cookie"));
        assert!(PortalTransport::should_copy_header("accept"));
        assert!(!PortalTransport::should_copy_header("Host"));
        assert!(!PortalTransport::should_copy_header("Connection"));
        assert!(!PortalTransport::should_copy_header("transfer-encoding"));
    }

    #[test]
    fn test_transport_construction() {
        let base = Url::parse("https://account.yo-star.com").unwrap();
        assert!(PortalTransport::new(base, Duration::from_secs(5)).is_ok());
    }
}
