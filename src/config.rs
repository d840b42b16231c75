// 运行配置
//
// 先加载 .env，再从环境变量读取，非法值回退到默认值

use std::time::Duration;
use url::Url;

pub const DEFAULT_PORTAL_BASE_URL: &str = "https://account.yo-star.com";
pub const DEFAULT_PORTAL_REFERRER: &str = "https://account.yo-star.com/game-info?game=ark&tab=gacha";

/// 服务配置
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub host: String,
    pub port: u16,
    /// 门户站点地址，宿主页面的请求和寻访记录查询都发往这里
    pub portal_base_url: Url,
    pub portal_referrer: String,
    pub portal_lang: String,
    pub request_timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            portal_base_url: Url::parse(DEFAULT_PORTAL_BASE_URL).expect("默认门户地址无效"),
            portal_referrer: DEFAULT_PORTAL_REFERRER.to_string(),
            portal_lang: "en".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ViewerConfig {
    /// 从环境变量读取配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            config.host = host;
        }

        if let Some(port) = lookup("PORT").and_then(|v| v.trim().parse().ok()) {
            config.port = port;
        }

        if let Some(raw) = lookup("PORTAL_BASE_URL") {
            match Url::parse(raw.trim()) {
                Ok(url) => config.portal_base_url = url,
                Err(e) => tracing::warn!("Invalid PORTAL_BASE_URL {}: {}", raw, e),
            }
        }

        if let Some(referrer) = lookup("PORTAL_REFERRER").filter(|v| !v.trim().is_empty()) {
            config.portal_referrer = referrer;
        }

        if let Some(lang) = lookup("PORTAL_LANG").filter(|v| !v.trim().is_empty()) {
            config.portal_lang = lang;
        }

        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 寻访记录接口的完整地址
    pub fn gacha_endpoint(&self) -> String {
        format!(
            "{}/api/game/gachas",
            self.portal_base_url.as_str().trim_end_matches('/')
        )
    }
}
