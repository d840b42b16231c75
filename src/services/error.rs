// 寻访记录服务错误类型定义
//
// 拦截器、传输层和拉取器共用的错误类型

use thiserror::Error;

/// 传输与解析错误
#[derive(Debug, Error)]
pub enum GachaError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("请求超时")]
    Timeout,

    #[error("HTTP 错误: 状态码 {0}")]
    Http(u16),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("请求构建失败: {0}")]
    Request(String),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
}

// 实现从 reqwest::Error 到 GachaError 的转换
impl From<reqwest::Error> for GachaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GachaError::Timeout
        } else if err.is_status() {
            match err.status() {
                Some(status) => GachaError::Http(status.as_u16()),
                None => GachaError::Network(err.to_string()),
            }
        } else if err.is_builder() {
            GachaError::Request(err.to_string())
        } else {
            GachaError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for GachaError {
    fn from(err: url::ParseError) -> Self {
        GachaError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GachaError::Http(502).to_string(), "HTTP 错误: 状态码 502");
        assert_eq!(GachaError::Timeout.to_string(), "请求超时");
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let gacha_err: GachaError = err.into();
        assert!(matches!(gacha_err, GachaError::Json(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let err = url::Url::parse("not a url").unwrap_err();
        let gacha_err: GachaError = err.into();
        assert!(matches!(gacha_err, GachaError::InvalidUrl(_)));
    }
}
