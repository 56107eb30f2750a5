//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 提示词助手错误类型
#[derive(Debug, Error)]
pub enum Error {
    // ==================== 配置错误 ====================
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Missing required configuration field: {field}")]
    ConfigMissingField { field: String },

    // ==================== 模板错误 ====================
    #[error("Template not found: {name}")]
    TemplateMissing { name: String },

    #[error("decode error, {0}")]
    Decode(String),

    // ==================== 后端错误 ====================
    #[error("{backend} request failed: HTTP {status} - {body}")]
    BackendStatus {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend} returned an invalid response: {message}")]
    InvalidResponse { backend: String, message: String },

    #[error("transport error, {0}")]
    Transport(#[from] reqwest::Error),

    // ==================== IO和序列化错误 ====================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// 是否为后端调用失败
    ///
    /// 仅这类错误受 [`crate::FailurePolicy`] 控制, 其余错误直接向上返回
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Error::BackendStatus { .. } | Error::InvalidResponse { .. } | Error::Transport(_)
        )
    }

    /// HTTP 状态码, 非状态码错误返回 None
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::BackendStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_message_names_status() {
        let err = Error::BackendStatus {
            backend: "openai".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(err.is_backend());
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_config_error_is_not_backend() {
        let err = Error::ConfigMissingField {
            field: "api_key".to_string(),
        };
        assert!(!err.is_backend());
        assert_eq!(err.status(), None);
    }
}
