//! 可靠事件发布的统一错误定义
//!
//! 聚焦序列化、发布日志、监听器分类与调用的最小必要集合，
//! 便于存储后端等实现层统一转换为 `EventError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 发布日志 ---
    #[error("publication log error: {reason}")]
    PublicationLog { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },

    // --- 监听器 ---
    #[error("unsupported listener: {reason}")]
    UnsupportedListener { reason: String },
    #[error("listener error: listener={listener}, reason={reason}")]
    Listener { listener: String, reason: String },
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;

// ---- Cross-crate conversions for infrastructure convenience ----
// 允许存储后端直接使用 `?` 将 sqlx 错误转换为 EventError

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for EventError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => EventError::NotFound {
                reason: "row not found".to_string(),
            },
            other => EventError::PublicationLog {
                reason: other.to_string(),
            },
        }
    }
}
