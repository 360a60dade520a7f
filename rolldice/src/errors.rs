//! # **rolldice** 错误定义

use thiserror::Error;

/// 传输层错误
///
/// 具体传输实现的错误在此边界转换为文本，核心不依赖任何传输库。
#[derive(Debug, Error)]
pub enum TransportError {
    /// 写入失败
    #[error("写入消息失败：{0}")]
    Send(String),
    /// 消费失败
    #[error("消费会话失败：{0}")]
    Consume(String),
    /// 暂停或恢复失败
    #[error("流量控制失败：{0}")]
    Flow(String),
    /// 关闭失败
    #[error("关闭客户端失败：{0}")]
    Close(String),
}

/// 发布错误
#[derive(Debug, Error)]
pub enum PublishError {
    /// 信封序列化错误
    #[error("信封序列化错误")]
    Encode(#[from] serde_json::Error),
    /// 发布到主题失败
    #[error("发布消息到主题'{topic}'失败：{source}")]
    Transport {
        /// 目标主题
        topic: String,
        /// 传输层错误
        source: TransportError,
    },
}

/// 通知发送错误
#[derive(Debug, Error)]
pub enum NotifyError {
    /// 请求未完成
    #[error("通知请求失败：{0}")]
    Request(#[from] reqwest::Error),
    /// 非 2xx 响应
    #[error("通知发送失败，状态码：{0}")]
    Status(u16),
}

/// 处理器错误
#[derive(Debug, Error)]
pub enum HandlerError {
    /// 信封反序列化错误
    #[error("信封反序列化错误：{0}")]
    Decode(#[from] serde_json::Error),
    /// 通知发送错误
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置加载错误
    #[error("加载配置失败：{0}")]
    Load(#[from] config::ConfigError),
    /// 配置校验错误
    #[error("配置'{section}.{key}'校验失败：{message}")]
    ValidationError {
        /// 配置节
        section: String,
        /// 配置名
        key: String,
        /// 错误信息
        message: String,
    },
}
