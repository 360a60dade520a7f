use rolldice::errors::{ConfigError, NotifyError};
use rolldice_kafka::errors::{PublisherError, SubscriberError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("配置错误：{0}")]
    Config(#[from] ConfigError),
    #[error("发布者错误：{0}")]
    Publisher(#[from] PublisherError),
    #[error("订阅者错误：{0}")]
    Subscriber(#[from] SubscriberError),
    #[error("通知发送者错误：{0}")]
    Notify(#[from] NotifyError),
    #[error("追踪初始化失败：{0}")]
    Telemetry(String),
    #[error("IO错误：{0}")]
    Io(#[from] std::io::Error),
}
