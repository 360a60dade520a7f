use rdkafka::error::KafkaError;
use rolldice::errors::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("Kafka错误：{0}")]
    Kafka(#[from] KafkaError),
    #[error("配置错误：{0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("Kafka错误：{0}")]
    Kafka(#[from] KafkaError),
    #[error("配置错误：{0}")]
    Config(#[from] ConfigError),
    #[error("信号注册失败：{0}")]
    Signal(#[from] std::io::Error),
}
