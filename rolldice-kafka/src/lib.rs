//! # **rolldice** 的 Kafka 实现
//!
//! 发布端基于 `FutureProducer`，消费端基于带再均衡上下文的 `StreamConsumer`，
//! 记录头与 Kafka 消息头互转以传播追踪上下文。

pub(crate) mod consumer;
pub(crate) mod headers;
pub(crate) mod producer;

pub mod config;
pub mod errors;
pub mod subscriber;

pub use consumer::KafkaGroupClient;
pub use producer::{KafkaSink, publisher};
pub use subscriber::{consume_until, start_consumption};
