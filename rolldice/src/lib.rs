//! # **rolldice** 事件管道核心
//!
//! 掷骰结果经发布者写入消息主题，消费组协调者认领消息并分派到处理器，
//! 追踪上下文随记录头跨越传输边界。传输实现由 `rolldice-kafka` 提供。

#![warn(missing_docs)]

mod record;

pub mod config;
pub mod domain;
pub mod envelope;
pub mod errors;
pub mod handler;
pub mod lifecycle;
pub mod notify;
pub mod publisher;
pub mod subscriber;
pub mod telemetry;

pub use envelope::{RollEvent, RollIdCounter};
pub use record::{ConsumedRecord, Delivery, OutgoingRecord, RecordHeaders};
pub use telemetry::Telemetry;
