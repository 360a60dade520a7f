//! ## 掷骰服务

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};
use rand::Rng;
use rolldice::{domain::RecordSink, errors::PublishError, publisher::Publisher};
use tracing::{Span, field, info, instrument};

/// 掷骰服务
pub struct RollService<S> {
    publisher: Publisher<S>,
    topic: String,
    rolls: Counter<u64>,
}

impl<S: RecordSink> RollService<S> {
    /// 构造掷骰服务，计数器取自全局指标提供者
    pub fn new(publisher: Publisher<S>, topic: impl Into<String>) -> Self {
        Self::with_meter(publisher, topic, &global::meter("rolldice"))
    }

    /// 以指定的 meter 构造掷骰服务
    pub fn with_meter(publisher: Publisher<S>, topic: impl Into<String>, meter: &Meter) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            rolls: meter
                .u64_counter("app.roll.count")
                .with_description("已发布的掷骰次数")
                .build(),
        }
    }

    /// 掷骰并发布结果
    ///
    /// 点数在 1 到 6 之间均匀分布，发布失败时原样返回错误。
    #[instrument(name = "Rolling", skip_all, fields(app.roll.result = field::Empty))]
    pub async fn dice(&self) -> Result<i32, PublishError> {
        let result = rand::thread_rng().gen_range(1..=6);
        self.publisher.publish_roll(&self.topic, result).await?;
        info!("掷骰结果 = {result}");
        Span::current().record("app.roll.result", result);
        self.rolls
            .add(1, &[KeyValue::new("app.roll.result", i64::from(result))]);
        Ok(result)
    }
}
