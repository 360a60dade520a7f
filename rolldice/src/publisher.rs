//! ## 发布者

use crate::{
    RollEvent, RollIdCounter, Telemetry,
    domain::RecordSink,
    errors::PublishError,
    record::{Delivery, OutgoingRecord, RecordHeaders},
};
use tracing::{Span, error, info, instrument};

/// 发布者结构
pub struct Publisher<S> {
    sink: S,
    telemetry: Telemetry,
    roll_ids: RollIdCounter,
}

impl<S: RecordSink> Publisher<S> {
    /// 构造发布者
    pub fn new(sink: S, telemetry: Telemetry) -> Self {
        Self {
            sink,
            telemetry,
            roll_ids: RollIdCounter::new(),
        }
    }

    /// 发布消息
    ///
    /// 当前 span 的追踪上下文写入记录头，成功与失败都会记录主题、键与消息体。
    #[instrument(name = "publish_to_kafka", skip_all, fields(topic = %topic, key = %key))]
    pub async fn publish(&self, topic: &str, value: &str, key: &str) -> Result<Delivery, PublishError> {
        let mut headers = RecordHeaders::new();
        self.telemetry.inject(&Span::current(), &mut headers);
        let record = OutgoingRecord {
            topic: topic.to_owned(),
            key: key.as_bytes().to_vec(),
            value: value.as_bytes().to_vec(),
            headers,
        };

        match self.sink.send(record).await {
            Ok(delivery) => {
                info!(
                    topic,
                    key,
                    value,
                    partition = delivery.partition,
                    offset = delivery.offset,
                    "消息已发布到主题"
                );
                Ok(delivery)
            }
            Err(e) => {
                error!(topic, key, value, error = %e, "发布消息失败");
                Err(PublishError::Transport {
                    topic: topic.to_owned(),
                    source: e,
                })
            }
        }
    }

    /// 发布掷骰结果
    ///
    /// 分配掷骰 Id 并构造信封，以掷骰 Id 作为消息键。
    pub async fn publish_roll(&self, topic: &str, result: i32) -> Result<RollEvent, PublishError> {
        let event = RollEvent::new(self.roll_ids.next(), result);
        let value = event.to_json()?;
        self.publish(topic, &value, event.roll_id()).await?;
        Ok(event)
    }
}
