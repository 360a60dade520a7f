//! ## Kafka 发布端

use crate::{config::PublisherConfig, errors::PublisherError, headers::to_owned_headers};
use rdkafka::producer::{FutureProducer, FutureRecord, future_producer};
use rolldice::{
    Delivery, OutgoingRecord, Telemetry, domain::RecordSink, errors::TransportError,
    publisher::Publisher,
};
use std::future::Future;
use tokio::time::Duration;
use tracing::{debug, info, instrument};

/// Kafka 记录写入端
pub struct KafkaSink {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaSink {
    /// 构造写入端
    pub fn new(cfg: &PublisherConfig) -> Result<Self, PublisherError> {
        let producer: FutureProducer = cfg.producer_config().create()?;
        info!(brokers = %cfg.kafka.brokers.join(","), "Kafka生产者已创建");
        Ok(Self {
            producer,
            timeout: cfg.kafka.timeout(),
        })
    }
}

impl RecordSink for KafkaSink {
    fn send(
        &self,
        record: OutgoingRecord,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send {
        self.write(record)
    }
}

impl KafkaSink {
    #[instrument(name = "kafka_write", level = "debug", skip_all, fields(topic = %record.topic))]
    async fn write(&self, record: OutgoingRecord) -> Result<Delivery, TransportError> {
        let future_record = FutureRecord::to(&record.topic)
            .key(&record.key)
            .payload(&record.value)
            .headers(to_owned_headers(&record.headers));

        self.producer
            .send(future_record, self.timeout)
            .await
            .map_err(|(e, _)| TransportError::Send(e.to_string()))
            .map(
                |future_producer::Delivery {
                     partition,
                     offset,
                     timestamp: _,
                 }| {
                    debug!("消息写入分区 {partition} 偏移 {offset}");
                    Delivery { partition, offset }
                },
            )
    }
}

/// 以 Kafka 为传输的发布者
pub fn publisher(
    cfg: &PublisherConfig,
    telemetry: Telemetry,
) -> Result<Publisher<KafkaSink>, PublisherError> {
    Ok(Publisher::new(KafkaSink::new(cfg)?, telemetry))
}
