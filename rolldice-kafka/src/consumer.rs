//! ## Kafka 消费组客户端
//!
//! 保持订阅不变，一轮会话对应一次分区分配：分配完成即就绪，
//! 分区被撤销或重新分配时结束会话，交由协调者重新加入。

use crate::{config::SubscriberConfig, errors::SubscriberError, headers::record_from_message};
use rdkafka::{
    ClientContext,
    consumer::{BaseConsumer, CommitMode, Consumer, ConsumerContext, Rebalance, StreamConsumer},
    error::KafkaError,
    types::RDKafkaErrorCode,
};
use rolldice::{
    ConsumedRecord,
    domain::{GroupClient, RecordHandler},
    errors::TransportError,
    subscriber::Session,
};
use std::{
    future::Future,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// 分区分配状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Membership {
    pub(crate) generation: u64,
    pub(crate) assigned: bool,
}

/// 会话对分配状态的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// 首次认领分区，会话就绪
    Ready(u64),
    /// 分配未变
    Continue,
    /// 分区已重新分配
    Reassigned,
    /// 分区已撤销
    Revoked,
    /// 尚未认领分区
    Wait,
}

impl Membership {
    /// 以本轮会话认领时的分配代次判定下一步
    pub(crate) fn next(self, seen: Option<u64>) -> Decision {
        match (self.assigned, seen) {
            (true, None) => Decision::Ready(self.generation),
            (true, Some(g)) if g == self.generation => Decision::Continue,
            (true, Some(_)) => Decision::Reassigned,
            (false, Some(_)) => Decision::Revoked,
            (false, None) => Decision::Wait,
        }
    }
}

/// 消费组上下文
///
/// 在再均衡回调中记录分配状态，并让新分配的分区沿用暂停状态。
pub(crate) struct GroupContext {
    paused: AtomicBool,
    membership: watch::Sender<Membership>,
}

impl GroupContext {
    pub(crate) fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            membership: watch::Sender::new(Membership::default()),
        }
    }

    #[cfg(test)]
    pub(crate) fn membership(&self) -> Membership {
        *self.membership.borrow()
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    /// 新分配的分区是否需要暂停
    pub(crate) fn pause_on_assign(&self, partitions: usize) -> bool {
        partitions > 0 && self.paused.load(Ordering::SeqCst)
    }

    pub(crate) fn assigned(&self) {
        self.membership.send_modify(|m| {
            m.generation += 1;
            m.assigned = true;
        });
    }

    pub(crate) fn revoked(&self) {
        self.membership.send_modify(|m| m.assigned = false);
    }
}

impl ClientContext for GroupContext {}

impl ConsumerContext for GroupContext {
    fn post_rebalance(&self, consumer: &BaseConsumer<Self>, rebalance: &Rebalance<'_>) {
        match rebalance {
            Rebalance::Assign(tpl) => {
                info!(partitions = tpl.count(), "分区已分配");
                if self.pause_on_assign(tpl.count()) {
                    if let Err(e) = consumer.pause(tpl) {
                        error!("暂停新分配分区失败：{e}");
                    }
                }
                self.assigned();
            }
            Rebalance::Revoke(tpl) => {
                info!(partitions = tpl.count(), "分区已撤销");
                self.revoked();
            }
            Rebalance::Error(e) => {
                error!("再均衡错误：{e}");
                self.revoked();
            }
        }
    }
}

enum Step {
    Cancelled,
    Membership,
    Record(ConsumedRecord),
    Failed(KafkaError),
}

/// Kafka 消费组客户端
pub struct KafkaGroupClient {
    consumer: StreamConsumer<GroupContext>,
}

impl KafkaGroupClient {
    /// 创建消费者并订阅主题
    #[instrument(name = "build_consumer", skip_all, fields(group_id = %cfg.subscriber.group_id))]
    pub fn new(cfg: &SubscriberConfig) -> Result<Self, SubscriberError> {
        let consumer: StreamConsumer<GroupContext> = cfg
            .consumer_config()
            .create_with_context(GroupContext::new())?;
        let topics: Vec<&str> = cfg.subscriber.topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topics)?;
        info!("成功订阅主题 {}", topics.join(","));
        Ok(Self { consumer })
    }

    fn context(&self) -> &GroupContext {
        self.consumer.context()
    }

    fn store(&self, topic: &str, partition: i32, offset: i64) {
        if let Err(e) = self.consumer.store_offset(topic, partition, offset + 1) {
            warn!(topic, partition, offset, "存储偏移量失败：{e}");
        }
    }

    #[instrument(name = "group_session", skip_all)]
    async fn session<H: RecordHandler>(
        &self,
        handler: &H,
        session: &Session,
    ) -> Result<(), TransportError> {
        let mut membership = self.context().membership.subscribe();
        let mut generation = None;

        loop {
            let current = *membership.borrow_and_update();
            match current.next(generation) {
                Decision::Ready(g) => {
                    generation = Some(g);
                    session.mark_ready();
                }
                Decision::Reassigned => {
                    info!("分区已重新分配，结束本轮会话");
                    return Ok(());
                }
                Decision::Revoked => {
                    info!("分区已撤销，结束本轮会话");
                    return Ok(());
                }
                Decision::Continue | Decision::Wait => {}
            }

            let step = tokio::select! {
                biased;
                _ = session.cancelled() => Step::Cancelled,
                _ = membership.changed() => Step::Membership,
                msg = self.consumer.recv() => match msg {
                    Ok(m) => Step::Record(record_from_message(&m)),
                    Err(e) => Step::Failed(e),
                },
            };

            match step {
                Step::Cancelled => return Ok(()),
                Step::Membership => continue,
                Step::Record(record) => {
                    let (topic, partition, offset) =
                        (record.topic.clone(), record.partition, record.offset);
                    session.deliver(handler, record).await;
                    self.store(&topic, partition, offset);
                }
                Step::Failed(e @ KafkaError::MessageConsumptionFatal(_)) => {
                    return Err(TransportError::Consume(e.to_string()));
                }
                Step::Failed(e) => warn!("消费消息错误：{e}"),
            }
        }
    }
}

impl GroupClient for KafkaGroupClient {
    fn consume<H: RecordHandler>(
        &self,
        handler: &H,
        session: &Session,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        self.session(handler, session)
    }

    fn pause_all(&self) -> Result<(), TransportError> {
        let assignment = self
            .consumer
            .assignment()
            .map_err(|e| TransportError::Flow(e.to_string()))?;
        self.consumer
            .pause(&assignment)
            .map_err(|e| TransportError::Flow(e.to_string()))?;
        self.context().set_paused(true);
        Ok(())
    }

    fn resume_all(&self) -> Result<(), TransportError> {
        let assignment = self
            .consumer
            .assignment()
            .map_err(|e| TransportError::Flow(e.to_string()))?;
        self.consumer
            .resume(&assignment)
            .map_err(|e| TransportError::Flow(e.to_string()))?;
        self.context().set_paused(false);
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        match self.consumer.commit_consumer_state(CommitMode::Sync) {
            Ok(()) | Err(KafkaError::ConsumerCommit(RDKafkaErrorCode::NoOffset)) => {}
            Err(e) => return Err(TransportError::Close(e.to_string())),
        }
        self.consumer.unsubscribe();
        Ok(())
    }
}
