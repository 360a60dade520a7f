use rolldice::{
    ConsumedRecord, Delivery, OutgoingRecord,
    domain::{GroupClient, RecordHandler, RecordSink},
    errors::TransportError,
    subscriber::Session,
};
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Notify;

/// 单分区内存总线，同时充当发布端与消费组客户端
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    pending: Mutex<VecDeque<ConsumedRecord>>,
    sent: Mutex<Vec<OutgoingRecord>>,
    next_offset: Mutex<i64>,
    committed: Mutex<HashMap<(String, i32), i64>>,
    journal: Mutex<Vec<&'static str>>,
    paused: AtomicBool,
    rebalance: AtomicBool,
    fail_send: AtomicBool,
    fail_consume: AtomicBool,
    fail_close: AtomicBool,
    changed: Notify,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingRecord> {
        self.inner.sent.lock().unwrap().clone()
    }

    pub fn journal(&self) -> Vec<&'static str> {
        self.inner.journal.lock().unwrap().clone()
    }

    pub fn committed(&self, topic: &str) -> Option<i64> {
        self.inner
            .committed
            .lock()
            .unwrap()
            .get(&(topic.to_string(), 0))
            .copied()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }

    pub fn rebalance(&self) {
        self.inner.rebalance.store(true, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
    }

    pub fn fail_send(&self) {
        self.inner.fail_send.store(true, Ordering::SeqCst);
    }

    pub fn fail_consume(&self) {
        self.inner.fail_consume.store(true, Ordering::SeqCst);
    }

    pub fn fail_close(&self) {
        self.inner.fail_close.store(true, Ordering::SeqCst);
    }

    fn log(&self, entry: &'static str) {
        self.inner.journal.lock().unwrap().push(entry);
    }

    async fn next_record(&self) -> ConsumedRecord {
        loop {
            let changed = self.inner.changed.notified();
            if !self.is_paused() {
                let next = self.inner.pending.lock().unwrap().pop_front();
                if let Some(record) = next {
                    return record;
                }
            }
            changed.await;
        }
    }

    async fn rebalanced(&self) {
        loop {
            let changed = self.inner.changed.notified();
            if self.inner.rebalance.swap(false, Ordering::SeqCst) {
                return;
            }
            changed.await;
        }
    }
}

impl RecordSink for MemoryBus {
    fn send(
        &self,
        record: OutgoingRecord,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send {
        async move {
            if self.inner.fail_send.load(Ordering::SeqCst) {
                return Err(TransportError::Send("Broker: Not enough in-sync replicas".to_string()));
            }
            let offset = {
                let mut next = self.inner.next_offset.lock().unwrap();
                let offset = *next;
                *next += 1;
                offset
            };
            self.inner.sent.lock().unwrap().push(record.clone());
            self.inner.pending.lock().unwrap().push_back(ConsumedRecord {
                topic: record.topic,
                partition: 0,
                offset,
                timestamp: None,
                key: Some(record.key),
                payload: record.value,
                headers: record.headers,
            });
            self.inner.changed.notify_waiters();
            Ok(Delivery {
                partition: 0,
                offset,
            })
        }
    }
}

impl GroupClient for MemoryBus {
    fn consume<H: RecordHandler>(
        &self,
        handler: &H,
        session: &Session,
    ) -> impl Future<Output = Result<(), TransportError>> + Send {
        async move {
            self.log("consume_enter");
            if self.inner.fail_consume.swap(false, Ordering::SeqCst) {
                self.log("consume_exit");
                return Err(TransportError::Consume("会话建立失败".to_string()));
            }
            session.mark_ready();

            loop {
                tokio::select! {
                    biased;
                    _ = session.cancelled() => break,
                    _ = self.rebalanced() => {
                        self.log("session_end");
                        break;
                    }
                    record = self.next_record() => {
                        let topic = record.topic.clone();
                        let offset = record.offset;
                        session.deliver(handler, record).await;
                        self.inner
                            .committed
                            .lock()
                            .unwrap()
                            .insert((topic, 0), offset + 1);
                    }
                }
            }

            self.log("consume_exit");
            Ok(())
        }
    }

    fn pause_all(&self) -> Result<(), TransportError> {
        self.inner.paused.store(true, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
        Ok(())
    }

    fn resume_all(&self) -> Result<(), TransportError> {
        self.inner.paused.store(false, Ordering::SeqCst);
        self.inner.changed.notify_waiters();
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        self.log("close");
        if self.inner.fail_close.load(Ordering::SeqCst) {
            return Err(TransportError::Close("连接已断开".to_string()));
        }
        Ok(())
    }
}
