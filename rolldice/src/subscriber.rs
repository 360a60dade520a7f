//! ## 消费组协调者
//!
//! 后台任务反复运行消费组会话，直到共享的取消令牌被触发；
//! 传输层结束会话（如再均衡）时重新武装就绪门并再次加入。
//! 控制循环见 [`crate::lifecycle`]。

use crate::{
    Telemetry,
    domain::{GroupClient, RecordHandler},
    errors::TransportError,
    record::ConsumedRecord,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

/// 就绪门
///
/// 每轮会话只触发一次，重新加入前可再次武装。
#[derive(Debug, Clone)]
pub struct ReadyGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadyGate {
    /// 构造未触发的就绪门
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(false)),
        }
    }

    /// 触发，首次触发返回 `true`
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        })
    }

    /// 重新武装
    pub fn rearm(&self) {
        self.tx.send_replace(false);
    }

    /// 是否已触发
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// 等待触发
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

/// 消费组会话
///
/// 由协调者创建，后台消费任务与控制循环共享。
#[derive(Debug)]
pub struct Session {
    cancel: CancellationToken,
    ready: ReadyGate,
    telemetry: Telemetry,
}

impl Session {
    /// 构造会话
    pub fn new(telemetry: Telemetry) -> Self {
        Self {
            cancel: CancellationToken::new(),
            ready: ReadyGate::new(),
            telemetry,
        }
    }

    /// 标记已认领分区
    pub fn mark_ready(&self) {
        if self.ready.fire() {
            info!("消费组会话就绪");
        }
    }

    /// 就绪门
    pub fn ready(&self) -> &ReadyGate {
        &self.ready
    }

    /// 取消会话
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 等待取消
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// 分派一条记录
    ///
    /// 以记录头中的追踪上下文为父级开启 span，处理器返回即视为已处理，
    /// 处理器错误只记录，不中断消费。
    pub async fn deliver<H: RecordHandler>(&self, handler: &H, record: ConsumedRecord) {
        let span = info_span!(
            "consume_record",
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset
        );
        self.telemetry.adopt(&span, &record.headers);
        match handler.handle(record).instrument(span.clone()).await {
            Ok(()) => debug!(parent: &span, "记录处理完成"),
            Err(e) => error!(parent: &span, "记录处理失败：{e}"),
        }
    }
}

/// 流量控制
///
/// 暂停与恢复严格交替。
#[derive(Debug, Default)]
pub struct FlowControl {
    paused: bool,
}

impl FlowControl {
    /// 是否已暂停
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 切换暂停与恢复，返回切换后的暂停状态
    ///
    /// 客户端操作失败时状态不变。
    pub fn toggle<C: GroupClient>(&mut self, client: &C) -> Result<bool, TransportError> {
        if self.paused {
            client.resume_all()?;
            info!("恢复消费");
        } else {
            client.pause_all()?;
            info!("暂停消费");
        }
        self.paused = !self.paused;
        Ok(self.paused)
    }
}

/// 消费组协调者
pub struct Coordinator<C, H> {
    pub(crate) client: Arc<C>,
    pub(crate) handler: Arc<H>,
    pub(crate) session: Arc<Session>,
    pub(crate) flow: FlowControl,
}

impl<C, H> Coordinator<C, H>
where
    C: GroupClient,
    H: RecordHandler,
{
    /// 构造协调者
    pub fn new(client: C, handler: H, telemetry: Telemetry) -> Self {
        Self {
            client: Arc::new(client),
            handler: Arc::new(handler),
            session: Arc::new(Session::new(telemetry)),
            flow: FlowControl::default(),
        }
    }
}

/// 后台消费循环
///
/// 唯一的退出条件是会话被取消；消费错误不可恢复。
#[instrument(name = "consume_loop", skip_all)]
pub(crate) async fn consume_loop<C, H>(client: Arc<C>, handler: Arc<H>, session: Arc<Session>)
where
    C: GroupClient,
    H: RecordHandler,
{
    loop {
        if let Err(e) = client.consume(handler.as_ref(), &session).await {
            error!("消费组会话异常：{e}");
            session.cancel();
            panic!("消费组会话异常终止");
        }

        if session.is_cancelled() {
            info!("收到关闭信号，退出消费循环");
            break;
        }

        warn!("消费组会话被传输层结束，重新加入");
        session.ready().rearm();
        tokio::task::yield_now().await;
    }
}
