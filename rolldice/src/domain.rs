//! # **rolldice** 特征

use crate::{
    errors::{ConfigError, HandlerError, NotifyError, TransportError},
    notify::PushMessage,
    record::{ConsumedRecord, Delivery, OutgoingRecord},
    subscriber::Session,
};
use std::future::Future;

/// 记录写入特征
pub trait RecordSink: Send + Sync + 'static {
    /// 写入记录并等待确认
    ///
    /// 重试由传输层负责，调用方只发起一次写入。
    fn send(
        &self,
        record: OutgoingRecord,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send;
}

/// 消费组客户端特征
pub trait GroupClient: Send + Sync + 'static {
    /// 运行一轮消费组会话
    ///
    /// 认领分区后调用 [`Session::mark_ready`]，逐条经 [`Session::deliver`] 分派记录。
    /// 会话被取消或被传输层结束（如再均衡）时返回 `Ok`，其余错误不可恢复。
    fn consume<H: RecordHandler>(
        &self,
        handler: &H,
        session: &Session,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
    /// 暂停全部已分配分区，不离开消费组
    fn pause_all(&self) -> Result<(), TransportError>;
    /// 恢复全部已分配分区
    fn resume_all(&self) -> Result<(), TransportError>;
    /// 关闭客户端
    fn close(&self) -> Result<(), TransportError>;
}

/// 记录处理特征
pub trait RecordHandler: Send + Sync + 'static {
    /// 处理一条记录
    fn handle(
        &self,
        record: ConsumedRecord,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

impl<F, Fut> RecordHandler for F
where
    F: Fn(ConsumedRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    #[inline]
    fn handle(
        &self,
        record: ConsumedRecord,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send {
        self(record)
    }
}

/// 通知发送特征
pub trait NotificationSender: Send + Sync + 'static {
    /// 发送推送消息
    fn send_push_message(
        &self,
        payload: &PushMessage,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// 配置特征
pub trait Config: Sized {
    /// 从已构建的配置源加载
    fn load(config: &config::Config) -> Result<Self, ConfigError>;
}
