//! ## 掷骰结果处理器

use crate::{
    RollEvent, domain::NotificationSender, errors::HandlerError, notify::PushMessage,
    record::ConsumedRecord,
};
use tracing::{info, instrument};

/// 掷骰结果通知处理器
///
/// 只负责分派，不管理传输生命周期。
pub struct RollEventHandler<N> {
    notifier: N,
    receiver_id: String,
}

impl<N: NotificationSender> RollEventHandler<N> {
    /// 构造处理器
    pub fn new(notifier: N, receiver_id: impl Into<String>) -> Self {
        Self {
            notifier,
            receiver_id: receiver_id.into(),
        }
    }

    /// 处理掷骰事件
    ///
    /// 在当前追踪上下文下开启子 span，发送失败时原样返回错误且不记录成功日志。
    #[instrument(name = "process_roll_event", skip_all, fields(roll_id = %event.roll_id()))]
    pub async fn handle(&self, event: &RollEvent) -> Result<(), HandlerError> {
        let payload = PushMessage::text(
            self.receiver_id.as_str(),
            format!("Rolled result: {}", event.result()),
        );
        self.notifier.send_push_message(&payload).await?;
        info!(result = event.result(), "已发送掷骰结果通知");
        Ok(())
    }

    /// 解码记录并处理
    pub async fn dispatch(&self, record: ConsumedRecord) -> Result<(), HandlerError> {
        let event = RollEvent::from_slice(&record.payload)?;
        self.handle(&event).await
    }
}
