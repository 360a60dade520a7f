//! ## 通知服务接线

use rolldice::{
    ConsumedRecord,
    domain::{NotificationSender, RecordHandler},
    handler::RollEventHandler,
};
use std::sync::Arc;
use tracing::info;

/// 包装掷骰结果处理器
///
/// 认领记录后先记录主题、分区、偏移量与时间戳再解码处理；
/// 处理错误返回给协调者记录，不终止进程。
pub fn claim_handler<N: NotificationSender>(handler: RollEventHandler<N>) -> impl RecordHandler {
    let handler = Arc::new(handler);
    move |record: ConsumedRecord| {
        let handler = Arc::clone(&handler);
        async move {
            info!(
                topic = %record.topic,
                partition = record.partition,
                offset = record.offset,
                timestamp = ?record.timestamp,
                "已认领消息"
            );
            handler.dispatch(record).await
        }
    }
}
