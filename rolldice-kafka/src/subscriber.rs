//! ## 消费启动

use crate::{config::SubscriberConfig, consumer::KafkaGroupClient, errors::SubscriberError};
use rolldice::{
    Telemetry,
    domain::RecordHandler,
    lifecycle::{ControlSignals, OsSignals},
    subscriber::Coordinator,
};
use tracing::{info, instrument};

/// 消费直到收到终止信号
///
/// 注册操作系统信号后运行消费组协调者，返回即表示客户端已关闭。
#[instrument(name = "start_consumption", skip_all, fields(group_id = %cfg.subscriber.group_id))]
pub async fn start_consumption<H: RecordHandler>(
    cfg: &SubscriberConfig,
    telemetry: Telemetry,
    handler: H,
) -> Result<(), SubscriberError> {
    let signals = OsSignals::new()?;
    consume_until(cfg, telemetry, handler, signals).await
}

/// 以给定控制事件来源运行消费组
pub async fn consume_until<H, S>(
    cfg: &SubscriberConfig,
    telemetry: Telemetry,
    handler: H,
    signals: S,
) -> Result<(), SubscriberError>
where
    H: RecordHandler,
    S: ControlSignals,
{
    let client = KafkaGroupClient::new(cfg)?;
    Coordinator::new(client, handler, telemetry).run(signals).await;
    info!("消费已停止");
    Ok(())
}
