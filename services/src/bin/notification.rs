use rolldice::{
    config::{NotifyConfig, TelemetryConfig},
    domain::Config,
    handler::RollEventHandler,
    notify::LineNotifier,
};
use rolldice_kafka::{config::SubscriberConfig, start_consumption};
use services::{config, errors::ServiceError, notification::claim_handler, telemetry};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("通知服务异常退出：{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServiceError> {
    let source = config::load()?;
    let (telemetry, guard) =
        telemetry::init(&TelemetryConfig::for_service(&source, "notification")?)?;
    let notify_cfg = NotifyConfig::load(&source)?;
    let subscriber_cfg = SubscriberConfig::load(&source)?;

    let notifier = LineNotifier::new(&notify_cfg, telemetry.clone())?;
    let handler = RollEventHandler::new(notifier, notify_cfg.receiver_id.as_str());

    info!("通知服务启动中");
    start_consumption(&subscriber_cfg, telemetry, claim_handler(handler)).await?;
    info!("通知服务已停止");
    guard.shutdown();
    Ok(())
}
