use axum::Router;
use rolldice::{config::TelemetryConfig, domain::Config};
use rolldice_kafka::config::PublisherConfig;
use services::{
    config::{self, HttpConfig},
    errors::ServiceError,
    roll::RollService,
    routes, shutdown_signal, telemetry,
};
use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("掷骰服务异常退出：{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServiceError> {
    let source = config::load()?;
    let (telemetry, guard) = telemetry::init(&TelemetryConfig::for_service(&source, "rolldice")?)?;
    let publisher_cfg = PublisherConfig::load(&source)?;
    let http = HttpConfig::load(&source)?;

    let publisher = rolldice_kafka::publisher(&publisher_cfg, telemetry)?;
    let svc = Arc::new(RollService::new(publisher, publisher_cfg.publisher.topic.as_str()));
    let app = Router::new().merge(routes::roll_routes().with_state(svc));

    let listener = TcpListener::bind(&http.addr).await?;
    info!("掷骰服务监听 {}", http.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("掷骰服务已停止");
    guard.shutdown();
    Ok(())
}
