//! # 掷骰服务与通知服务
//!
//! `rolldice` 进程提供 `GET /roll` 并发布掷骰结果，
//! `notification` 进程消费掷骰结果并推送通知。

pub mod config;
pub mod errors;
pub mod notification;
pub mod roll;
pub mod routes;
pub mod telemetry;

use tracing::{error, info};

/// 等待 `Ctrl-C` 或 `SIGTERM`
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("监听 Ctrl-C 信号失败: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("监听 SIGTERM 信号失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("收到关闭信号，开始优雅退出");
}
