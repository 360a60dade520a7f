//! ## 生命周期控制
//!
//! 控制循环在三个来源上等待：会话被取消、终止信号、流量切换信号。
//! 退出后取消会话，等待后台消费任务结束，再关闭客户端。
//!
//! ## 信号
//! **Unix 平台：**
//! - `SIGUSR1` 切换暂停与恢复
//! - `SIGINT`、`SIGTERM` 优雅退出
//!
//! **其他平台：**
//! - `Ctrl-C` 优雅退出

use crate::{
    domain::{GroupClient, RecordHandler},
    subscriber::{Coordinator, consume_loop},
};
use std::{future::Future, sync::Arc};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// 控制事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// 切换暂停与恢复
    Toggle,
    /// 优雅退出
    Terminate,
}

/// 控制事件来源
pub trait ControlSignals: Send {
    /// 等待下一个控制事件
    ///
    /// 实现必须可安全取消，未完成的等待被丢弃时不丢失事件。
    fn next_control(&mut self) -> impl Future<Output = Control> + Send;
}

impl ControlSignals for mpsc::UnboundedReceiver<Control> {
    fn next_control(&mut self) -> impl Future<Output = Control> + Send {
        async move { self.recv().await.unwrap_or(Control::Terminate) }
    }
}

/// 操作系统信号
#[cfg(unix)]
pub struct OsSignals {
    toggle: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// 注册信号监听
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            toggle: signal(SignalKind::user_defined1())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }
}

#[cfg(unix)]
impl ControlSignals for OsSignals {
    fn next_control(&mut self) -> impl Future<Output = Control> + Send {
        async move {
            tokio::select! {
                Some(()) = self.toggle.recv() => {
                    info!("收到 SIGUSR1 信号");
                    Control::Toggle
                }
                _ = self.interrupt.recv() => {
                    info!("收到 SIGINT 信号");
                    Control::Terminate
                }
                _ = self.terminate.recv() => {
                    info!("收到 SIGTERM 信号");
                    Control::Terminate
                }
            }
        }
    }
}

/// 操作系统信号
#[cfg(not(unix))]
pub struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    /// 注册信号监听
    pub fn new() -> std::io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
impl ControlSignals for OsSignals {
    fn next_control(&mut self) -> impl Future<Output = Control> + Send {
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("收到 Ctrl-C 信号"),
                Err(e) => error!("监听 Ctrl-C 信号失败: {e}"),
            }
            Control::Terminate
        }
    }
}

impl<C, H> Coordinator<C, H>
where
    C: GroupClient,
    H: RecordHandler,
{
    /// 运行消费组直到收到终止信号
    ///
    /// 后台消费任务的 panic 在此重新抛出；客户端关闭失败不可恢复。
    #[instrument(name = "consumer_group", skip_all)]
    pub async fn run<S: ControlSignals>(mut self, mut signals: S) {
        let consumer = tokio::spawn(consume_loop(
            Arc::clone(&self.client),
            Arc::clone(&self.handler),
            Arc::clone(&self.session),
        ));

        self.control(&mut signals).await;

        info!("开始优雅退出");
        self.session.cancel();
        match consumer.await {
            Ok(()) => info!("后台消费任务已结束"),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => error!("后台消费任务发生错误：{e}"),
        }

        if let Err(e) = self.client.close() {
            error!("{e}");
            panic!("消费组客户端关闭失败");
        }
        info!("消费组客户端已关闭");
    }

    async fn control<S: ControlSignals>(&mut self, signals: &mut S) {
        let session = Arc::clone(&self.session);
        let mut announced = false;
        loop {
            tokio::select! {
                biased;
                _ = session.cancelled() => {
                    info!("会话已取消");
                    break;
                }
                _ = session.ready().wait(), if !announced => {
                    announced = true;
                    info!("消费者已启动运行");
                }
                control = signals.next_control() => match control {
                    Control::Terminate => break,
                    Control::Toggle => {
                        if let Err(e) = self.flow.toggle(self.client.as_ref()) {
                            warn!("切换消费状态失败：{e}");
                        }
                    }
                }
            }
        }
    }
}
