//! 追踪上下文传播

use opentelemetry::{
    Context,
    propagation::{Extractor, Injector, TextMapPropagator},
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::{fmt, sync::Arc};
use tracing::{Span, debug};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// 追踪能力
///
/// 由进程入口构造一次，显式传入发布者、订阅者与通知发送者。
/// 日志与 span 经由已安装的 `tracing` 订阅者输出。
#[derive(Clone)]
pub struct Telemetry {
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
}

impl Telemetry {
    /// 以指定传播器构造
    pub fn new(propagator: impl TextMapPropagator + Send + Sync + 'static) -> Self {
        Self {
            propagator: Arc::new(propagator),
        }
    }

    /// 将 span 的追踪上下文注入载体
    pub fn inject(&self, span: &Span, carrier: &mut dyn Injector) {
        self.inject_context(&span.context(), carrier);
    }

    /// 将追踪上下文注入载体
    pub fn inject_context(&self, cx: &Context, carrier: &mut dyn Injector) {
        self.propagator.inject_context(cx, carrier);
    }

    /// 从载体提取追踪上下文
    pub fn extract(&self, carrier: &dyn Extractor) -> Context {
        self.propagator.extract(carrier)
    }

    /// 以载体中的上下文作为 span 的父级
    pub fn adopt(&self, span: &Span, carrier: &dyn Extractor) {
        if let Err(e) = span.set_parent(self.extract(carrier)) {
            debug!("关联父级追踪上下文失败：{e}");
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(TraceContextPropagator::new())
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}
