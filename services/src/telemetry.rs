//! ## 追踪、指标与日志初始化
//!
//! 进程启动时安装一次日志订阅者，并以同一资源构造追踪、指标与日志三个提供者。
//! `tracing` 事件经桥接层转发到日志提供者；返回的守卫在进程退出时
//! 刷新日志并依次关闭三个提供者。

use crate::errors::ServiceError;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{
    LogExporter, MetricExporter, SpanExporter, WithExportConfig, WithHttpConfig,
};
use opentelemetry_sdk::{
    Resource,
    logs::SdkLoggerProvider,
    metrics::{PeriodicReader, SdkMeterProvider},
    trace::SdkTracerProvider,
};
use rolldice::{Telemetry, config::TelemetryConfig};
use std::collections::HashMap;
use tracing::{Subscriber, error, info};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*, registry::LookupSpan};

/// 导出链路自身的日志不回送到日志提供者
const BRIDGE_FILTER: &str = "info,hyper=off,h2=off,reqwest=off,tonic=off,opentelemetry=off";

/// 三个提供者
pub struct Providers {
    /// 追踪提供者
    pub tracer: SdkTracerProvider,
    /// 指标提供者
    pub meter: SdkMeterProvider,
    /// 日志提供者
    pub logger: SdkLoggerProvider,
}

impl Providers {
    fn shutdown(self) {
        if let Err(e) = self.tracer.shutdown() {
            error!("关闭追踪提供者失败：{e}");
        }
        if let Err(e) = self.meter.shutdown() {
            error!("关闭指标提供者失败：{e}");
        }
        if let Err(e) = self.logger.shutdown() {
            error!("关闭日志提供者失败：{e}");
        }
    }
}

/// 追踪守卫
///
/// 持有日志写入线程与三个提供者，只关闭一次；未显式关闭时在析构时关闭。
pub struct TelemetryGuard {
    providers: Option<Providers>,
    _writer: WorkerGuard,
}

impl TelemetryGuard {
    /// 关闭导出
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(providers) = self.providers.take() {
            providers.shutdown();
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        self.close();
    }
}

/// 三个提供者共享的资源
pub fn resource(cfg: &TelemetryConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(cfg.service_name.clone())
        .with_attribute(KeyValue::new(
            "application",
            format!("/{}", cfg.service_name),
        ))
        .build()
}

pub(crate) fn signal_endpoint(base: &str, signal: &str) -> String {
    format!("{}/v1/{signal}", base.trim_end_matches('/'))
}

fn auth_headers(cfg: &TelemetryConfig) -> HashMap<String, String> {
    HashMap::from([(
        "Authorization".to_string(),
        format!("Basic {}", cfg.auth_token),
    )])
}

fn exporter_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Telemetry(e.to_string())
}

/// 构造追踪提供者
///
/// 未配置导出地址时只在进程内生成追踪上下文。
pub fn tracer_provider(
    cfg: &TelemetryConfig,
    resource: &Resource,
) -> Result<SdkTracerProvider, ServiceError> {
    let builder = SdkTracerProvider::builder().with_resource(resource.clone());
    if cfg.otlp_endpoint.is_empty() {
        return Ok(builder.build());
    }

    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(signal_endpoint(&cfg.otlp_endpoint, "traces"))
        .with_headers(auth_headers(cfg))
        .build()
        .map_err(exporter_error)?;
    Ok(builder.with_batch_exporter(exporter).build())
}

/// 构造指标提供者
///
/// 配置导出地址时周期性推送指标。
pub fn meter_provider(
    cfg: &TelemetryConfig,
    resource: &Resource,
) -> Result<SdkMeterProvider, ServiceError> {
    let builder = SdkMeterProvider::builder().with_resource(resource.clone());
    if cfg.otlp_endpoint.is_empty() {
        return Ok(builder.build());
    }

    let exporter = MetricExporter::builder()
        .with_http()
        .with_endpoint(signal_endpoint(&cfg.otlp_endpoint, "metrics"))
        .with_headers(auth_headers(cfg))
        .build()
        .map_err(exporter_error)?;
    Ok(builder
        .with_reader(PeriodicReader::builder(exporter).build())
        .build())
}

/// 构造日志提供者
pub fn logger_provider(
    cfg: &TelemetryConfig,
    resource: &Resource,
) -> Result<SdkLoggerProvider, ServiceError> {
    let builder = SdkLoggerProvider::builder().with_resource(resource.clone());
    if cfg.otlp_endpoint.is_empty() {
        return Ok(builder.build());
    }

    let exporter = LogExporter::builder()
        .with_http()
        .with_endpoint(signal_endpoint(&cfg.otlp_endpoint, "logs"))
        .with_headers(auth_headers(cfg))
        .build()
        .map_err(exporter_error)?;
    Ok(builder.with_batch_exporter(exporter).build())
}

/// 以同一资源构造三个提供者
pub fn providers(cfg: &TelemetryConfig) -> Result<Providers, ServiceError> {
    let resource = resource(cfg);
    Ok(Providers {
        tracer: tracer_provider(cfg, &resource)?,
        meter: meter_provider(cfg, &resource)?,
        logger: logger_provider(cfg, &resource)?,
    })
}

/// `tracing` 事件到日志提供者的桥接层
pub fn log_bridge<S>(provider: SdkLoggerProvider) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    OpenTelemetryTracingBridge::new(&provider).with_filter(EnvFilter::new(BRIDGE_FILTER))
}

/// 初始化日志、追踪与指标
pub fn init(cfg: &TelemetryConfig) -> Result<(Telemetry, TelemetryGuard), ServiceError> {
    let providers = providers(cfg)?;
    let tracer = providers.tracer.tracer(cfg.service_name.clone());
    let (writer, guard) = non_blocking(std::io::stdout());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(writer).with_target(false))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(log_bridge(providers.logger.clone()))
        .try_init()
        .map_err(exporter_error)?;
    global::set_meter_provider(providers.meter.clone());

    if cfg.otlp_endpoint.is_empty() {
        info!(service = %cfg.service_name, "未配置导出地址，仅在进程内传播追踪上下文");
    } else {
        info!(service = %cfg.service_name, endpoint = %cfg.otlp_endpoint, "追踪、指标与日志导出已启用");
    }

    Ok((
        Telemetry::default(),
        TelemetryGuard {
            providers: Some(providers),
            _writer: guard,
        },
    ))
}
