#![allow(dead_code)]

pub mod logs;
pub mod memory;
pub mod notifier;

use opentelemetry::{
    Context,
    trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState},
};
use std::future::Future;
use tokio::time::{Duration, sleep, timeout};

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const SPAN_ID: &str = "00f067aa0ba902b7";

pub fn remote_context() -> Context {
    let span_context = SpanContext::new(
        TraceId::from_hex(TRACE_ID).unwrap(),
        SpanId::from_hex(SPAN_ID).unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    Context::new().with_remote_span_context(span_context)
}

pub async fn within<F: Future>(future: F) -> F::Output {
    timeout(Duration::from_secs(5), future)
        .await
        .expect("等待超时")
}

pub async fn eventually(mut check: impl FnMut() -> bool) {
    within(async {
        while !check() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
}
