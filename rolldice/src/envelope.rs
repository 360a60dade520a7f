//! 掷骰事件信封

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 掷骰事件
///
/// 构造后不可变，发布时序列化一次，消费时反序列化一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollEvent {
    roll_id: String,
    result: i32,
    timestamp: String,
}

impl RollEvent {
    /// 以当前时间构造事件
    pub fn new(roll_id: impl Into<String>, result: i32) -> Self {
        Self::at(roll_id, result, Utc::now())
    }

    /// 以指定时间构造事件
    pub fn at(roll_id: impl Into<String>, result: i32, time: DateTime<Utc>) -> Self {
        Self {
            roll_id: roll_id.into(),
            result,
            timestamp: time.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// 掷骰 Id
    pub fn roll_id(&self) -> &str {
        &self.roll_id
    }

    /// 掷骰结果
    pub fn result(&self) -> i32 {
        self.result
    }

    /// RFC3339 创建时间
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// 序列化
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 反序列化
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// 掷骰 Id 计数器
///
/// 进程内单调递增，由发布者持有。
#[derive(Debug, Default)]
pub struct RollIdCounter(AtomicU64);

impl RollIdCounter {
    /// 构造计数器
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// 取下一个 Id
    #[inline]
    pub fn next(&self) -> String {
        (self.0.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}
