//! 时间源
//!
//! 动画只通过 [`Clock`] 读取时间，测试中替换为 [`ManualClock`]
//! 即可逐位复现每一帧的计算结果。

use std::cell::Cell;
use std::time::{Duration, Instant};

/// 单调时间源
pub trait Clock {
    /// 自时钟创建以来经过的时间
    fn now(&self) -> Duration;
}

/// 基于 `Instant` 的系统时钟
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// 手动推进的时钟
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向前推进
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// 设置绝对时间
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
