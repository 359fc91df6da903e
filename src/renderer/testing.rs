//! 测试用的伪 GPU
//!
//! 所有伪对象把调用按顺序写入同一个 [`EventLog`]，
//! 测试通过检查日志验证同步顺序。

use std::cell::RefCell;
use std::rc::Rc;

use super::sync::{FenceValue, GpuTimeline};
use crate::core::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    WriteUniform { slot: usize },
    ResetAllocator { slot: usize },
    Encode { slot: usize, commands: usize },
    Execute { slot: usize },
    Signal(u64),
    Wait(u64),
    Present { slot: usize },
    Release,
}

/// 共享的调用日志
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == event)
    }
}

/// 伪时间线
///
/// signal 不会立即完成；`wait_until` 模拟 GPU 在等待期间追上。
#[derive(Debug)]
pub struct FakeTimeline {
    log: EventLog,
    completed: u64,
}

impl FakeTimeline {
    pub fn new(log: EventLog) -> Self {
        Self::starting_at(log, 0)
    }

    pub fn starting_at(log: EventLog, completed: u64) -> Self {
        Self { log, completed }
    }

    /// 模拟 GPU 完成到 `value`
    pub fn complete_up_to(&mut self, value: u64) {
        self.completed = self.completed.max(value);
    }
}

impl GpuTimeline for FakeTimeline {
    fn signal(&mut self, value: FenceValue) -> Result<()> {
        self.log.push(Event::Signal(value.value()));
        Ok(())
    }

    fn completed_value(&self) -> FenceValue {
        FenceValue::new(self.completed)
    }

    fn wait_until(&mut self, value: FenceValue) -> Result<()> {
        self.log.push(Event::Wait(value.value()));
        self.complete_up_to(value.value());
        Ok(())
    }
}
