//! GPU 同步机制模块
//!
//! CPU 与 GPU 之间唯一的同步点。每次提交后在队列上 signal 一个严格递增的
//! Fence 值，并记录到提交所用的帧槽位上；重置某个槽位的命令分配器之前，
//! 必须确认 GPU 已经完成该槽位上次提交的工作。
//!
//! # 槽位状态
//!
//! ```text
//! Idle ──mark_submitted──▶ Submitted(v) ──poll / wait_for_slot──▶ Complete
//!                               ▲                                    │
//!                               └──────────mark_submitted────────────┘
//! ```

use tracing::{debug, trace};

use super::frame::{FrameSlots, SlotIndex, FRAME_COUNT};
use crate::core::error::{DemoError, Result};

/// Fence 值
///
/// 用于CPU-GPU同步的单调递增值。0 表示“尚未提交任何工作”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FenceValue(u64);

impl FenceValue {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// 下一个值，溢出时返回 `None`
    pub fn checked_next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

/// GPU 执行时间线
///
/// 对应 D3D12 的 Fence + OS 事件。测试中由伪实现替代。
pub trait GpuTimeline {
    /// 在队列中请求：之前提交的工作全部完成后把 Fence 置为 `value`
    fn signal(&mut self, value: FenceValue) -> Result<()>;

    /// GPU 最近一次观察到的完成值
    fn completed_value(&self) -> FenceValue;

    /// 阻塞直到完成值 ≥ `value`（无限等待）
    fn wait_until(&mut self, value: FenceValue) -> Result<()>;
}

/// 帧槽位状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// 从未提交
    #[default]
    Idle,
    /// 已提交，等待 GPU 完成
    Submitted(FenceValue),
    /// GPU 已完成
    Complete,
}

/// 槽位租约
///
/// 只能由 [`FrameSync::acquire`] 在确认 GPU 完成后发放，
/// 持有它才能重置该槽位的命令分配器。
#[derive(Debug)]
#[must_use]
pub struct SlotLease<const N: usize = FRAME_COUNT> {
    slot: SlotIndex<N>,
}

impl<const N: usize> SlotLease<N> {
    pub fn slot(&self) -> SlotIndex<N> {
        self.slot
    }
}

/// 帧同步器
///
/// 持有时间线、最近发出的 Fence 值、每个槽位的状态和当前槽位。
pub struct FrameSync<T: GpuTimeline, const N: usize = FRAME_COUNT> {
    timeline: T,
    last_value: FenceValue,
    slots: FrameSlots<SlotState, N>,
    current: SlotIndex<N>,
}

impl<T: GpuTimeline, const N: usize> FrameSync<T, N> {
    /// 创建同步器，`current` 为交换链当前的后台缓冲区
    pub fn new(timeline: T, current: SlotIndex<N>) -> Self {
        let last_value = timeline.completed_value();
        Self {
            timeline,
            last_value,
            slots: FrameSlots::default(),
            current,
        }
    }

    pub fn timeline(&self) -> &T {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut T {
        &mut self.timeline
    }

    /// 当前槽位
    pub fn current(&self) -> SlotIndex<N> {
        self.current
    }

    /// 最近一次发出的 Fence 值
    pub fn last_value(&self) -> FenceValue {
        self.last_value
    }

    pub fn slot_state(&self, slot: SlotIndex<N>) -> SlotState {
        self.slots[slot]
    }

    /// 分配下一个 Fence 值（严格递增）
    pub fn next_value(&mut self) -> Result<FenceValue> {
        let next = self.last_value.checked_next().ok_or_else(|| {
            DemoError::Synchronization("Fence 值溢出".to_string())
        })?;
        self.last_value = next;
        Ok(next)
    }

    /// 提交之后调用：分配新值、在队列上 signal，并记录到槽位
    pub fn mark_submitted(&mut self, slot: SlotIndex<N>) -> Result<FenceValue> {
        let value = self.next_value()?;
        self.timeline.signal(value)?;
        self.slots[slot] = SlotState::Submitted(value);
        trace!(slot = slot.get(), fence = value.value(), "signal");
        Ok(value)
    }

    /// 非阻塞地刷新槽位状态
    pub fn poll(&mut self, slot: SlotIndex<N>) -> SlotState {
        if let SlotState::Submitted(value) = self.slots[slot] {
            if self.timeline.completed_value() >= value {
                self.slots[slot] = SlotState::Complete;
            }
        }
        self.slots[slot]
    }

    /// 阻塞直到槽位上次提交的工作完成
    pub fn wait_for_slot(&mut self, slot: SlotIndex<N>) -> Result<()> {
        if let SlotState::Submitted(value) = self.poll(slot) {
            debug!(slot = slot.get(), fence = value.value(), "等待 GPU 完成槽位");
            self.timeline.wait_until(value)?;
            if self.timeline.completed_value() < value {
                return Err(DemoError::Synchronization(format!(
                    "等待返回后 Fence 仍未到达 {}",
                    value.value()
                )));
            }
            self.slots[slot] = SlotState::Complete;
        }
        Ok(())
    }

    /// 取得槽位租约（必要时阻塞）
    pub fn acquire(&mut self, slot: SlotIndex<N>) -> Result<SlotLease<N>> {
        self.wait_for_slot(slot)?;
        Ok(SlotLease { slot })
    }

    /// 切换到交换链报告的下一个槽位，并执行等待检查
    pub fn advance(&mut self, next: SlotIndex<N>) -> Result<()> {
        self.current = next;
        self.wait_for_slot(next)
    }

    /// 清空队列：signal 最后一个值并阻塞到 GPU 追上
    ///
    /// 只在关闭时使用。返回后所有槽位都处于 Complete 或 Idle。
    pub fn drain(&mut self) -> Result<()> {
        let value = self.next_value()?;
        self.timeline.signal(value)?;
        if self.timeline.completed_value() < value {
            debug!(fence = value.value(), "清空 GPU 队列");
            self.timeline.wait_until(value)?;
        }
        for (_, state) in self.slots.iter_mut() {
            if let SlotState::Submitted(_) = state {
                *state = SlotState::Complete;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing::{Event, EventLog, FakeTimeline};

    fn slot(i: usize) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    #[test]
    fn test_fence_value_ordering() {
        let f1 = FenceValue::new(1);
        let f2 = FenceValue::new(2);

        assert!(f1 < f2);
        assert_eq!(f1.checked_next(), Some(f2));
        assert_eq!(FenceValue::new(u64::MAX).checked_next(), None);
    }

    #[test]
    fn test_values_strictly_increase() {
        let mut sync = FrameSync::new(FakeTimeline::new(EventLog::default()), slot(0));

        let mut previous = sync.last_value();
        for frame in 0..10 {
            let value = sync.mark_submitted(slot(frame % 2)).unwrap();
            assert!(value > previous);
            previous = value;
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let timeline = FakeTimeline::starting_at(EventLog::default(), u64::MAX);
        let mut sync: FrameSync<_> = FrameSync::new(timeline, slot(0));

        assert!(matches!(
            sync.next_value(),
            Err(DemoError::Synchronization(_))
        ));
    }

    #[test]
    fn test_slot_state_machine() {
        let mut sync = FrameSync::new(FakeTimeline::new(EventLog::default()), slot(0));

        assert_eq!(sync.slot_state(slot(0)), SlotState::Idle);

        let v = sync.mark_submitted(slot(0)).unwrap();
        assert_eq!(sync.poll(slot(0)), SlotState::Submitted(v));

        sync.timeline_mut().complete_up_to(v.value());
        assert_eq!(sync.poll(slot(0)), SlotState::Complete);
    }

    #[test]
    fn test_reset_for_frame_three_waits_for_frame_one() {
        let log = EventLog::default();
        let mut sync = FrameSync::new(FakeTimeline::new(log.clone()), slot(0));

        // 帧 1 在槽位 0，帧 2 在槽位 1
        let marker1 = sync.mark_submitted(slot(0)).unwrap();
        let marker2 = sync.mark_submitted(slot(1)).unwrap();
        assert_eq!(sync.timeline().completed_value(), FenceValue::ZERO);

        // 帧 3 回到槽位 0
        let lease = sync.acquire(slot(0)).unwrap();
        assert_eq!(lease.slot(), slot(0));
        assert!(sync.timeline().completed_value() >= marker1);
        assert!(log.events().contains(&Event::Wait(marker1.value())));
        assert_eq!(sync.slot_state(slot(1)), SlotState::Submitted(marker2));
    }

    #[test]
    fn test_acquire_without_wait_when_complete() {
        let log = EventLog::default();
        let mut sync = FrameSync::new(FakeTimeline::new(log.clone()), slot(0));

        let v = sync.mark_submitted(slot(0)).unwrap();
        sync.timeline_mut().complete_up_to(v.value());
        let _lease = sync.acquire(slot(0)).unwrap();

        assert!(!log.events().iter().any(|e| matches!(e, Event::Wait(_))));
    }

    #[test]
    fn test_idle_slot_never_waits() {
        let log = EventLog::default();
        let mut sync = FrameSync::new(FakeTimeline::new(log.clone()), slot(0));

        sync.advance(slot(1)).unwrap();
        assert_eq!(sync.current(), slot(1));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_drain_waits_for_last_value() {
        let log = EventLog::default();
        let mut sync = FrameSync::new(FakeTimeline::new(log.clone()), slot(0));

        sync.mark_submitted(slot(0)).unwrap();
        sync.mark_submitted(slot(1)).unwrap();
        sync.drain().unwrap();

        let last = sync.last_value();
        assert_eq!(last.value(), 3);
        assert!(sync.timeline().completed_value() >= last);
        assert_eq!(log.events().last(), Some(&Event::Wait(3)));
        for s in SlotIndex::<FRAME_COUNT>::all() {
            assert_eq!(sync.slot_state(s), SlotState::Complete);
        }
    }
}
