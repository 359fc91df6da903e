//! 每帧循环
//!
//! [`FrameLoop`] 把同步器和后端组合在一起，按固定顺序驱动一帧：
//!
//! ```text
//! acquire(slot) → write_uniforms → reset_allocator → record → encode
//!     → execute → signal → present → advance(back buffer) + wait
//! ```
//!
//! 关闭时 [`FrameLoop::shutdown`] 先清空队列，再释放后端持有的 GPU 资源。

use tracing::{error, info};

use super::command::{CommandStream, FrameRecorder};
use super::frame::SlotIndex;
use super::sync::{FenceValue, FrameSync, GpuTimeline, SlotLease};
use crate::core::error::Result;

/// 每帧循环需要的后端操作
pub trait FrameBackend {
    /// 常量缓冲区记录类型
    type Constants: Copy;

    /// 交换链当前的后台缓冲区
    fn current_back_buffer(&self) -> Result<SlotIndex>;

    /// 写入槽位的常量缓冲区区域
    fn write_uniforms(&mut self, slot: SlotIndex, constants: &Self::Constants);

    /// 重置槽位的命令分配器并开始记录
    fn reset_allocator(&mut self, lease: &SlotLease) -> Result<()>;

    /// 把命令流翻译为命令列表调用并关闭命令列表
    fn encode(&mut self, slot: SlotIndex, stream: &CommandStream) -> Result<()>;

    /// 提交到队列
    fn execute(&mut self) -> Result<()>;

    /// 呈现
    fn present(&mut self, slot: SlotIndex) -> Result<()>;
}

/// 帧循环
///
/// 字段按声明顺序释放：先后端（GPU 资源），后同步器（Fence 与事件）。
pub struct FrameLoop<B: FrameBackend, T: GpuTimeline> {
    backend: B,
    sync: FrameSync<T>,
    frames: u64,
    drained: bool,
}

impl<B: FrameBackend, T: GpuTimeline> FrameLoop<B, T> {
    pub fn new(backend: B, timeline: T) -> Result<Self> {
        let current = backend.current_back_buffer()?;
        Ok(Self {
            backend,
            sync: FrameSync::new(timeline, current),
            frames: 0,
            drained: false,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn sync(&self) -> &FrameSync<T> {
        &self.sync
    }

    /// 已提交的帧数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 渲染一帧，返回本帧提交对应的 Fence 值
    pub fn render_frame<F>(&mut self, constants: &B::Constants, record: F) -> Result<FenceValue>
    where
        F: FnOnce(&mut FrameRecorder),
    {
        let slot = self.sync.current();
        let lease = self.sync.acquire(slot)?;

        self.backend.write_uniforms(slot, constants);
        self.backend.reset_allocator(&lease)?;

        let mut recorder = FrameRecorder::begin();
        record(&mut recorder);
        let stream = recorder.finish();
        if cfg!(debug_assertions) {
            stream.validate()?;
        }

        self.backend.encode(slot, &stream)?;
        self.backend.execute()?;
        let value = self.sync.mark_submitted(slot)?;
        self.backend.present(slot)?;

        let next = self.backend.current_back_buffer()?;
        self.sync.advance(next)?;

        self.frames += 1;
        Ok(value)
    }

    /// 清空队列后释放后端
    pub fn shutdown(mut self) -> Result<()> {
        self.drained = true;
        self.sync.drain()?;
        info!(frames = self.frames, "GPU 队列已清空");
        Ok(())
    }
}

impl<B: FrameBackend, T: GpuTimeline> Drop for FrameLoop<B, T> {
    fn drop(&mut self) {
        if !self.drained {
            if let Err(e) = self.sync.drain() {
                error!("释放前清空 GPU 队列失败: {}", e);
            }
        }
    }
}
