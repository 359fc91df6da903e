//! 渲染器模块
//!
//! 与具体图形 API 无关的帧循环骨架：帧槽位、Fence 同步、资源状态、
//! 命令记录和每帧驱动顺序。`gfx` 中的 D3D12 后端实现这里的 trait。
//!
//! # 架构设计
//!
//! - `frame`：帧槽位索引与按槽位存储的数组
//! - `sync`：Fence 值、GPU 时间线与槽位状态机
//! - `resource`：资源状态与按槽位划分的常量缓冲区
//! - `command`：命令记录与状态转换检查
//! - `frame_loop`：每帧的固定顺序与关闭时的清空

pub mod command;
pub mod frame;
pub mod frame_loop;
pub mod resource;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandStream, FrameRecorder, MeshId, RecordedCommand, ResourceId};
pub use frame::{FrameSlots, SlotIndex, FRAME_COUNT};
pub use frame_loop::{FrameBackend, FrameLoop};
pub use resource::{align_constant_size, MappedUniform, ResourceState, UniformLayout};
pub use sync::{FenceValue, FrameSync, GpuTimeline, SlotLease, SlotState};
