//! DirectX 12 图形 API 实现模块
//!
//! - `context`：设备、命令队列、交换链、RTV/DSV 与命令分配器
//! - `descriptor`：RTV/DSV 描述符堆
//! - `fence`：Fence 与事件组成的 GPU 时间线
//! - `pipeline`：根签名与管线状态对象
//! - `buffer`：上传堆顶点/索引缓冲区与持久映射的常量缓冲区
//! - `renderer`：命令流翻译与场景驱动

pub mod buffer;
pub mod context;
pub mod descriptor;
pub mod fence;
pub mod pipeline;
pub mod renderer;

pub use context::Dx12Context;
pub use fence::Dx12Timeline;
pub use renderer::{Dx12Backend, Dx12Renderer};
