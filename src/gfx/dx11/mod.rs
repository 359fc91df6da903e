//! DirectX 11 三角形示例
//!
//! 立即上下文按提交顺序执行，示例不需要 Fence；其余部分与 D3D12 示例
//! 共享配置、日志和着色器编译。

pub mod renderer;

pub use renderer::Dx11Renderer;
