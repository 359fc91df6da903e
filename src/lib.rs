//! dx_learning - Direct3D 学习示例
//!
//! 四个示例共享同一套核心模块：
//!
//! - DX11 彩色三角形（立即上下文）
//! - DX12 彩色三角形
//! - DX12 旋转的 Lambert 立方体
//! - DX12 可切换着色模式与材质的 PBR 演示
//!
//! # 模块结构
//!
//! - `core`: 配置、日志、错误处理、时间源、按键映射
//! - `math`: 左手坐标系变换
//! - `geometry`: 顶点格式、内置几何体、OBJ 加载
//! - `renderer`: 与图形 API 无关的帧循环（帧槽位、Fence、命令记录）
//! - `scene`: 每个示例的状态、常量缓冲区与绘制命令
//! - `gfx`: Direct3D 11/12 实现（仅 Windows）
//! - `app`: 窗口与事件循环
//!
//! 除 `gfx` 与 `app::run` 的 Windows 分支外，所有模块都与平台无关，
//! 可以在没有 GPU 的机器上测试。

pub mod app;
pub mod core;
pub mod geometry;
pub mod gfx;
pub mod math;
pub mod renderer;
pub mod scene;
