//! 核心功能模块
//!
//! 本模块提供了与图形 API 无关的基础功能，包括日志系统、配置管理、
//! 错误处理、时间源和键盘输入映射。
//!
//! # 模块组织
//!
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `config`：配置管理，支持从配置文件加载示例设置
//! - `error`：错误处理，定义统一的错误类型
//! - `clock`：时间源，可在测试中替换为手动时钟
//! - `input`：按键到场景命令的映射

pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod log;

// 重新导出常用类型，方便使用
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, SampleKind};
pub use error::{DemoError, Result};
pub use input::SceneCommand;
