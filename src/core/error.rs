//! 错误类型
//!
//! 示例里的失败只有三种去向：
//!
//! - 启动阶段（窗口、设备、着色器、资源）失败一路返回到入口点，终止进程
//! - 模型加载失败由 PBR 场景记录 `warn!` 后吞掉，对应的几何体不可选
//! - 帧循环里的 Fence 等待与命令提交失败同样是致命的
//!
//! 所有变体只携带一段可读的说明，入口点负责把它显示给用户。

use std::fmt;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, DemoError>;

/// 模型加载失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFault {
    /// 文件不存在
    NotFound,
    /// 扩展名没有对应的加载器
    UnsupportedFormat,
    /// 加载器无法解析文件内容
    Parse,
    /// 解析成功，但几何数据不可用（索引越界、坐标不完整等）
    InvalidGeometry,
}

#[derive(Debug)]
pub enum DemoError {
    /// 配置文件无法读写或解析，或某个配置值无效
    Config { key: String, reason: String },
    /// 日志系统初始化失败（通常是重复初始化）
    Log(String),
    /// 平台、窗口或事件循环不可用
    Initialization(String),
    /// 适配器、设备、交换链创建或 Present 失败
    Device(String),
    /// HLSL 编译失败，说明中带编译器日志
    ShaderCompilation(String),
    /// 缓冲区、描述符堆、根签名、管线等 GPU 对象创建失败
    ResourceCreation(String),
    /// 命令记录、命令流检查或提交失败
    CommandExecution(String),
    /// Fence 值溢出、signal 或等待失败
    Synchronization(String),
    /// 模型加载失败，`origin` 为文件路径或 `<memory>`
    MeshLoad {
        origin: String,
        fault: MeshFault,
        detail: String,
    },
}

impl DemoError {
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        DemoError::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn mesh(origin: impl Into<String>, fault: MeshFault, detail: impl Into<String>) -> Self {
        DemoError::MeshLoad {
            origin: origin.into(),
            fault,
            detail: detail.into(),
        }
    }

    /// 失败发生的环节，用作日志字段和显示前缀
    pub fn stage(&self) -> &'static str {
        match self {
            DemoError::Config { .. } => "config",
            DemoError::Log(_) => "logging",
            DemoError::Initialization(_) => "window",
            DemoError::Device(_) => "device",
            DemoError::ShaderCompilation(_) => "shader",
            DemoError::ResourceCreation(_) => "resource",
            DemoError::CommandExecution(_) => "commands",
            DemoError::Synchronization(_) => "fence",
            DemoError::MeshLoad { .. } => "model",
        }
    }

    /// 帧循环开始后仍可能出现的错误
    pub fn is_frame_failure(&self) -> bool {
        matches!(
            self,
            DemoError::Device(_) | DemoError::CommandExecution(_) | DemoError::Synchronization(_)
        )
    }
}

impl fmt::Display for MeshFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeshFault::NotFound => "file not found",
            MeshFault::UnsupportedFormat => "unsupported format",
            MeshFault::Parse => "parse error",
            MeshFault::InvalidGeometry => "invalid geometry",
        })
    }
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.stage())?;
        match self {
            DemoError::Config { key, reason } => write!(f, "{}: {}", key, reason),
            DemoError::MeshLoad { origin, fault, detail } if detail.is_empty() => {
                write!(f, "{}: {}", origin, fault)
            }
            DemoError::MeshLoad { origin, fault, detail } => write!(f, "{}: {} ({})", origin, fault, detail),
            DemoError::Log(msg)
            | DemoError::Initialization(msg)
            | DemoError::Device(msg)
            | DemoError::ShaderCompilation(msg)
            | DemoError::ResourceCreation(msg)
            | DemoError::CommandExecution(msg)
            | DemoError::Synchronization(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DemoError {}
