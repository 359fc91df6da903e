//! 配置管理模块
//!
//! 提供示例程序配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//! 配置文件和命令行参数都是可选的，默认值与各示例写死的常量一致。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [sample]
//! kind = "pbr"        # dx11-triangle, dx12-triangle, lambert, pbr
//!
//! [window]
//! width = 1280        # 可选，缺省时使用示例自身的尺寸
//! height = 720
//!
//! [graphics]
//! vsync = true
//! use_warp = false
//! debug_layer = false
//!
//! [animation]
//! pause_affects_light = false
//!
//! [assets]
//! pbr_shader = "src/gfx/dx12/shaders/pbr.hlsl"
//! model = "assets/models/model.obj"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{DemoError, Result};

/// 示例程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 选择运行的示例
    #[serde(default)]
    pub sample: SampleConfig,

    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 动画配置
    #[serde(default)]
    pub animation: AnimationConfig,

    /// 外部资源路径
    #[serde(default)]
    pub assets: AssetConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 示例选择
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    #[serde(default = "default_sample_kind")]
    pub kind: SampleKind,
}

/// 示例类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleKind {
    /// Direct3D 11 彩色三角形
    Dx11Triangle,
    /// Direct3D 12 彩色三角形
    Dx12Triangle,
    /// Direct3D 12 旋转的 Lambert 立方体
    Lambert,
    /// Direct3D 12 可切换的 PBR 演示
    Pbr,
}

/// 窗口配置
///
/// 宽高为空时使用示例自身的默认尺寸。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    /// 覆盖窗口标题（PBR 示例运行时仍会刷新标题）
    #[serde(default)]
    pub title: Option<String>,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步（Present 的 SyncInterval 为 1）
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 使用 WARP 软件适配器
    #[serde(default)]
    pub use_warp: bool,

    /// 启用 D3D 调试层
    #[serde(default = "default_debug_layer")]
    pub debug_layer: bool,
}

/// 动画配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// 暂停时是否同时冻结光源轨道
    ///
    /// 默认 `false`：暂停只冻结立方体旋转，光源轨道继续按真实时间运动。
    #[serde(default)]
    pub pause_affects_light: bool,
}

/// 外部资源路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// PBR 着色器源文件
    #[serde(default = "default_pbr_shader")]
    pub pbr_shader: PathBuf,

    /// PBR 示例加载的模型文件
    #[serde(default = "default_model")]
    pub model: PathBuf,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_sample_kind() -> SampleKind { SampleKind::Pbr }
fn default_vsync() -> bool { true }
fn default_debug_layer() -> bool { cfg!(debug_assertions) }
fn default_pbr_shader() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/gfx/dx12/shaders/pbr.hlsl")
}
fn default_model() -> PathBuf { PathBuf::from("assets/models/model.obj") }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_file() -> String { "dx_learning.log".to_string() }

impl Default for SampleConfig {
    fn default() -> Self {
        Self { kind: default_sample_kind() }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            use_warp: false,
            debug_layer: default_debug_layer(),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            pbr_shader: default_pbr_shader(),
            model: default_model(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DemoError::config(path.display().to_string(), format!("cannot read file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| DemoError::config(path.display().to_string(), format!("invalid TOML: {}", e)))
    }

    /// 读取可选的配置文件
    ///
    /// 文件不存在返回 `Ok(None)`；文件存在但无法读取或解析时返回错误。
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// 从配置文件加载，文件不存在或无法解析时使用默认配置
    ///
    /// 解析失败会记录 `warn!`，不会静默丢弃用户的配置。
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_optional_file(path) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                warn!("配置文件无效，使用默认配置: {}", e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| DemoError::config(path.display().to_string(), format!("cannot serialize: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| DemoError::config(path.display().to_string(), format!("cannot write file: {}", e)))
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--sample <name>`: 选择示例（dx11-triangle / dx12-triangle / lambert / pbr）
    /// - `--width <value>`: 设置窗口宽度
    /// - `--height <value>`: 设置窗口高度
    /// - `--warp`: 使用 WARP 软件适配器
    /// - `--no-vsync`: 关闭垂直同步
    ///
    /// 无法识别的值会被忽略。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if let Some(kind) = value_after(&args, "--sample").and_then(SampleKind::from_name) {
            self.sample.kind = kind;
        }

        if let Some(width) = value_after(&args, "--width").and_then(|v| v.parse().ok()) {
            self.window.width = Some(width);
        }

        if let Some(height) = value_after(&args, "--height").and_then(|v| v.parse().ok()) {
            self.window.height = Some(height);
        }

        if args.iter().any(|a| a == "--warp") {
            self.graphics.use_warp = true;
        }

        if args.iter().any(|a| a == "--no-vsync") {
            self.graphics.vsync = false;
        }
    }

    /// 验证配置的有效性
    ///
    /// 窗口尺寸必须非零；PBR 示例需要非空的着色器路径和模型路径。
    pub fn validate(&self) -> Result<()> {
        if self.window.width == Some(0) || self.window.height == Some(0) {
            return Err(DemoError::config("window.width/height", "Window dimensions must be greater than 0"));
        }

        if self.sample.kind == SampleKind::Pbr {
            if self.assets.pbr_shader.as_os_str().is_empty() {
                return Err(DemoError::config("assets.pbr_shader", "The PBR sample needs a shader source path"));
            }
            if self.assets.model.as_os_str().is_empty() {
                return Err(DemoError::config("assets.model", "The PBR sample needs a model path"));
            }
        }

        Ok(())
    }

    /// 最终使用的窗口尺寸
    pub fn window_size(&self) -> (u32, u32) {
        let (width, height) = self.sample.kind.default_size();
        (
            self.window.width.unwrap_or(width),
            self.window.height.unwrap_or(height),
        )
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).map(String::as_str)
}

impl SampleKind {
    /// 从命令行名称解析
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dx11-triangle" | "dx11" => Some(SampleKind::Dx11Triangle),
            "dx12-triangle" | "triangle" => Some(SampleKind::Dx12Triangle),
            "lambert" | "cube" => Some(SampleKind::Lambert),
            "pbr" => Some(SampleKind::Pbr),
            _ => None,
        }
    }

    /// 示例默认的窗口尺寸
    pub fn default_size(&self) -> (u32, u32) {
        match self {
            SampleKind::Dx11Triangle => (800, 600),
            SampleKind::Dx12Triangle | SampleKind::Lambert | SampleKind::Pbr => (1280, 720),
        }
    }

    /// 是否使用 Direct3D 12 后端
    pub fn is_dx12(&self) -> bool {
        !matches!(self, SampleKind::Dx11Triangle)
    }

    /// 获取示例名称
    pub fn name(&self) -> &'static str {
        match self {
            SampleKind::Dx11Triangle => "DX11 Hello Triangle",
            SampleKind::Dx12Triangle => "DX12 Hello Triangle",
            SampleKind::Lambert => "DX12 Lambert Cube",
            SampleKind::Pbr => "DX12 PBR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample.kind, SampleKind::Pbr);
        assert_eq!(config.window_size(), (1280, 720));
        assert!(config.graphics.vsync);
        assert!(!config.animation.pause_affects_light);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.window.width = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.assets.pbr_shader = PathBuf::new();
        assert!(config.validate().is_err());

        config.sample.kind = SampleKind::Lambert;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_path_is_rejected_for_pbr() {
        let mut config = Config::default();
        config.assets.model = PathBuf::new();

        match config.validate() {
            Err(DemoError::Config { key, .. }) => assert_eq!(key, "assets.model"),
            other => panic!("unexpected result: {:?}", other),
        }

        config.sample.kind = SampleKind::Dx12Triangle;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["dx_learning", "--sample", "dx11-triangle", "--height", "480", "--warp", "--no-vsync"]);

        assert_eq!(config.sample.kind, SampleKind::Dx11Triangle);
        assert_eq!(config.window_size(), (800, 480));
        assert!(config.graphics.use_warp);
        assert!(!config.graphics.vsync);
    }

    #[test]
    fn test_apply_args_ignores_garbage() {
        let mut config = Config::default();
        config.apply_args(["dx_learning", "--sample", "vulkan", "--width", "wide"]);

        assert_eq!(config.sample.kind, SampleKind::Pbr);
        assert_eq!(config.window.width, None);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [sample]
            kind = "lambert"

            [animation]
            pause_affects_light = true
            "#,
        )
        .unwrap();

        assert_eq!(config.sample.kind, SampleKind::Lambert);
        assert!(config.animation.pause_affects_light);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.assets.model, PathBuf::from("assets/models/model.obj"));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("dx_learning_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.sample.kind = SampleKind::Dx12Triangle;
        config.window.width = Some(640);

        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.sample.kind, SampleKind::Dx12Triangle);
        assert_eq!(loaded.window.width, Some(640));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::from_file_or_default("definitely/not/here.toml");
        assert_eq!(config.sample.kind, SampleKind::Pbr);
        assert!(Config::from_file("definitely/not/here.toml").is_err());
        assert!(Config::from_optional_file("definitely/not/here.toml").unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_reported_then_defaulted() {
        let path = std::env::temp_dir().join(format!("dx_learning_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "[sample\nkind = ").unwrap();

        let optional = Config::from_optional_file(&path);
        let fallback = Config::from_file_or_default(&path);
        std::fs::remove_file(&path).ok();

        match optional {
            Err(DemoError::Config { reason, .. }) => assert!(reason.starts_with("invalid TOML")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(fallback.sample.kind, SampleKind::Pbr);
    }
}
