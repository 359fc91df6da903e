//! 程序入口编排
//!
//! 每次运行只有一个上下文：读取配置、初始化日志、创建窗口、为选定的示例
//! 构建渲染器，然后进入 winit 事件循环。空闲时渲染，按键被映射为
//! [`SceneCommand`] 交给场景处理，关闭窗口时先排空 GPU 再退出。
//!
//! ```text
//! config.toml + 命令行 ─→ Config ─→ init_logger
//!                                  │
//!                      EventLoop + Window ─→ SampleRenderer
//!                                  │
//!        AboutToWait → RedrawRequested → render(now)
//!        KeyboardInput → map_key_event → apply → set_title
//!        CloseRequested → shutdown(排空) → exit
//! ```

use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::core::config::{Config, SampleKind};
use crate::core::error::{DemoError, Result};
use crate::core::input::SceneCommand;
use crate::core::log;

/// 默认配置文件
pub const CONFIG_FILE: &str = "config.toml";

/// 事件循环驱动的示例渲染器
pub trait SampleRenderer {
    /// 当前窗口标题
    fn title(&self) -> String;

    /// 处理按键命令，返回标题是否需要刷新
    fn apply(&mut self, command: SceneCommand) -> bool;

    /// 渲染一帧，`now` 为程序启动以来的时间
    fn render(&mut self, now: Duration) -> Result<()>;

    /// 排空 GPU 后释放资源
    fn shutdown(self) -> Result<()>
    where
        Self: Sized;
}

/// 组合配置文件、命令行参数与二进制固定的示例类型
pub fn resolve_config<I>(base: Config, args: I, pinned: Option<SampleKind>) -> Result<Config>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut config = base;
    config.apply_args(args);
    if let Some(kind) = pinned {
        config.sample.kind = kind;
    }
    config.validate()?;
    Ok(config)
}

/// 按配置初始化日志
pub fn init_logging(config: &Config) -> Result<()> {
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file)
}

/// 二进制入口
///
/// `pinned` 为 `None` 时示例类型来自配置文件或 `--sample`。
/// 致命错误记录到日志，在 Windows 上额外弹出消息框。
pub fn launch(pinned: Option<SampleKind>) -> anyhow::Result<()> {
    // 日志在读取配置之后才初始化，配置文件的问题先记下来
    let (base, config_problem) = match Config::from_optional_file(CONFIG_FILE) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = resolve_config(base, std::env::args().skip(1), pinned).context("Invalid configuration")?;

    init_logging(&config).context("Failed to initialize logging")?;
    if let Some(problem) = config_problem {
        warn!("Ignoring {}, using defaults: {}", CONFIG_FILE, problem);
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        sample = config.sample.kind.name(),
        api = graphics_api(config.sample.kind),
        "dx_learning starting"
    );

    run(&config)
        .map_err(|e| {
            error!(stage = e.stage(), during_frame = e.is_frame_failure(), "Fatal error: {}", e);
            report_fatal(&e.to_string());
            e
        })
        .with_context(|| format!("{} failed", config.sample.kind.name()))
}

/// 示例使用的图形 API
pub fn graphics_api(kind: SampleKind) -> &'static str {
    if kind.is_dx12() {
        "Direct3D 12"
    } else {
        "Direct3D 11"
    }
}

/// 运行选定的示例直到窗口关闭
#[cfg(not(target_os = "windows"))]
pub fn run(config: &Config) -> Result<()> {
    info!(sample = config.sample.kind.name(), "Sample requested on a non-Windows platform");
    Err(DemoError::Initialization(
        "DirectX samples are only available on Windows".to_string(),
    ))
}

/// 运行选定的示例直到窗口关闭
#[cfg(target_os = "windows")]
pub fn run(config: &Config) -> Result<()> {
    platform::run(config)
}

/// 显示致命错误
#[cfg(target_os = "windows")]
pub fn report_fatal(message: &str) {
    use std::ffi::CString;
    use windows::core::{s, PCSTR};
    use windows::Win32::UI::WindowsAndMessaging::{MessageBoxA, MB_ICONERROR, MB_OK};

    let text = CString::new(message.replace('\0', " ")).unwrap_or_default();
    unsafe {
        MessageBoxA(None, PCSTR(text.as_ptr() as *const u8), s!("Fatal Error"), MB_OK | MB_ICONERROR);
    }
}

/// 显示致命错误（非 Windows 平台只有日志和标准错误输出）
#[cfg(not(target_os = "windows"))]
pub fn report_fatal(_message: &str) {}

#[cfg(target_os = "windows")]
mod platform {
    use std::time::Duration;

    use tracing::{debug, error, info};
    use winit::dpi::PhysicalSize;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};
    use winit::window::{Window, WindowBuilder};

    use super::SampleRenderer;
    use crate::core::clock::{Clock, SystemClock};
    use crate::core::config::{Config, SampleKind};
    use crate::core::error::{DemoError, Result};
    use crate::core::input::{map_key_event, SceneCommand};
    use crate::gfx::{win32_hwnd, Dx11Renderer, Dx12Renderer};
    use crate::scene::{FrameScene, LambertScene, PbrScene, TriangleScene};

    impl SampleRenderer for Dx11Renderer {
        fn title(&self) -> String {
            Dx11Renderer::title(self)
        }

        fn apply(&mut self, _command: SceneCommand) -> bool {
            false
        }

        fn render(&mut self, _now: Duration) -> Result<()> {
            Dx11Renderer::render(self)
        }

        fn shutdown(self) -> Result<()> {
            Dx11Renderer::shutdown(self)
        }
    }

    impl<S: FrameScene> SampleRenderer for Dx12Renderer<S> {
        fn title(&self) -> String {
            Dx12Renderer::title(self)
        }

        fn apply(&mut self, command: SceneCommand) -> bool {
            Dx12Renderer::apply(self, command)
        }

        fn render(&mut self, now: Duration) -> Result<()> {
            Dx12Renderer::render(self, now)
        }

        fn shutdown(self) -> Result<()> {
            Dx12Renderer::shutdown(self)
        }
    }

    pub(super) fn run(config: &Config) -> Result<()> {
        let kind = config.sample.kind;
        let (width, height) = config.window_size();

        let event_loop = EventLoop::new()
            .map_err(|e| DemoError::Initialization(format!("Failed to create event loop: {}", e)))?;
        let window = WindowBuilder::new()
            .with_title(kind.name())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(|e| DemoError::Initialization(format!("Failed to create window: {}", e)))?;
        let hwnd = win32_hwnd(&window)?;
        info!(sample = kind.name(), width, height, "Window created");

        match kind {
            SampleKind::Dx11Triangle => {
                let renderer = Dx11Renderer::new(hwnd, width, height, &config.graphics)?;
                drive(event_loop, window, renderer, config)
            }
            SampleKind::Dx12Triangle => {
                let renderer = Dx12Renderer::new(hwnd, width, height, config, TriangleScene::new())?;
                drive(event_loop, window, renderer, config)
            }
            SampleKind::Lambert => {
                let renderer = Dx12Renderer::new(hwnd, width, height, config, LambertScene::new(width, height))?;
                drive(event_loop, window, renderer, config)
            }
            SampleKind::Pbr => {
                let renderer = Dx12Renderer::new(hwnd, width, height, config, PbrScene::new(config))?;
                drive(event_loop, window, renderer, config)
            }
        }
    }

    fn drive<R: SampleRenderer>(event_loop: EventLoop<()>, window: Window, renderer: R, config: &Config) -> Result<()> {
        window.set_title(&config.window.title.clone().unwrap_or_else(|| renderer.title()));

        let clock = SystemClock::new();
        let mut renderer = Some(renderer);
        let mut failure: Option<DemoError> = None;

        event_loop.set_control_flow(ControlFlow::Poll);
        info!("Entering main loop");

        event_loop
            .run(|event, target| match event {
                Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                    WindowEvent::CloseRequested => {
                        info!("Close requested, shutting down");
                        if let Some(renderer) = renderer.take() {
                            if let Err(e) = renderer.shutdown() {
                                failure = Some(e);
                            }
                        }
                        target.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let (Some(command), Some(renderer)) = (map_key_event(&event), renderer.as_mut()) {
                            debug!(?command, "Key command");
                            if renderer.apply(command) {
                                window.set_title(&renderer.title());
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(active) = renderer.as_mut() {
                            if let Err(e) = active.render(clock.now()) {
                                error!(stage = e.stage(), "Render failed: {}", e);
                                failure = Some(e);
                                // 丢弃渲染器时帧循环仍会排空 GPU
                                renderer = None;
                                target.exit();
                            }
                        }
                    }
                    _ => (),
                },
                Event::AboutToWait => {
                    if renderer.is_some() {
                        window.request_redraw();
                    }
                }
                Event::LoopExiting => {
                    if let Some(renderer) = renderer.take() {
                        if let Err(e) = renderer.shutdown() {
                            failure.get_or_insert(e);
                        }
                    }
                }
                _ => (),
            })
            .map_err(|e| DemoError::Initialization(format!("Event loop error: {}", e)))?;

        match failure {
            Some(e) => Err(e),
            None => {
                info!("Shutdown complete");
                Ok(())
            }
        }
    }
}
