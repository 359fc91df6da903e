//! 图形后端模块
//!
//! 本模块封装 Direct3D 的底层实现：
//! - `shaders`：内嵌的 HLSL 源码（与平台无关）
//! - `dx12`：Direct3D 12 后端，实现 `renderer` 中的 `FrameBackend` 与 `GpuTimeline`
//! - `dx11`：Direct3D 11 三角形示例（立即上下文，没有 Fence）
//!
//! 除 `shaders` 外都只在 Windows 上编译。

pub mod shaders;

#[cfg(target_os = "windows")]
pub mod compiler;
#[cfg(target_os = "windows")]
pub mod dx11;
#[cfg(target_os = "windows")]
pub mod dx12;

#[cfg(target_os = "windows")]
pub use dx11::Dx11Renderer;
#[cfg(target_os = "windows")]
pub use dx12::Dx12Renderer;

/// 从 winit 窗口取得 Win32 HWND
#[cfg(target_os = "windows")]
pub(crate) fn win32_hwnd(window: &winit::window::Window) -> crate::core::error::Result<windows::Win32::Foundation::HWND> {
    use crate::core::error::DemoError;
    use raw_window_handle::HasWindowHandle;

    let handle = window
        .window_handle()
        .map_err(|e| DemoError::Initialization(format!("Failed to get window handle: {}", e)))?;
    hwnd_from_raw(handle.as_raw())
}

#[cfg(target_os = "windows")]
fn hwnd_from_raw(
    raw: raw_window_handle::RawWindowHandle,
) -> crate::core::error::Result<windows::Win32::Foundation::HWND> {
    use crate::core::error::DemoError;
    use raw_window_handle::RawWindowHandle;

    match raw {
        RawWindowHandle::Win32(win32) => Ok(windows::Win32::Foundation::HWND(
            win32.hwnd.get() as *mut std::ffi::c_void,
        )),
        _ => Err(DemoError::Initialization(
            "Expected Win32 window handle on Windows platform".to_string(),
        )),
    }
}

#[cfg(all(test, target_os = "windows"))]
mod tests {
    use std::num::NonZeroIsize;

    use raw_window_handle::{RawWindowHandle, Win32WindowHandle, WebWindowHandle};

    use super::*;
    use crate::core::error::DemoError;

    #[test]
    fn test_hwnd_from_win32_handle() {
        let raw = RawWindowHandle::Win32(Win32WindowHandle::new(NonZeroIsize::new(0x1234).unwrap()));
        let hwnd = hwnd_from_raw(raw).unwrap();
        assert_eq!(hwnd.0 as isize, 0x1234);
    }

    #[test]
    fn test_non_win32_handle_is_rejected() {
        let raw = RawWindowHandle::Web(WebWindowHandle::new(1));
        assert!(matches!(hwnd_from_raw(raw), Err(DemoError::Initialization(_))));
    }
}
