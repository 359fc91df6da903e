//! DX12 Fence 时间线
//!
//! 把 `ID3D12Fence` 与一个 Win32 事件包装成 [`GpuTimeline`]。所有等待都是
//! 无限等待；等待失败视为致命错误向上传递。

use tracing::{trace, warn};
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::{CreateEventA, WaitForSingleObject, INFINITE};

use crate::core::error::{DemoError, Result};
use crate::renderer::{FenceValue, GpuTimeline};

pub struct Dx12Timeline {
    queue: ID3D12CommandQueue,
    fence: ID3D12Fence,
    event: HANDLE,
}

impl Dx12Timeline {
    pub fn new(device: &ID3D12Device, queue: &ID3D12CommandQueue) -> Result<Self> {
        unsafe {
            let fence: ID3D12Fence = device
                .CreateFence(0, D3D12_FENCE_FLAG_NONE)
                .map_err(|e| DemoError::Synchronization(format!("Failed to create fence: {:?}", e)))?;

            let event = CreateEventA(None, false, false, None)
                .map_err(|e| DemoError::Synchronization(format!("Failed to create fence event: {:?}", e)))?;

            Ok(Self {
                queue: queue.clone(),
                fence,
                event,
            })
        }
    }
}

impl GpuTimeline for Dx12Timeline {
    fn signal(&mut self, value: FenceValue) -> Result<()> {
        unsafe { self.queue.Signal(&self.fence, value.value()) }
            .map_err(|e| DemoError::Synchronization(format!("Failed to signal fence: {:?}", e)))
    }

    fn completed_value(&self) -> FenceValue {
        FenceValue::new(unsafe { self.fence.GetCompletedValue() })
    }

    fn wait_until(&mut self, value: FenceValue) -> Result<()> {
        unsafe {
            if self.fence.GetCompletedValue() >= value.value() {
                return Ok(());
            }

            self.fence
                .SetEventOnCompletion(value.value(), self.event)
                .map_err(|e| DemoError::Synchronization(format!("Failed to set fence event: {:?}", e)))?;

            trace!(fence_value = value.value(), "Waiting on fence event");
            if WaitForSingleObject(self.event, INFINITE) != WAIT_OBJECT_0 {
                return Err(DemoError::Synchronization(format!(
                    "WaitForSingleObject failed while waiting for fence {}",
                    value.value()
                )));
            }
        }
        Ok(())
    }
}

/// 关闭事件句柄，失败只记录日志
fn close_event(event: HANDLE) -> bool {
    match unsafe { CloseHandle(event) } {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to close fence event: {:?}", e);
            false
        }
    }
}

impl Drop for Dx12Timeline {
    fn drop(&mut self) {
        close_event(self.event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_event_reports_failure() {
        let event = unsafe { CreateEventA(None, false, false, None) }.unwrap();
        assert!(close_event(event));
        assert!(!close_event(HANDLE::default()));
    }
}
