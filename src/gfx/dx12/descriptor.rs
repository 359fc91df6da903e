//! DX12 描述符堆
//!
//! 示例只用到两种 CPU 可见的堆：交换链缓冲区的 RTV 堆和深度缓冲的 DSV 堆。
//! 常量缓冲区通过根 CBV 直接绑定 GPU 地址，不需要 CBV 堆。

use windows::Win32::Graphics::Direct3D12::*;

use crate::core::error::{DemoError, Result};

/// 描述符堆类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    RenderTarget,
    DepthStencil,
}

impl HeapKind {
    fn heap_type(self) -> D3D12_DESCRIPTOR_HEAP_TYPE {
        match self {
            HeapKind::RenderTarget => D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
            HeapKind::DepthStencil => D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeapKind::RenderTarget => "RTV",
            HeapKind::DepthStencil => "DSV",
        }
    }
}

/// CPU 可见的描述符堆
pub struct Dx12DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    kind: HeapKind,
    increment_size: usize,
    cpu_start: usize,
    num_descriptors: u32,
}

impl Dx12DescriptorHeap {
    pub fn new(device: &ID3D12Device, kind: HeapKind, num_descriptors: u32) -> Result<Self> {
        unsafe {
            let heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
                Type: kind.heap_type(),
                NumDescriptors: num_descriptors,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            };

            let heap: ID3D12DescriptorHeap = device.CreateDescriptorHeap(&heap_desc).map_err(|e| {
                DemoError::ResourceCreation(format!(
                    "Failed to create {} descriptor heap: {:?}",
                    kind.name(),
                    e
                ))
            })?;

            let increment_size = device.GetDescriptorHandleIncrementSize(kind.heap_type()) as usize;
            let cpu_start = heap.GetCPUDescriptorHandleForHeapStart().ptr;

            Ok(Self {
                heap,
                kind,
                increment_size,
                cpu_start,
                num_descriptors,
            })
        }
    }

    pub fn heap(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn num_descriptors(&self) -> u32 {
        self.num_descriptors
    }

    /// 第 `index` 个描述符的 CPU 句柄
    pub fn cpu_handle(&self, index: usize) -> Result<D3D12_CPU_DESCRIPTOR_HANDLE> {
        if index >= self.num_descriptors as usize {
            return Err(DemoError::ResourceCreation(format!(
                "{} descriptor index {} out of range ({})",
                self.kind.name(),
                index,
                self.num_descriptors
            )));
        }
        Ok(D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.cpu_start + index * self.increment_size,
        })
    }
}
