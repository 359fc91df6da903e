//! DirectX 12 设备上下文
//!
//! # 初始化流程
//!
//! 1. 启用调试层（配置项 `graphics.debug_layer`）
//! 2. 创建 DXGI 工厂并选择硬件适配器（或 WARP）
//! 3. 创建 D3D12 设备与直接命令队列
//! 4. 创建翻转丢弃交换链，禁用 Alt+Enter
//! 5. 创建 RTV 堆与每个交换链缓冲区的 RTV
//! 6. 按需创建 D32 深度缓冲与 DSV 堆
//! 7. 为每个帧槽位创建命令分配器

use tracing::{debug, info, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use super::descriptor::{Dx12DescriptorHeap, HeapKind};
use crate::core::config::GraphicsConfig;
use crate::core::error::{DemoError, Result};
use crate::renderer::{FrameSlots, SlotIndex, FRAME_COUNT};

pub const BACK_BUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;
pub const DEPTH_FORMAT: DXGI_FORMAT = DXGI_FORMAT_D32_FLOAT;

/// 深度缓冲及其 DSV
pub struct DepthTarget {
    pub buffer: ID3D12Resource,
    pub heap: Dx12DescriptorHeap,
}

/// DirectX 12 设备上下文
///
/// 持有设备、队列、交换链和按槽位划分的对象。不持有 Fence，
/// Fence 由 [`super::Dx12Timeline`] 单独管理。
pub struct Dx12Context {
    pub device: ID3D12Device,
    pub command_queue: ID3D12CommandQueue,
    pub swap_chain: IDXGISwapChain3,
    pub rtv_heap: Dx12DescriptorHeap,
    pub render_targets: FrameSlots<ID3D12Resource>,
    pub depth: Option<DepthTarget>,
    pub command_allocators: FrameSlots<ID3D12CommandAllocator>,
    pub viewport: D3D12_VIEWPORT,
    pub scissor_rect: RECT,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Dx12Context {
    pub fn new(hwnd: HWND, width: u32, height: u32, graphics: &GraphicsConfig, with_depth: bool) -> Result<Self> {
        unsafe {
            if graphics.debug_layer {
                enable_debug_layer();
            }

            let factory_flags = if graphics.debug_layer {
                DXGI_CREATE_FACTORY_DEBUG
            } else {
                DXGI_CREATE_FACTORY_FLAGS(0)
            };
            let factory: IDXGIFactory4 = CreateDXGIFactory2(factory_flags)
                .map_err(|e| DemoError::Device(format!("Failed to create DXGI factory: {:?}", e)))?;

            let device = create_device(&factory, graphics.use_warp)?;

            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                ..Default::default()
            };
            let command_queue: ID3D12CommandQueue = device
                .CreateCommandQueue(&queue_desc)
                .map_err(|e| DemoError::Device(format!("Failed to create command queue: {:?}", e)))?;

            let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: BACK_BUFFER_FORMAT,
                SampleDesc: DXGI_SAMPLE_DESC {
                    Count: 1,
                    ..Default::default()
                },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: FRAME_COUNT as u32,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
                ..Default::default()
            };
            let swap_chain: IDXGISwapChain1 = factory
                .CreateSwapChainForHwnd(&command_queue, hwnd, &swap_chain_desc, None, None)
                .map_err(|e| DemoError::Device(format!("Failed to create swap chain: {:?}", e)))?;
            let swap_chain: IDXGISwapChain3 = swap_chain
                .cast()
                .map_err(|e| DemoError::Device(format!("IDXGISwapChain3 unavailable: {:?}", e)))?;

            if let Err(e) = factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER) {
                warn!("Failed to disable Alt+Enter: {:?}", e);
            }

            info!(width, height, buffers = FRAME_COUNT, "Swap chain created");

            let rtv_heap = Dx12DescriptorHeap::new(&device, HeapKind::RenderTarget, FRAME_COUNT as u32)?;
            let render_targets = FrameSlots::try_from_fn(|slot: SlotIndex| {
                let surface: ID3D12Resource = swap_chain.GetBuffer(slot.get() as u32).map_err(|e| {
                    DemoError::Device(format!("Failed to get swap chain buffer {}: {:?}", slot.get(), e))
                })?;
                device.CreateRenderTargetView(&surface, None, rtv_heap.cpu_handle(slot.get())?);
                Ok(surface)
            })?;

            let depth = if with_depth {
                Some(create_depth_target(&device, width, height)?)
            } else {
                None
            };

            let command_allocators = FrameSlots::try_from_fn(|slot: SlotIndex| {
                device
                    .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                    .map_err(|e| {
                        DemoError::ResourceCreation(format!(
                            "Failed to create command allocator {}: {:?}",
                            slot.get(),
                            e
                        ))
                    })
            })?;
            debug!(frame_count = FRAME_COUNT, "Command allocators created");

            let viewport = D3D12_VIEWPORT {
                TopLeftX: 0.0,
                TopLeftY: 0.0,
                Width: width as f32,
                Height: height as f32,
                MinDepth: 0.0,
                MaxDepth: 1.0,
            };
            let scissor_rect = RECT {
                left: 0,
                top: 0,
                right: width as i32,
                bottom: height as i32,
            };

            info!(depth = with_depth, warp = graphics.use_warp, "DX12 context initialized");

            Ok(Self {
                device,
                command_queue,
                swap_chain,
                rtv_heap,
                render_targets,
                depth,
                command_allocators,
                viewport,
                scissor_rect,
                width,
                height,
                vsync: graphics.vsync,
            })
        }
    }

    /// 交换链当前后台缓冲区的槽位
    pub fn current_slot(&self) -> Result<SlotIndex> {
        SlotIndex::from_back_buffer(unsafe { self.swap_chain.GetCurrentBackBufferIndex() })
    }

    pub fn rtv_handle(&self, slot: SlotIndex) -> Result<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.rtv_heap.cpu_handle(slot.get())
    }

    pub fn dsv_handle(&self) -> Result<D3D12_CPU_DESCRIPTOR_HANDLE> {
        match &self.depth {
            Some(depth) => depth.heap.cpu_handle(0),
            None => Err(DemoError::CommandExecution("Scene has no depth buffer".to_string())),
        }
    }
}

unsafe fn enable_debug_layer() {
    let mut debug: Option<ID3D12Debug> = None;
    match D3D12GetDebugInterface(&mut debug) {
        Ok(()) => {
            if let Some(debug) = debug {
                debug.EnableDebugLayer();
                debug!("DX12 Debug Layer enabled");
            }
        }
        Err(e) => warn!("Failed to enable DX12 Debug Layer: {:?}", e),
    }
}

/// 在第一个可用的硬件适配器上创建设备，`use_warp` 时使用 WARP
unsafe fn create_device(factory: &IDXGIFactory4, use_warp: bool) -> Result<ID3D12Device> {
    if use_warp {
        let adapter: IDXGIAdapter = factory
            .EnumWarpAdapter()
            .map_err(|e| DemoError::Device(format!("Failed to get WARP adapter: {:?}", e)))?;
        let mut device: Option<ID3D12Device> = None;
        D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device)
            .map_err(|e| DemoError::Device(format!("Failed to create WARP device: {:?}", e)))?;
        info!("Using WARP adapter");
        return device.ok_or_else(|| DemoError::Device("WARP device is null".to_string()));
    }

    let mut index = 0;
    while let Ok(adapter) = factory.EnumAdapters1(index) {
        index += 1;

        let Ok(desc) = adapter.GetDesc1() else {
            continue;
        };
        if (desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0 {
            continue;
        }

        let mut device: Option<ID3D12Device> = None;
        if D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device).is_ok() {
            if let Some(device) = device {
                let name = String::from_utf16_lossy(&desc.Description);
                info!(adapter = name.trim_end_matches('\0'), "D3D12 device created");
                return Ok(device);
            }
        }
    }

    Err(DemoError::Device("No hardware adapter supports Direct3D 12".to_string()))
}

unsafe fn create_depth_target(device: &ID3D12Device, width: u32, height: u32) -> Result<DepthTarget> {
    let heap = Dx12DescriptorHeap::new(device, HeapKind::DepthStencil, 1)?;

    let depth_heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_DEFAULT,
        ..Default::default()
    };
    let depth_resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Width: width as u64,
        Height: height,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DEPTH_FORMAT,
        SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
        Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
        Flags: D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        ..Default::default()
    };
    let clear_value = D3D12_CLEAR_VALUE {
        Format: DEPTH_FORMAT,
        Anonymous: D3D12_CLEAR_VALUE_0 {
            DepthStencil: D3D12_DEPTH_STENCIL_VALUE {
                Depth: 1.0,
                Stencil: 0,
            },
        },
    };

    let mut buffer: Option<ID3D12Resource> = None;
    device
        .CreateCommittedResource(
            &depth_heap_props,
            D3D12_HEAP_FLAG_NONE,
            &depth_resource_desc,
            D3D12_RESOURCE_STATE_DEPTH_WRITE,
            Some(&clear_value),
            &mut buffer,
        )
        .map_err(|e| DemoError::ResourceCreation(format!("Failed to create depth buffer: {:?}", e)))?;
    let buffer = buffer.ok_or_else(|| DemoError::ResourceCreation("Depth buffer is null".to_string()))?;

    device.CreateDepthStencilView(&buffer, None, heap.cpu_handle(0)?);
    debug!(width, height, "Depth buffer created");

    Ok(DepthTarget { buffer, heap })
}
