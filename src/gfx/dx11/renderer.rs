//! D3D11 彩色三角形渲染器

use tracing::{debug, info};
use windows::core::s;
use windows::Win32::Foundation::{HMODULE, HWND};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::core::config::GraphicsConfig;
use crate::core::error::{DemoError, Result};
use crate::geometry::{primitives, Dx11Vertex};
use crate::gfx::compiler::{blob_bytes, compile_hlsl};
use crate::gfx::shaders;

pub const DX11_TITLE: &str = "DX11 Hello World";
pub const DX11_CLEAR_COLOR: [f32; 4] = [0.0, 0.2, 0.4, 1.0];

pub struct Dx11Renderer {
    input_layout: ID3D11InputLayout,
    vertex_shader: ID3D11VertexShader,
    pixel_shader: ID3D11PixelShader,
    vertex_buffer: Option<ID3D11Buffer>,
    render_target: ID3D11RenderTargetView,
    context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain,
    _device: ID3D11Device,
    viewport: D3D11_VIEWPORT,
    vsync: bool,
}

impl Dx11Renderer {
    pub fn new(hwnd: HWND, width: u32, height: u32, graphics: &GraphicsConfig) -> Result<Self> {
        unsafe {
            let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
                BufferDesc: DXGI_MODE_DESC {
                    Width: width,
                    Height: height,
                    Format: DXGI_FORMAT_R8G8B8A8_UNORM,
                    ..Default::default()
                },
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: 1,
                OutputWindow: hwnd,
                Windowed: true.into(),
                SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
                ..Default::default()
            };

            let (driver_type, flags) = driver_settings(graphics);

            let mut swap_chain: Option<IDXGISwapChain> = None;
            let mut device: Option<ID3D11Device> = None;
            let mut context: Option<ID3D11DeviceContext> = None;
            D3D11CreateDeviceAndSwapChain(
                None,
                driver_type,
                HMODULE::default(),
                flags,
                None,
                D3D11_SDK_VERSION,
                Some(&swap_chain_desc),
                Some(&mut swap_chain),
                Some(&mut device),
                None,
                Some(&mut context),
            )
            .map_err(|e| DemoError::Device(format!("D3D11CreateDeviceAndSwapChain failed: {:?}", e)))?;

            let swap_chain = swap_chain.ok_or_else(|| DemoError::Device("Swap chain is null".to_string()))?;
            let device = device.ok_or_else(|| DemoError::Device("D3D11 device is null".to_string()))?;
            let context = context.ok_or_else(|| DemoError::Device("Immediate context is null".to_string()))?;
            info!(width, height, "D3D11 device and swap chain created");

            let back_buffer: ID3D11Texture2D = swap_chain
                .GetBuffer(0)
                .map_err(|e| DemoError::Device(format!("Failed to get back buffer: {:?}", e)))?;
            let mut render_target = None;
            device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut render_target))
                .map_err(|e| DemoError::ResourceCreation(format!("Failed to create render target view: {:?}", e)))?;
            let render_target =
                render_target.ok_or_else(|| DemoError::ResourceCreation("Render target view is null".to_string()))?;

            let vertices = primitives::hello_triangle_dx11();
            let buffer_desc = D3D11_BUFFER_DESC {
                ByteWidth: std::mem::size_of_val(&vertices) as u32,
                Usage: D3D11_USAGE_IMMUTABLE,
                BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
                CPUAccessFlags: 0,
                ..Default::default()
            };
            let initial_data = D3D11_SUBRESOURCE_DATA {
                pSysMem: vertices.as_ptr() as *const _,
                ..Default::default()
            };
            let mut vertex_buffer = None;
            device
                .CreateBuffer(&buffer_desc, Some(&initial_data), Some(&mut vertex_buffer))
                .map_err(|e| DemoError::ResourceCreation(format!("Failed to create vertex buffer: {:?}", e)))?;

            let vs_blob = compile_hlsl("triangle.hlsl", shaders::DX11_TRIANGLE, "main", "vs_4_0", &[("VERTEX_SHADER", "1")])?;
            let ps_blob = compile_hlsl("triangle.hlsl", shaders::DX11_TRIANGLE, "main", "ps_4_0", &[])?;

            let mut vertex_shader = None;
            device
                .CreateVertexShader(blob_bytes(&vs_blob), None, Some(&mut vertex_shader))
                .map_err(|e| DemoError::ShaderCompilation(format!("Failed to create vertex shader: {:?}", e)))?;
            let mut pixel_shader = None;
            device
                .CreatePixelShader(blob_bytes(&ps_blob), None, Some(&mut pixel_shader))
                .map_err(|e| DemoError::ShaderCompilation(format!("Failed to create pixel shader: {:?}", e)))?;

            let input_elements = [
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("POSITION"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32B32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 0,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("COLOR"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32B32A32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 12,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
            ];
            let mut input_layout = None;
            device
                .CreateInputLayout(&input_elements, blob_bytes(&vs_blob), Some(&mut input_layout))
                .map_err(|e| DemoError::ResourceCreation(format!("Failed to create input layout: {:?}", e)))?;

            let viewport = D3D11_VIEWPORT {
                TopLeftX: 0.0,
                TopLeftY: 0.0,
                Width: width as f32,
                Height: height as f32,
                MinDepth: 0.0,
                MaxDepth: 1.0,
            };

            debug!("D3D11 triangle pipeline ready");

            Ok(Self {
                input_layout: input_layout
                    .ok_or_else(|| DemoError::ResourceCreation("Input layout is null".to_string()))?,
                vertex_shader: vertex_shader
                    .ok_or_else(|| DemoError::ShaderCompilation("Vertex shader is null".to_string()))?,
                pixel_shader: pixel_shader
                    .ok_or_else(|| DemoError::ShaderCompilation("Pixel shader is null".to_string()))?,
                vertex_buffer,
                render_target,
                context,
                swap_chain,
                _device: device,
                viewport,
                vsync: graphics.vsync,
            })
        }
    }

    pub fn title(&self) -> String {
        DX11_TITLE.to_string()
    }

    /// 清屏、绘制三角形并呈现
    pub fn render(&mut self) -> Result<()> {
        let stride = std::mem::size_of::<Dx11Vertex>() as u32;
        let offset = 0u32;

        unsafe {
            self.context
                .OMSetRenderTargets(Some(&[Some(self.render_target.clone())]), None);
            self.context.RSSetViewports(Some(&[self.viewport]));
            self.context.ClearRenderTargetView(&self.render_target, &DX11_CLEAR_COLOR);

            self.context.IASetInputLayout(&self.input_layout);
            self.context.IASetVertexBuffers(
                0,
                1,
                Some(&self.vertex_buffer),
                Some(&stride),
                Some(&offset),
            );
            self.context.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            self.context.VSSetShader(&self.vertex_shader, None);
            self.context.PSSetShader(&self.pixel_shader, None);
            self.context.Draw(3, 0);

            self.swap_chain
                .Present(u32::from(self.vsync), DXGI_PRESENT(0))
                .ok()
                .map_err(|e| DemoError::Device(format!("Present failed: {:?}", e)))?;
        }
        Ok(())
    }

    /// 立即上下文没有挂起的 GPU 工作需要等待，清空状态后释放
    pub fn shutdown(self) -> Result<()> {
        unsafe {
            self.context.ClearState();
            self.context.Flush();
        }
        info!("D3D11 renderer released");
        Ok(())
    }
}

fn driver_settings(graphics: &GraphicsConfig) -> (D3D_DRIVER_TYPE, D3D11_CREATE_DEVICE_FLAG) {
    let driver_type = if graphics.use_warp {
        D3D_DRIVER_TYPE_WARP
    } else {
        D3D_DRIVER_TYPE_HARDWARE
    };
    let flags = if graphics.debug_layer {
        D3D11_CREATE_DEVICE_DEBUG
    } else {
        D3D11_CREATE_DEVICE_FLAG(0)
    };
    (driver_type, flags)
}
