//! DirectX 12 渲染器
//!
//! [`Dx12Backend`] 实现 [`FrameBackend`]：把场景记录的 [`CommandStream`]
//! 翻译为命令列表调用。[`Dx12Renderer`] 把后端、Fence 时间线和场景组合成
//! 一个可由窗口循环驱动的对象。

use std::mem::ManuallyDrop;
use std::time::Duration;

use tracing::{info, trace};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::DXGI_PRESENT;

use super::buffer::{GpuMesh, UniformBuffer};
use super::context::Dx12Context;
use super::fence::Dx12Timeline;
use super::pipeline::Dx12Pipeline;
use crate::core::config::Config;
use crate::core::error::{DemoError, Result};
use crate::core::input::SceneCommand;
use crate::renderer::{
    CommandStream, FrameBackend, FrameLoop, RecordedCommand, ResourceId, ResourceState, SlotIndex, SlotLease,
};
use crate::scene::FrameScene;

fn d3d12_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
        ResourceState::DepthWrite => D3D12_RESOURCE_STATE_DEPTH_WRITE,
        ResourceState::GenericRead => D3D12_RESOURCE_STATE_GENERIC_READ,
    }
}

/// 状态转换屏障（不增加资源引用计数）
fn transition_barrier(
    resource: &ID3D12Resource,
    before: D3D12_RESOURCE_STATES,
    after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: before,
                StateAfter: after,
            }),
        },
    }
}

/// D3D12 帧后端
pub struct Dx12Backend<C: Copy> {
    uniforms: Option<UniformBuffer<C>>,
    meshes: Vec<GpuMesh>,
    command_list: ID3D12GraphicsCommandList,
    pipeline: Dx12Pipeline,
    context: Dx12Context,
}

impl<C: Copy> Dx12Backend<C> {
    pub fn new<S>(hwnd: HWND, width: u32, height: u32, config: &Config, scene: &S) -> Result<Self>
    where
        S: FrameScene<Constants = C>,
    {
        let desc = scene.pipeline();
        let context = Dx12Context::new(hwnd, width, height, &config.graphics, desc.depth)?;
        let pipeline = Dx12Pipeline::new(&context.device, &desc)?;

        let meshes = scene
            .meshes()
            .iter()
            .map(|mesh| GpuMesh::upload(&context.device, mesh))
            .collect::<Result<Vec<_>>>()?;

        let uniforms = if desc.constants {
            Some(UniformBuffer::new(&context.device)?)
        } else {
            None
        };

        let command_list: ID3D12GraphicsCommandList = unsafe {
            let allocator = &context.command_allocators[SlotIndex::FIRST];
            let list: ID3D12GraphicsCommandList = context
                .device
                .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, allocator, Some(&pipeline.pso))
                .map_err(|e| DemoError::ResourceCreation(format!("Failed to create command list: {:?}", e)))?;
            list.Close()
                .map_err(|e| DemoError::CommandExecution(format!("Failed to close initial command list: {:?}", e)))?;
            list
        };

        info!(meshes = meshes.len(), constants = desc.constants, "DX12 backend ready");

        Ok(Self {
            uniforms,
            meshes,
            command_list,
            pipeline,
            context,
        })
    }

    pub fn context(&self) -> &Dx12Context {
        &self.context
    }

    fn resource(&self, id: ResourceId, slot: SlotIndex) -> Result<&ID3D12Resource> {
        match id {
            ResourceId::BackBuffer => Ok(&self.context.render_targets[slot]),
            ResourceId::DepthBuffer => self
                .context
                .depth
                .as_ref()
                .map(|depth| &depth.buffer)
                .ok_or_else(|| DemoError::CommandExecution("Scene has no depth buffer".to_string())),
        }
    }

    unsafe fn encode_command(&self, slot: SlotIndex, command: &RecordedCommand) -> Result<()> {
        let list = &self.command_list;
        match command {
            RecordedCommand::Transition { resource, before, after } => {
                let barrier = transition_barrier(self.resource(*resource, slot)?, d3d12_state(*before), d3d12_state(*after));
                list.ResourceBarrier(&[barrier]);
            }
            RecordedCommand::SetRenderTarget { with_depth } => {
                let rtv = self.context.rtv_handle(slot)?;
                if *with_depth {
                    let dsv = self.context.dsv_handle()?;
                    list.OMSetRenderTargets(1, Some(&rtv), false, Some(&dsv));
                } else {
                    list.OMSetRenderTargets(1, Some(&rtv), false, None);
                }
                list.RSSetViewports(&[self.context.viewport]);
                list.RSSetScissorRects(&[self.context.scissor_rect]);
            }
            RecordedCommand::ClearColor(color) => {
                list.ClearRenderTargetView(self.context.rtv_handle(slot)?, color, None);
            }
            RecordedCommand::ClearDepth(depth) => {
                list.ClearDepthStencilView(self.context.dsv_handle()?, D3D12_CLEAR_FLAG_DEPTH, *depth, 0, None);
            }
            RecordedCommand::BindConstants => {
                let uniforms = self.uniforms.as_ref().ok_or_else(|| {
                    DemoError::CommandExecution("Pipeline has no constant buffer".to_string())
                })?;
                list.SetGraphicsRootConstantBufferView(0, uniforms.gpu_address(slot));
            }
            RecordedCommand::BindMesh(id) => {
                let mesh = self.meshes.get(id.0).ok_or_else(|| {
                    DemoError::CommandExecution(format!("Mesh {} was never uploaded", id.0))
                })?;
                list.IASetVertexBuffers(0, Some(&[mesh.vertex_view]));
                if let Some(index_view) = &mesh.index_view {
                    list.IASetIndexBuffer(Some(index_view));
                }
            }
            RecordedCommand::Draw { vertex_count } => {
                list.DrawInstanced(*vertex_count, 1, 0, 0);
            }
            RecordedCommand::DrawIndexed { index_count } => {
                list.DrawIndexedInstanced(*index_count, 1, 0, 0, 0);
            }
        }
        Ok(())
    }
}

impl<C: Copy> FrameBackend for Dx12Backend<C> {
    type Constants = C;

    fn current_back_buffer(&self) -> Result<SlotIndex> {
        self.context.current_slot()
    }

    fn write_uniforms(&mut self, slot: SlotIndex, constants: &C) {
        if let Some(uniforms) = &mut self.uniforms {
            uniforms.write(slot, constants);
        }
    }

    fn reset_allocator(&mut self, lease: &SlotLease) -> Result<()> {
        let allocator = &self.context.command_allocators[lease.slot()];
        unsafe {
            allocator
                .Reset()
                .map_err(|e| DemoError::CommandExecution(format!("Failed to reset command allocator: {:?}", e)))?;
            self.command_list
                .Reset(allocator, Some(&self.pipeline.pso))
                .map_err(|e| DemoError::CommandExecution(format!("Failed to reset command list: {:?}", e)))?;
        }
        Ok(())
    }

    fn encode(&mut self, slot: SlotIndex, stream: &CommandStream) -> Result<()> {
        unsafe {
            self.command_list.SetGraphicsRootSignature(&self.pipeline.root_signature);
            self.command_list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);

            for command in stream.commands() {
                self.encode_command(slot, command)?;
            }

            self.command_list
                .Close()
                .map_err(|e| DemoError::CommandExecution(format!("Failed to close command list: {:?}", e)))?;
        }
        trace!(slot = slot.get(), commands = stream.len(), "Command list recorded");
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        unsafe {
            let command_lists = [Some(self.command_list.clone().into())];
            self.context.command_queue.ExecuteCommandLists(&command_lists);
        }
        Ok(())
    }

    fn present(&mut self, slot: SlotIndex) -> Result<()> {
        let sync_interval = u32::from(self.context.vsync);
        unsafe { self.context.swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .map_err(|e| DemoError::Device(format!("Present failed on slot {}: {:?}", slot.get(), e)))
    }
}

/// 场景 + D3D12 帧循环
pub struct Dx12Renderer<S: FrameScene> {
    frame_loop: FrameLoop<Dx12Backend<S::Constants>, Dx12Timeline>,
    scene: S,
}

impl<S: FrameScene> Dx12Renderer<S> {
    pub fn new(hwnd: HWND, width: u32, height: u32, config: &Config, scene: S) -> Result<Self> {
        let backend = Dx12Backend::new(hwnd, width, height, config, &scene)?;
        let timeline = Dx12Timeline::new(&backend.context().device, &backend.context().command_queue)?;
        let frame_loop = FrameLoop::new(backend, timeline)?;

        Ok(Self { frame_loop, scene })
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn title(&self) -> String {
        self.scene.title()
    }

    /// 处理按键命令，返回标题是否需要刷新
    pub fn apply(&mut self, command: SceneCommand) -> bool {
        self.scene.apply(command)
    }

    /// 渲染一帧
    pub fn render(&mut self, now: Duration) -> Result<()> {
        let constants = self.scene.update(now);
        let scene = &self.scene;
        self.frame_loop.render_frame(&constants, |recorder| scene.record(recorder))?;
        Ok(())
    }

    /// 清空 GPU 队列后释放所有资源
    pub fn shutdown(self) -> Result<()> {
        self.frame_loop.shutdown()
    }
}
