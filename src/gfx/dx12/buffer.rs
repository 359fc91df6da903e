//! 上传堆缓冲区
//!
//! 顶点/索引缓冲区在启动时写入一次；常量缓冲区持久映射，
//! 每个帧槽位占一个 256 字节对齐的区域。

use tracing::{debug, info};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use crate::core::error::{DemoError, Result};
use crate::renderer::{MappedUniform, SlotIndex, UniformLayout};
use crate::scene::{MeshIndices, MeshUpload};

/// 在上传堆创建缓冲区，初始状态 GENERIC_READ
pub fn create_upload_buffer(device: &ID3D12Device, size: u64) -> Result<ID3D12Resource> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_UPLOAD,
        ..Default::default()
    };
    let resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Width: size.max(1),
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        ..Default::default()
    };

    let mut buffer: Option<ID3D12Resource> = None;
    unsafe {
        device
            .CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &resource_desc,
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
                &mut buffer,
            )
            .map_err(|e| DemoError::ResourceCreation(format!("Failed to create upload buffer: {:?}", e)))?;
    }
    buffer.ok_or_else(|| DemoError::ResourceCreation("Upload buffer is null".to_string()))
}

/// 创建缓冲区并一次写入 `bytes`
pub fn upload_bytes(device: &ID3D12Device, bytes: &[u8]) -> Result<ID3D12Resource> {
    let buffer = create_upload_buffer(device, bytes.len() as u64)?;
    unsafe {
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        let mut data = std::ptr::null_mut();
        buffer
            .Map(0, Some(&read_range), Some(&mut data))
            .map_err(|e| DemoError::ResourceCreation(format!("Failed to map upload buffer: {:?}", e)))?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
        buffer.Unmap(0, None);
    }
    Ok(buffer)
}

/// GPU 上的静态网格
pub struct GpuMesh {
    pub name: String,
    _vertex_buffer: ID3D12Resource,
    _index_buffer: Option<ID3D12Resource>,
    pub vertex_view: D3D12_VERTEX_BUFFER_VIEW,
    pub index_view: Option<D3D12_INDEX_BUFFER_VIEW>,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &ID3D12Device, mesh: &MeshUpload) -> Result<Self> {
        let vertex_buffer = upload_bytes(device, &mesh.vertex_bytes)?;
        let vertex_view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { vertex_buffer.GetGPUVirtualAddress() },
            SizeInBytes: mesh.vertex_bytes.len() as u32,
            StrideInBytes: mesh.stride,
        };

        let (index_bytes, format): (&[u8], DXGI_FORMAT) = match &mesh.indices {
            MeshIndices::None => (&[], DXGI_FORMAT_UNKNOWN),
            MeshIndices::U16(indices) => (bytemuck::cast_slice(indices), DXGI_FORMAT_R16_UINT),
            MeshIndices::U32(indices) => (bytemuck::cast_slice(indices), DXGI_FORMAT_R32_UINT),
        };

        let (index_buffer, index_view) = if index_bytes.is_empty() {
            (None, None)
        } else {
            let buffer = upload_bytes(device, index_bytes)?;
            let view = D3D12_INDEX_BUFFER_VIEW {
                BufferLocation: unsafe { buffer.GetGPUVirtualAddress() },
                SizeInBytes: index_bytes.len() as u32,
                Format: format,
            };
            (Some(buffer), Some(view))
        };

        debug!(
            mesh = %mesh.name,
            vertices = mesh.vertex_count,
            indices = mesh.index_count(),
            "Mesh uploaded"
        );

        Ok(Self {
            name: mesh.name.clone(),
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            vertex_view,
            index_view,
            vertex_count: mesh.vertex_count,
            index_count: mesh.index_count(),
        })
    }
}

/// 持久映射的常量缓冲区
pub struct UniformBuffer<T: Copy> {
    mapped: MappedUniform<T>,
    resource: ID3D12Resource,
}

impl<T: Copy> UniformBuffer<T> {
    pub fn new(device: &ID3D12Device) -> Result<Self> {
        let layout = UniformLayout::for_type::<T>();
        let resource = create_upload_buffer(device, layout.total_size() as u64)?;

        let mapped = unsafe {
            let read_range = D3D12_RANGE { Begin: 0, End: 0 };
            let mut data = std::ptr::null_mut();
            resource
                .Map(0, Some(&read_range), Some(&mut data))
                .map_err(|e| DemoError::ResourceCreation(format!("Failed to map constant buffer: {:?}", e)))?;
            // SAFETY: 映射覆盖 total_size 字节，直到 Drop 时才解除
            MappedUniform::from_raw(data as *mut u8)?
        };

        info!(
            region = layout.region_size(),
            total = layout.total_size(),
            "Constant buffer created and mapped"
        );

        Ok(Self { mapped, resource })
    }

    pub fn write(&mut self, slot: SlotIndex, value: &T) {
        self.mapped.write(slot, value);
    }

    /// 槽位区域的 GPU 虚拟地址
    pub fn gpu_address(&self, slot: SlotIndex) -> u64 {
        unsafe { self.resource.GetGPUVirtualAddress() + self.mapped.layout().offset(slot) as u64 }
    }
}

impl<T: Copy> Drop for UniformBuffer<T> {
    fn drop(&mut self) {
        unsafe {
            self.resource.Unmap(0, None);
        }
    }
}
