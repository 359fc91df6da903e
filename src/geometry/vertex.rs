/// 顶点定义模块
///
/// 三种示例各自使用的顶点格式，以及模型导入时的完整顶点。
/// 内存布局与 HLSL 输入布局一一对应，使用 `#[repr(C)]` 保证顺序和对齐。

use bytemuck::{Pod, Zeroable};

/// 带法线的彩色顶点（Lambert 立方体与 PBR 示例）
///
/// # 内存布局
///
/// - position: 12 bytes (POSITION, float3)
/// - color: 12 bytes (COLOR, float3)
/// - normal: 12 bytes (NORMAL, float3)
/// - **总计**: 36 bytes
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl ColorVertex {
    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, color, normal }
    }
}

/// DX12 三角形顶点：POSITION(float3) + COLOR(float3)
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PositionColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// DX11 三角形顶点：POSITION(float3) + COLOR(float4)
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Dx11Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// 模型导入使用的顶点
///
/// 只保留位置、法线和纹理坐标；转换为 [`ColorVertex`] 后上传。
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f32; 3],

    /// 法线向量 (nx, ny, nz)
    ///
    /// 文件中缺失时由加载器按面法线重建。
    pub normal: [f32; 3],

    /// 纹理坐标 (u, v)，V 轴已翻转
    pub texcoord: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_vertex_sizes() {
        // 必须与输入布局中的偏移一致
        assert_eq!(size_of::<ColorVertex>(), 36);
        assert_eq!(size_of::<PositionColorVertex>(), 24);
        assert_eq!(size_of::<Dx11Vertex>(), 28);
        assert_eq!(size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_vertex_alignment() {
        assert_eq!(align_of::<ColorVertex>(), 4);
        assert_eq!(align_of::<Dx11Vertex>(), 4);
    }

    #[test]
    fn test_color_vertex_bytes() {
        let v = ColorVertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 36);

        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[6..9], &[0.0, 0.0, 1.0]);
    }
}
