//! 场景模块
//!
//! 每个示例是一个实现 [`FrameScene`] 的场景：它描述自己需要的管线和网格，
//! 每帧根据时间计算常量缓冲区内容，并把绘制命令记录到 [`FrameRecorder`]。
//! 场景不接触任何图形 API，因此可以脱离 GPU 测试。
//!
//! # 示例
//!
//! - [`TriangleScene`]：彩色三角形，无常量、无深度
//! - [`LambertScene`]：旋转立方体，逐像素 Lambert 光照
//! - [`PbrScene`]：可切换着色模式与材质的 PBR 演示

pub mod animation;
pub mod camera;
pub mod lambert;
pub mod pbr;
pub mod triangle;
pub mod uniforms;

pub use animation::{AnimationSample, AnimationTimer};
pub use camera::FixedCamera;
pub use lambert::LambertScene;
pub use pbr::PbrScene;
pub use triangle::TriangleScene;
pub use uniforms::{LambertConstants, PbrConstants};

use std::path::PathBuf;
use std::time::Duration;

use crate::core::input::SceneCommand;
use crate::geometry::{ColorMesh, ColorVertex, PositionColorVertex};
use crate::renderer::FrameRecorder;

/// 着色器源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    /// 编译进可执行文件的源码
    Embedded {
        name: &'static str,
        source: &'static str,
    },
    /// 启动时从磁盘读取
    File(PathBuf),
}

/// 顶点输入布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// POSITION(float3) + COLOR(float3)
    PositionColor,
    /// POSITION(float3) + COLOR(float3) + NORMAL(float3)
    PositionColorNormal,
}

impl VertexLayout {
    /// 顶点跨度（字节）
    pub fn stride(&self) -> u32 {
        match self {
            VertexLayout::PositionColor => std::mem::size_of::<PositionColorVertex>() as u32,
            VertexLayout::PositionColorNormal => std::mem::size_of::<ColorVertex>() as u32,
        }
    }
}

/// 管线描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDesc {
    pub shader: ShaderSource,
    /// 顶点着色器入口
    pub vs_entry: &'static str,
    /// 像素着色器入口
    pub ps_entry: &'static str,
    pub layout: VertexLayout,
    /// 是否使用深度缓冲（D32_FLOAT，LESS）
    pub depth: bool,
    /// 根签名是否包含 b0 常量缓冲区
    pub constants: bool,
}

/// 索引数据
#[derive(Debug, Clone, PartialEq)]
pub enum MeshIndices {
    None,
    U16(Vec<u16>),
    U32(Vec<u32>),
}

/// 待上传的网格
#[derive(Debug, Clone, PartialEq)]
pub struct MeshUpload {
    pub name: String,
    /// 顶点数据按字节展开
    pub vertex_bytes: Vec<u8>,
    pub stride: u32,
    pub vertex_count: u32,
    pub indices: MeshIndices,
}

impl MeshUpload {
    /// 只有顶点的网格
    pub fn from_vertices<V: bytemuck::Pod>(name: impl Into<String>, vertices: &[V]) -> Self {
        Self {
            name: name.into(),
            vertex_bytes: bytemuck::cast_slice(vertices).to_vec(),
            stride: std::mem::size_of::<V>() as u32,
            vertex_count: vertices.len() as u32,
            indices: MeshIndices::None,
        }
    }

    pub fn from_color_mesh16(name: impl Into<String>, mesh: &ColorMesh<u16>) -> Self {
        Self {
            indices: MeshIndices::U16(mesh.indices.clone()),
            ..Self::from_vertices(name, &mesh.vertices)
        }
    }

    pub fn from_color_mesh32(name: impl Into<String>, mesh: &ColorMesh<u32>) -> Self {
        Self {
            indices: MeshIndices::U32(mesh.indices.clone()),
            ..Self::from_vertices(name, &mesh.vertices)
        }
    }

    pub fn index_count(&self) -> u32 {
        match &self.indices {
            MeshIndices::None => 0,
            MeshIndices::U16(indices) => indices.len() as u32,
            MeshIndices::U32(indices) => indices.len() as u32,
        }
    }
}

/// 一个可逐帧渲染的示例场景
pub trait FrameScene {
    /// 每帧写入常量缓冲区的记录
    type Constants: Copy;

    /// 当前窗口标题
    fn title(&self) -> String;

    fn clear_color(&self) -> [f32; 4];

    fn pipeline(&self) -> PipelineDesc;

    /// 启动时上传一次的网格，下标即 `MeshId`
    fn meshes(&self) -> Vec<MeshUpload>;

    /// 推进到 `now` 并计算本帧常量
    fn update(&mut self, now: Duration) -> Self::Constants;

    /// 记录本帧的绘制命令
    fn record(&self, recorder: &mut FrameRecorder);

    /// 处理按键命令，返回标题是否需要刷新
    fn apply(&mut self, _command: SceneCommand) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;

    #[test]
    fn test_layout_strides() {
        assert_eq!(VertexLayout::PositionColor.stride(), 24);
        assert_eq!(VertexLayout::PositionColorNormal.stride(), 36);
    }

    #[test]
    fn test_mesh_upload_from_cube() {
        let cube = primitives::unit_cube();
        let upload = MeshUpload::from_color_mesh16("cube", &cube);

        assert_eq!(upload.vertex_count, 24);
        assert_eq!(upload.stride, 36);
        assert_eq!(upload.vertex_bytes.len(), 24 * 36);
        assert_eq!(upload.index_count(), 36);
    }

    #[test]
    fn test_mesh_upload_without_indices() {
        let upload = MeshUpload::from_vertices("triangle", &primitives::hello_triangle_dx12());
        assert_eq!(upload.vertex_count, 3);
        assert_eq!(upload.index_count(), 0);
        assert_eq!(upload.indices, MeshIndices::None);
    }
}
