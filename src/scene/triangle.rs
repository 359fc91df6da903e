//! 彩色三角形
//!
//! 最小的 D3D12 示例：一次非索引绘制，没有常量缓冲区也没有深度。

use std::time::Duration;

use super::{FrameScene, MeshUpload, PipelineDesc, ShaderSource, VertexLayout};
use crate::geometry::primitives;
use crate::gfx::shaders;
use crate::renderer::{FrameRecorder, MeshId};

pub const TRIANGLE_TITLE: &str = "DX12 Hello Triangle";
pub const TRIANGLE_CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.4, 1.0];

#[derive(Debug, Default)]
pub struct TriangleScene {
    title: Option<String>,
}

impl TriangleScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义标题
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

impl FrameScene for TriangleScene {
    type Constants = ();

    fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| TRIANGLE_TITLE.to_string())
    }

    fn clear_color(&self) -> [f32; 4] {
        TRIANGLE_CLEAR_COLOR
    }

    fn pipeline(&self) -> PipelineDesc {
        PipelineDesc {
            shader: ShaderSource::Embedded {
                name: "triangle.hlsl",
                source: shaders::DX12_TRIANGLE,
            },
            vs_entry: "VSMain",
            ps_entry: "PSMain",
            layout: VertexLayout::PositionColor,
            depth: false,
            constants: false,
        }
    }

    fn meshes(&self) -> Vec<MeshUpload> {
        vec![MeshUpload::from_vertices("triangle", &primitives::hello_triangle_dx12())]
    }

    fn update(&mut self, _now: Duration) -> Self::Constants {}

    fn record(&self, recorder: &mut FrameRecorder) {
        recorder
            .set_render_target(false)
            .clear_color(self.clear_color())
            .bind_mesh(MeshId(0))
            .draw(3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordedCommand;

    #[test]
    fn test_triangle_frame() {
        let scene = TriangleScene::new();
        let mut recorder = FrameRecorder::begin();
        scene.record(&mut recorder);
        let stream = recorder.finish();

        assert!(stream.validate().is_ok());
        assert!(stream.commands().contains(&RecordedCommand::Draw { vertex_count: 3 }));
        assert!(!stream.commands().contains(&RecordedCommand::BindConstants));
    }

    #[test]
    fn test_pipeline_has_no_depth_or_constants() {
        let pipeline = TriangleScene::new().pipeline();
        assert!(!pipeline.depth);
        assert!(!pipeline.constants);
        assert_eq!(pipeline.layout, VertexLayout::PositionColor);
    }

    #[test]
    fn test_title_override() {
        assert_eq!(TriangleScene::new().title(), "DX12 Hello Triangle");
        assert_eq!(TriangleScene::with_title("mine").title(), "mine");
    }
}
