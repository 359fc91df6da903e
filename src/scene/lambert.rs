//! 旋转的 Lambert 立方体
//!
//! 立方体绕 X、Y 轴按真实时间旋转，像素着色器做 `0.15 + max(0, N·-L)`
//! 的漫反射。

use std::time::Duration;

use super::camera::FixedCamera;
use super::uniforms::LambertConstants;
use super::{FrameScene, MeshUpload, PipelineDesc, ShaderSource, VertexLayout};
use crate::geometry::primitives;
use crate::gfx::shaders;
use crate::math::{matrix, Matrix4, Vector3};
use crate::renderer::{FrameRecorder, MeshId};

pub const LAMBERT_TITLE: &str = "DX12 Rotating Cube";
pub const LAMBERT_CLEAR_COLOR: [f32; 4] = [0.07, 0.1, 0.16, 1.0];

/// 绕 X / Y 轴的角速度（rad/s）
pub const SPIN_X: f32 = 0.7;
pub const SPIN_Y: f32 = 1.1;

/// `W = RotY(t·1.1) · RotX(t·0.7)`
pub fn spin_world(t: f32) -> Matrix4 {
    matrix::rotation_y(t * SPIN_Y) * matrix::rotation_x(t * SPIN_X)
}

#[derive(Debug)]
pub struct LambertScene {
    camera: FixedCamera,
    light_dir: Vector3,
    index_count: u32,
}

impl LambertScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: FixedCamera::with_viewport(width, height),
            light_dir: Vector3::new(0.0, -1.0, 0.0),
            index_count: primitives::unit_cube().index_count() as u32,
        }
    }

    pub fn camera(&self) -> &FixedCamera {
        &self.camera
    }

    /// 指定时刻的常量
    pub fn constants_at(&self, seconds: f32) -> LambertConstants {
        let world = spin_world(seconds);
        let mvp = self.camera.view_projection() * world;
        LambertConstants::new(&mvp, &world, &self.light_dir)
    }
}

impl FrameScene for LambertScene {
    type Constants = LambertConstants;

    fn title(&self) -> String {
        LAMBERT_TITLE.to_string()
    }

    fn clear_color(&self) -> [f32; 4] {
        LAMBERT_CLEAR_COLOR
    }

    fn pipeline(&self) -> PipelineDesc {
        PipelineDesc {
            shader: ShaderSource::Embedded {
                name: "lambert.hlsl",
                source: shaders::DX12_LAMBERT,
            },
            vs_entry: "VSMain",
            ps_entry: "PSMain",
            layout: VertexLayout::PositionColorNormal,
            depth: true,
            constants: true,
        }
    }

    fn meshes(&self) -> Vec<MeshUpload> {
        vec![MeshUpload::from_color_mesh16("cube", &primitives::unit_cube())]
    }

    fn update(&mut self, now: Duration) -> Self::Constants {
        self.constants_at(now.as_secs_f32())
    }

    fn record(&self, recorder: &mut FrameRecorder) {
        recorder
            .set_render_target(true)
            .clear_color(self.clear_color())
            .clear_depth(1.0)
            .bind_constants()
            .bind_mesh(MeshId(0))
            .draw_indexed(self.index_count);
    }
}
