//! PBR 演示场景
//!
//! 一个点光源照亮的立方体/球体/导入模型，按键在运行时切换：
//!
//! | 键 | 作用 |
//! |----|------|
//! | T  | 着色模式 0..5 循环 |
//! | M / R / A | 金属度 / 粗糙度 / AO 预设循环 |
//! | P  | 暂停或恢复旋转 |
//! | G  | 切换几何体 |
//! | F  | 把光源固定在相机前方 |
//!
//! 着色模式由像素着色器解释：0 仅漫反射，1 Blinn-Phong，2 GGX 镜面项，
//! 3 菲涅尔，4 几何遮蔽，5 完整的 Cook-Torrance。

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::animation::AnimationTimer;
use super::camera::FixedCamera;
use super::lambert::spin_world;
use super::uniforms::PbrConstants;
use super::{FrameScene, MeshUpload, PipelineDesc, ShaderSource, VertexLayout};
use crate::core::config::Config;
use crate::core::input::SceneCommand;
use crate::geometry::{loaders, primitives, ColorMesh};
use crate::math::{matrix, Vector3};
use crate::renderer::{FrameRecorder, MeshId};

pub const PBR_CLEAR_COLOR: [f32; 4] = [0.07, 0.1, 0.16, 1.0];

pub const METALLIC_PRESETS: [f32; 4] = [0.0, 0.1, 0.5, 1.0];
pub const ROUGHNESS_PRESETS: [f32; 4] = [0.08, 0.35, 0.6, 0.9];
pub const AO_PRESETS: [f32; 4] = [0.0, 0.5, 0.8, 1.0];

const BASE_COLOR: [f32; 3] = [0.95, 0.25, 0.20];
const LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const LIGHT_INTENSITY: f32 = 60.0;
const AMBIENT: f32 = 0.15;
const SHININESS: f32 = 64.0;
const SPEC_INTENSITY: f32 = 0.6;

/// 光源轨道半径与高度
const ORBIT_RADIUS: f32 = 1.2;
const ORBIT_HEIGHT: f32 = 1.0;
/// 固定光源到相机的距离
const PINNED_DISTANCE: f32 = 1.2;

/// 在固定的预设值之间循环
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetCycle {
    values: &'static [f32],
    index: usize,
}

impl PresetCycle {
    pub const fn new(values: &'static [f32], index: usize) -> Self {
        Self { values, index }
    }

    pub fn value(&self) -> f32 {
        self.values[self.index % self.values.len()]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// 前进到下一个预设并返回它
    pub fn advance(&mut self) -> f32 {
        self.index = (self.index + 1) % self.values.len();
        self.value()
    }
}

/// 材质参数预设
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPresets {
    pub metallic: PresetCycle,
    pub roughness: PresetCycle,
    pub ao: PresetCycle,
}

impl Default for MaterialPresets {
    fn default() -> Self {
        Self {
            metallic: PresetCycle::new(&METALLIC_PRESETS, 0),
            roughness: PresetCycle::new(&ROUGHNESS_PRESETS, 1),
            ao: PresetCycle::new(&AO_PRESETS, 3),
        }
    }
}

/// 着色模式 0..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingMode(u8);

impl ShadingMode {
    pub const COUNT: u8 = 6;

    pub fn new(mode: u8) -> Option<Self> {
        (mode < Self::COUNT).then_some(Self(mode))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Self {
        Self((self.0 + 1) % Self::COUNT)
    }
}

impl Default for ShadingMode {
    fn default() -> Self {
        Self(5)
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 当前绘制的几何体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryChoice {
    Cube,
    Sphere,
    Model,
}

impl GeometryChoice {
    fn mesh_id(self) -> MeshId {
        match self {
            GeometryChoice::Cube => MeshId(0),
            GeometryChoice::Sphere => MeshId(1),
            GeometryChoice::Model => MeshId(2),
        }
    }

    /// 下一个几何体，没有模型时只在立方体和球体之间切换
    fn next(self, has_model: bool) -> Self {
        match self {
            GeometryChoice::Cube => GeometryChoice::Sphere,
            GeometryChoice::Sphere if has_model => GeometryChoice::Model,
            GeometryChoice::Sphere | GeometryChoice::Model => GeometryChoice::Cube,
        }
    }
}

#[derive(Debug)]
pub struct PbrScene {
    camera: FixedCamera,
    timer: AnimationTimer,
    material: MaterialPresets,
    mode: ShadingMode,
    geometry: GeometryChoice,
    light_pinned: bool,
    shader_path: PathBuf,
    cube: ColorMesh<u16>,
    sphere: ColorMesh<u16>,
    model: Option<ColorMesh<u32>>,
}

impl PbrScene {
    /// 按配置创建场景，模型加载失败时只记录警告
    pub fn new(config: &Config) -> Self {
        let (width, height) = config.window_size();
        let model = match loaders::load_mesh(&config.assets.model) {
            Ok(mesh) => {
                info!(
                    path = %config.assets.model.display(),
                    vertices = mesh.vertex_count(),
                    "模型加载成功"
                );
                Some(mesh.to_color_mesh())
            }
            Err(e) => {
                warn!(path = %config.assets.model.display(), "模型加载失败，G 键只在立方体和球体之间切换: {}", e);
                None
            }
        };

        if config.animation.pause_affects_light {
            info!("pause_affects_light 已启用：暂停时光源轨道也会停止");
        }

        Self::with_parts(
            FixedCamera::with_viewport(width, height),
            AnimationTimer::new(config.animation.pause_affects_light),
            &config.assets.pbr_shader,
            model,
        )
    }

    pub fn with_parts(
        camera: FixedCamera,
        timer: AnimationTimer,
        shader_path: &Path,
        model: Option<ColorMesh<u32>>,
    ) -> Self {
        Self {
            camera,
            timer,
            material: MaterialPresets::default(),
            mode: ShadingMode::default(),
            geometry: GeometryChoice::Cube,
            light_pinned: false,
            shader_path: shader_path.to_path_buf(),
            cube: primitives::unit_cube(),
            sphere: primitives::default_sphere(),
            model,
        }
    }

    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    pub fn material(&self) -> &MaterialPresets {
        &self.material
    }

    pub fn geometry(&self) -> GeometryChoice {
        self.geometry
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn is_light_pinned(&self) -> bool {
        self.light_pinned
    }

    fn light_position(&self, orbit_angle: f32) -> Vector3 {
        if self.light_pinned {
            self.camera.point_in_front(PINNED_DISTANCE)
        } else {
            Vector3::new(
                orbit_angle.cos() * ORBIT_RADIUS,
                ORBIT_HEIGHT,
                orbit_angle.sin() * ORBIT_RADIUS,
            )
        }
    }

    fn index_count(&self) -> u32 {
        let count = match self.geometry {
            GeometryChoice::Cube => self.cube.index_count(),
            GeometryChoice::Sphere => self.sphere.index_count(),
            GeometryChoice::Model => self.model.as_ref().map_or(0, |m| m.index_count()),
        };
        count as u32
    }
}

impl FrameScene for PbrScene {
    type Constants = PbrConstants;

    fn title(&self) -> String {
        format!(
            "DX12 PBR  |  Mode: {}  |  metallic={:.2}  roughness={:.2}  ao={:.2}",
            self.mode,
            self.material.metallic.value(),
            self.material.roughness.value(),
            self.material.ao.value()
        )
    }

    fn clear_color(&self) -> [f32; 4] {
        PBR_CLEAR_COLOR
    }

    fn pipeline(&self) -> PipelineDesc {
        PipelineDesc {
            shader: ShaderSource::File(self.shader_path.clone()),
            vs_entry: "VSMain",
            ps_entry: "PSMain",
            layout: VertexLayout::PositionColorNormal,
            depth: true,
            constants: true,
        }
    }

    fn meshes(&self) -> Vec<MeshUpload> {
        let mut meshes = vec![
            MeshUpload::from_color_mesh16("cube", &self.cube),
            MeshUpload::from_color_mesh16("sphere", &self.sphere),
        ];
        if let Some(model) = &self.model {
            meshes.push(MeshUpload::from_color_mesh32("model", model));
        }
        meshes
    }

    fn update(&mut self, now: Duration) -> Self::Constants {
        let sample = self.timer.tick(now);

        let world = spin_world(sample.rotation_time);
        let mvp = self.camera.view_projection() * world;
        let light_dir = Vector3::new(0.0, -1.0, 0.0).normalize();
        let light_pos = self.light_position(sample.orbit_angle);

        PbrConstants {
            mvp: matrix::to_column_array(&mvp),
            world: matrix::to_column_array(&world),
            light_dir: light_dir.into(),
            ambient: AMBIENT,
            mode: i32::from(self.mode.get()),
            view_pos: self.camera.eye.into(),
            shininess: SHININESS,
            spec_intensity: SPEC_INTENSITY,
            base_color: BASE_COLOR,
            metallic: self.material.metallic.value(),
            roughness: self.material.roughness.value(),
            ao: self.material.ao.value(),
            light_pos: light_pos.into(),
            light_intensity: LIGHT_INTENSITY,
            light_color: LIGHT_COLOR,
            ..PbrConstants::default()
        }
    }

    fn record(&self, recorder: &mut FrameRecorder) {
        recorder
            .set_render_target(true)
            .clear_color(self.clear_color())
            .clear_depth(1.0)
            .bind_constants()
            .bind_mesh(self.geometry.mesh_id())
            .draw_indexed(self.index_count());
    }

    fn apply(&mut self, command: SceneCommand) -> bool {
        match command {
            SceneCommand::CycleShadingMode => {
                self.mode = self.mode.next();
            }
            SceneCommand::CycleMetallic => {
                self.material.metallic.advance();
            }
            SceneCommand::CycleRoughness => {
                self.material.roughness.advance();
            }
            SceneCommand::CycleAmbientOcclusion => {
                self.material.ao.advance();
            }
            SceneCommand::TogglePause => {
                let paused = self.timer.toggle_pause();
                debug!(paused, "旋转暂停状态切换");
            }
            SceneCommand::CycleGeometry => {
                self.geometry = self.geometry.next(self.model.is_some());
                debug!(geometry = ?self.geometry, "切换几何体");
            }
            SceneCommand::TogglePinnedLight => {
                self.light_pinned = !self.light_pinned;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::{Clock, ManualClock};
    use crate::renderer::RecordedCommand;
    use approx::assert_relative_eq;

    fn scene() -> PbrScene {
        PbrScene::with_parts(
            FixedCamera::default(),
            AnimationTimer::default(),
            Path::new("pbr.hlsl"),
            None,
        )
    }

    fn quad_model() -> ColorMesh<u32> {
        ColorMesh {
            vertices: primitives::unit_cube().vertices,
            indices: (0..6).collect(),
        }
    }

    #[test]
    fn test_initial_title() {
        assert_eq!(
            scene().title(),
            "DX12 PBR  |  Mode: 5  |  metallic=0.00  roughness=0.35  ao=1.00"
        );
    }

    #[test]
    fn test_mode_wraps_after_five() {
        let mut scene = scene();
        scene.apply(SceneCommand::CycleShadingMode);
        assert_eq!(scene.mode().get(), 0);
        for _ in 0..5 {
            scene.apply(SceneCommand::CycleShadingMode);
        }
        assert_eq!(scene.mode().get(), 5);
        assert_eq!(ShadingMode::new(6), None);
    }

    #[test]
    fn test_material_presets_cycle() {
        let mut scene = scene();
        scene.apply(SceneCommand::CycleMetallic);
        scene.apply(SceneCommand::CycleRoughness);
        scene.apply(SceneCommand::CycleAmbientOcclusion);

        let material = scene.material();
        assert_eq!(material.metallic.value(), 0.1);
        assert_eq!(material.roughness.value(), 0.6);
        assert_eq!(material.ao.value(), 0.0);
        assert!(scene.title().contains("metallic=0.10  roughness=0.60  ao=0.00"));
    }

    #[test]
    fn test_geometry_cycle_without_model() {
        let mut scene = scene();
        scene.apply(SceneCommand::CycleGeometry);
        assert_eq!(scene.geometry(), GeometryChoice::Sphere);
        scene.apply(SceneCommand::CycleGeometry);
        assert_eq!(scene.geometry(), GeometryChoice::Cube);
        assert_eq!(scene.meshes().len(), 2);
    }

    #[test]
    fn test_geometry_cycle_with_model() {
        let mut scene = PbrScene::with_parts(
            FixedCamera::default(),
            AnimationTimer::default(),
            Path::new("pbr.hlsl"),
            Some(quad_model()),
        );
        assert_eq!(scene.meshes().len(), 3);

        scene.apply(SceneCommand::CycleGeometry);
        scene.apply(SceneCommand::CycleGeometry);
        assert_eq!(scene.geometry(), GeometryChoice::Model);

        let mut recorder = FrameRecorder::begin();
        scene.record(&mut recorder);
        let commands = recorder.finish().commands().to_vec();
        assert!(commands.contains(&RecordedCommand::BindMesh(MeshId(2))));
        assert!(commands.contains(&RecordedCommand::DrawIndexed { index_count: 6 }));

        scene.apply(SceneCommand::CycleGeometry);
        assert_eq!(scene.geometry(), GeometryChoice::Cube);
    }

    #[test]
    fn test_sphere_draw_uses_sphere_indices() {
        let mut scene = scene();
        scene.apply(SceneCommand::CycleGeometry);

        let mut recorder = FrameRecorder::begin();
        scene.record(&mut recorder);
        let stream = recorder.finish();
        assert!(stream.validate().is_ok());
        assert!(stream
            .commands()
            .contains(&RecordedCommand::DrawIndexed { index_count: 32 * 32 * 6 }));
    }

    #[test]
    fn test_constants_fixed_fields() {
        let mut scene = scene();
        let constants = scene.update(Duration::from_millis(500));

        assert_eq!(constants.mode, 5);
        assert_eq!(constants.ambient, 0.15);
        assert_eq!(constants.shininess, 64.0);
        assert_eq!(constants.spec_intensity, 0.6);
        assert_eq!(constants.base_color, [0.95, 0.25, 0.20]);
        assert_eq!(constants.light_color, [1.0, 1.0, 1.0]);
        assert_eq!(constants.light_intensity, 60.0);
        assert_eq!(constants.light_dir, [0.0, -1.0, 0.0]);
        assert_eq!(constants.view_pos, [1.5, 1.2, -2.0]);
    }

    #[test]
    fn test_light_orbits_on_raw_seconds() {
        let mut scene = scene();
        let constants = scene.update(Duration::from_secs(2));
        assert_relative_eq!(constants.light_pos[0], 2.0f32.cos() * 1.2, epsilon = 1e-6);
        assert_relative_eq!(constants.light_pos[1], 1.0);
        assert_relative_eq!(constants.light_pos[2], 2.0f32.sin() * 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_pinned_light_sits_in_front_of_camera() {
        let mut scene = scene();
        scene.apply(SceneCommand::TogglePinnedLight);
        assert!(scene.is_light_pinned());

        let constants = scene.update(Duration::from_secs(3));
        let eye = Vector3::new(1.5, 1.2, -2.0);
        let expected = eye + (-eye).normalize() * 1.2;
        assert_relative_eq!(Vector3::from(constants.light_pos), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_pause_freezes_world_while_light_keeps_moving() {
        let clock = ManualClock::new();
        let mut scene = scene();
        let step = Duration::from_millis(16);

        clock.advance(step);
        scene.update(clock.now());
        scene.apply(SceneCommand::TogglePause);
        assert!(scene.is_paused());

        clock.advance(step);
        let a = scene.update(clock.now());
        clock.advance(step);
        let b = scene.update(clock.now());

        for (x, y) in a.world.iter().flatten().zip(b.world.iter().flatten()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_ne!(a.light_pos, b.light_pos);
    }
}
