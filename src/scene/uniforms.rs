//! 常量缓冲区记录
//!
//! 字段布局与 HLSL `cbuffer` 的 16 字节打包规则一一对应。矩阵按列主序
//! 存放，着色器中以 `mul(M, v)` 使用。

use crate::math::{matrix, Matrix4, Vector3};

/// Lambert 立方体的常量
#[repr(C, align(256))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConstants {
    pub mvp: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub light_dir: [f32; 3],
    pub _pad0: f32,
}

impl LambertConstants {
    pub fn new(mvp: &Matrix4, world: &Matrix4, light_dir: &Vector3) -> Self {
        Self {
            mvp: matrix::to_column_array(mvp),
            world: matrix::to_column_array(world),
            light_dir: (*light_dir).into(),
            _pad0: 0.0,
        }
    }
}

/// PBR 演示的常量
#[repr(C, align(256))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrConstants {
    pub mvp: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],

    pub light_dir: [f32; 3],
    pub ambient: f32,

    pub mode: i32,
    pub _pad1: [f32; 3],

    pub view_pos: [f32; 3],
    pub shininess: f32,

    pub spec_intensity: f32,
    pub _pad2: [f32; 3],

    pub base_color: [f32; 3],
    pub metallic: f32,

    pub roughness: f32,
    pub ao: f32,
    pub _pad3: [f32; 2],

    pub light_pos: [f32; 3],
    pub light_intensity: f32,

    pub light_color: [f32; 3],
    pub _pad4: f32,
}

impl Default for PbrConstants {
    fn default() -> Self {
        Self {
            mvp: [[0.0; 4]; 4],
            world: [[0.0; 4]; 4],
            light_dir: [0.0, -1.0, 0.0],
            ambient: 0.0,
            mode: 0,
            _pad1: [0.0; 3],
            view_pos: [0.0; 3],
            shininess: 0.0,
            spec_intensity: 0.0,
            _pad2: [0.0; 3],
            base_color: [0.0; 3],
            metallic: 0.0,
            roughness: 0.0,
            ao: 0.0,
            _pad3: [0.0; 2],
            light_pos: [0.0; 3],
            light_intensity: 0.0,
            light_color: [0.0; 3],
            _pad4: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_lambert_layout() {
        assert_eq!(size_of::<LambertConstants>(), 256);
        assert_eq!(align_of::<LambertConstants>(), 256);
        assert_eq!(offset_of!(LambertConstants, world), 64);
        assert_eq!(offset_of!(LambertConstants, light_dir), 128);
        assert_eq!(offset_of!(LambertConstants, _pad0), 140);
    }

    #[test]
    fn test_pbr_layout_matches_cbuffer_registers() {
        assert_eq!(size_of::<PbrConstants>(), 256);
        assert_eq!(offset_of!(PbrConstants, world), 64);
        assert_eq!(offset_of!(PbrConstants, light_dir), 128);
        assert_eq!(offset_of!(PbrConstants, ambient), 140);
        assert_eq!(offset_of!(PbrConstants, mode), 144);
        assert_eq!(offset_of!(PbrConstants, view_pos), 160);
        assert_eq!(offset_of!(PbrConstants, shininess), 172);
        assert_eq!(offset_of!(PbrConstants, spec_intensity), 176);
        assert_eq!(offset_of!(PbrConstants, base_color), 192);
        assert_eq!(offset_of!(PbrConstants, metallic), 204);
        assert_eq!(offset_of!(PbrConstants, roughness), 208);
        assert_eq!(offset_of!(PbrConstants, ao), 212);
        assert_eq!(offset_of!(PbrConstants, light_pos), 224);
        assert_eq!(offset_of!(PbrConstants, light_intensity), 236);
        assert_eq!(offset_of!(PbrConstants, light_color), 240);
        assert_eq!(offset_of!(PbrConstants, _pad4), 252);
    }

    #[test]
    fn test_matrices_are_column_major() {
        let translation = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));
        let constants = LambertConstants::new(&translation, &Matrix4::identity(), &Vector3::y());

        // 平移位于第 4 列
        assert_eq!(constants.mvp[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(constants.world[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(constants.light_dir, [0.0, 1.0, 0.0]);
    }
}
