//! 固定相机
//!
//! 所有 3D 示例共用同一个静止相机：从 (1.5, 1.2, -2) 看向原点。

use crate::math::{deg_to_rad, matrix, Matrix4, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera {
    pub eye: Vector3,
    pub target: Vector3,
    pub up: Vector3,
    /// 垂直视场角（弧度）
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl FixedCamera {
    /// 按窗口尺寸计算宽高比
    pub fn with_viewport(width: u32, height: u32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            ..Self::default()
        }
    }

    pub fn view(&self) -> Matrix4 {
        matrix::look_at_lh(&self.eye, &self.target, &self.up)
    }

    pub fn projection(&self) -> Matrix4 {
        matrix::perspective_fov_lh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// P * V
    pub fn view_projection(&self) -> Matrix4 {
        self.projection() * self.view()
    }

    /// 世界空间中相机前方 `distance` 处的点
    pub fn point_in_front(&self, distance: f32) -> Vector3 {
        let forward = (self.target - self.eye).normalize();
        self.eye + forward * distance
    }
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            eye: Vector3::new(1.5, 1.2, -2.0),
            target: Vector3::zeros(),
            up: Vector3::y(),
            fov_y: deg_to_rad(60.0),
            aspect: 1280.0 / 720.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
