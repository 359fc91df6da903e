//! 数学库模块
//!
//! 基于 `nalgebra`，提供与 DirectXMath 对应的左手坐标系变换。
//!
//! # 约定
//!
//! - 使用列向量：`clip = P * V * W * p`
//! - 矩阵以列主序写入常量缓冲区，HLSL 默认的 `column_major` 打包读到的
//!   就是同一个矩阵，着色器中写 `mul(M, v)`
//! - 投影矩阵的深度范围是 D3D 的 `[0, 1]`

pub use nalgebra::{Matrix4 as Mat4, Point3 as Pt3, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;
pub type Point3 = Pt3<f32>;

/// 数学常量
pub mod constants {
    /// π
    pub const PI: f32 = std::f32::consts::PI;

    /// 2π
    pub const TAU: f32 = std::f32::consts::TAU;

    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// 角度转弧度
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * constants::DEG_TO_RAD
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// 绕 X 轴旋转（与 `XMMatrixRotationX` 作用于向量的效果相同）
    pub fn rotation_x(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::x_axis(), angle)
    }

    /// 绕 Y 轴旋转
    pub fn rotation_y(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// 左手坐标系 Look-At 视图矩阵（`XMMatrixLookAtLH`）
    pub fn look_at_lh(eye: &Vector3, target: &Vector3, up: &Vector3) -> Matrix4 {
        Matrix4::look_at_lh(&Point3::from(*eye), &Point3::from(*target), up)
    }

    /// 左手坐标系透视投影（`XMMatrixPerspectiveFovLH`）
    ///
    /// 近平面映射到 z = 0，远平面映射到 z = 1。
    pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        let h = 1.0 / (fov_y * 0.5).tan();
        let w = h / aspect;
        let range = far / (far - near);

        #[rustfmt::skip]
        let m = Matrix4::new(
            w,   0.0, 0.0,   0.0,
            0.0, h,   0.0,   0.0,
            0.0, 0.0, range, -range * near,
            0.0, 0.0, 1.0,   0.0,
        );
        m
    }

    /// 转换为常量缓冲区中的列主序布局
    pub fn to_column_array(m: &Matrix4) -> [[f32; 4]; 4] {
        *m.as_ref()
    }
}
