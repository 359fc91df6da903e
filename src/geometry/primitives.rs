/// 内置几何体
///
/// 示例中写死的网格：两种三角形、24 顶点立方体和 UV 球体。
/// 所有几何体都在启动时生成一次并上传，之后不再修改。

use super::vertex::{ColorVertex, Dx11Vertex, PositionColorVertex};
use crate::math::constants::{PI, TAU};

/// 带索引的彩色网格
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMesh<I> {
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<I>,
}

impl<I> ColorMesh<I> {
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// 立方体半边长
pub const CUBE_HALF_EXTENT: f32 = 0.5;

/// 默认球体参数
pub const SPHERE_RADIUS: f32 = 0.5;
pub const SPHERE_STACKS: u32 = 32;
pub const SPHERE_SLICES: u32 = 32;

/// DX12 三角形（屏幕中心的小三角形）
pub fn hello_triangle_dx12() -> [PositionColorVertex; 3] {
    [
        PositionColorVertex { position: [0.0, 0.25, 0.0], color: [1.0, 0.0, 0.0] },
        PositionColorVertex { position: [0.25, -0.25, 0.0], color: [0.0, 1.0, 0.0] },
        PositionColorVertex { position: [-0.25, -0.25, 0.0], color: [0.0, 0.0, 1.0] },
    ]
}

/// DX11 三角形
pub fn hello_triangle_dx11() -> [Dx11Vertex; 3] {
    [
        Dx11Vertex { position: [0.0, 0.5, 0.0], color: [1.0, 0.0, 0.0, 1.0] },
        Dx11Vertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0, 1.0] },
        Dx11Vertex { position: [-0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0, 1.0] },
    ]
}

/// 单位立方体
///
/// 每个面 4 个顶点（法线不共享），共 24 个顶点、36 个索引。
/// 顺时针为正面，配合背面剔除使用。
pub fn unit_cube() -> ColorMesh<u16> {
    let s = CUBE_HALF_EXTENT;

    // (位置, 颜色) 按面排列，每面 4 个角
    #[rustfmt::skip]
    let faces: [([f32; 3], [([f32; 3], [f32; 3]); 4]); 6] = [
        // 前 (+Z)
        ([0.0, 0.0, 1.0], [
            ([-s, -s, s], [1.0, 0.0, 0.0]),
            ([s, -s, s], [0.0, 1.0, 0.0]),
            ([s, s, s], [0.0, 0.0, 1.0]),
            ([-s, s, s], [1.0, 1.0, 0.0]),
        ]),
        // 后 (-Z)
        ([0.0, 0.0, -1.0], [
            ([-s, -s, -s], [1.0, 0.0, 1.0]),
            ([-s, s, -s], [0.0, 1.0, 1.0]),
            ([s, s, -s], [1.0, 1.0, 1.0]),
            ([s, -s, -s], [0.0, 0.0, 0.0]),
        ]),
        // 左 (-X)
        ([-1.0, 0.0, 0.0], [
            ([-s, -s, -s], [1.0, 0.0, 1.0]),
            ([-s, -s, s], [1.0, 0.0, 0.0]),
            ([-s, s, s], [1.0, 1.0, 0.0]),
            ([-s, s, -s], [0.0, 1.0, 1.0]),
        ]),
        // 右 (+X)
        ([1.0, 0.0, 0.0], [
            ([s, -s, s], [0.0, 1.0, 0.0]),
            ([s, -s, -s], [0.0, 0.0, 0.0]),
            ([s, s, -s], [1.0, 1.0, 1.0]),
            ([s, s, s], [0.0, 0.0, 1.0]),
        ]),
        // 上 (+Y)
        ([0.0, 1.0, 0.0], [
            ([-s, s, s], [1.0, 1.0, 0.0]),
            ([s, s, s], [0.0, 0.0, 1.0]),
            ([s, s, -s], [1.0, 1.0, 1.0]),
            ([-s, s, -s], [0.0, 1.0, 1.0]),
        ]),
        // 下 (-Y)
        ([0.0, -1.0, 0.0], [
            ([-s, -s, -s], [1.0, 0.0, 1.0]),
            ([s, -s, -s], [0.0, 0.0, 0.0]),
            ([s, -s, s], [0.0, 1.0, 0.0]),
            ([-s, -s, s], [1.0, 0.0, 0.0]),
        ]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in faces.iter() {
        let base = vertices.len() as u16;
        for (position, color) in corners.iter() {
            vertices.push(ColorVertex::new(*position, *color, *normal));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    ColorMesh { vertices, indices }
}

/// UV 球体
///
/// 顶点颜色取 `0.5 * (n + 1)`，便于直接观察法线方向。
pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> ColorMesh<u16> {
    let vertex_count = ((stacks + 1) * (slices + 1)) as usize;
    let mut vertices = Vec::with_capacity(vertex_count);

    for y in 0..=stacks {
        let phi = (y as f32 / stacks as f32) * PI;
        for x in 0..=slices {
            let theta = (x as f32 / slices as f32) * TAU;

            let n = [theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin()];
            let position = [n[0] * radius, n[1] * radius, n[2] * radius];
            let color = [0.5 * (n[0] + 1.0), 0.5 * (n[1] + 1.0), 0.5 * (n[2] + 1.0)];

            vertices.push(ColorVertex::new(position, color, n));
        }
    }

    let stride = (slices + 1) as u16;
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    for y in 0..stacks as u16 {
        for x in 0..slices as u16 {
            let i0 = y * stride + x;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
        }
    }

    ColorMesh { vertices, indices }
}

/// 默认参数的球体（半径 0.5，32×32）
pub fn default_sphere() -> ColorMesh<u16> {
    uv_sphere(SPHERE_RADIUS, SPHERE_STACKS, SPHERE_SLICES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn test_cube_face_normals_point_outward() {
        let cube = unit_cube();
        for v in &cube.vertices {
            let dot: f32 = (0..3).map(|i| v.position[i] * v.normal[i]).sum();
            // 每个顶点都在法线指向的那一面上
            assert_relative_eq!(dot, CUBE_HALF_EXTENT, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_cube_winding_is_clockwise_from_outside() {
        // 左手坐标系下从外部看为顺时针，即 (b-a)×(c-a) 与外法线同向
        let cube = unit_cube();
        for tri in cube.indices.chunks(3) {
            let a = cube.vertices[tri[0] as usize];
            let b = cube.vertices[tri[1] as usize];
            let c = cube.vertices[tri[2] as usize];

            let e1 = [b.position[0] - a.position[0], b.position[1] - a.position[1], b.position[2] - a.position[2]];
            let e2 = [c.position[0] - a.position[0], c.position[1] - a.position[1], c.position[2] - a.position[2]];
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let dot: f32 = (0..3).map(|i| cross[i] * a.normal[i]).sum();
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = default_sphere();
        assert_eq!(sphere.vertices.len(), 33 * 33);
        assert_eq!(sphere.index_count(), 32 * 32 * 6);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let sphere = uv_sphere(2.0, 8, 8);
        for v in &sphere.vertices {
            let len = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert_relative_eq!(len, 2.0, epsilon = 1e-5);
            for i in 0..3 {
                assert_relative_eq!(v.color[i], 0.5 * (v.normal[i] + 1.0), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_triangles() {
        let dx12 = hello_triangle_dx12();
        assert_eq!(dx12[0].position, [0.0, 0.25, 0.0]);
        assert_eq!(dx12[2].color, [0.0, 0.0, 1.0]);

        let dx11 = hello_triangle_dx11();
        assert_eq!(dx11[1].position, [0.5, -0.5, 0.0]);
        assert_eq!(dx11[0].color, [1.0, 0.0, 0.0, 1.0]);
    }
}
