/// 网格数据结构模块
///
/// 定义CPU侧的网格数据容器，用于存储从文件加载的几何数据，
/// 并转换为示例使用的 [`ColorVertex`] 网格。

use super::primitives::ColorMesh;
use super::vertex::{ColorVertex, Vertex};

/// 子网格描述符
///
/// OBJ 文件中的每个对象对应一个子网格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset {
    /// 子网格ID（对象在文件中的序号）
    pub id: u32,

    /// 起始顶点索引
    pub vertex_start: u32,

    /// 顶点数量
    pub vertex_count: u32,

    /// 起始面索引（以三角形为单位）
    pub face_start: u32,

    /// 面数量（三角形数量）
    pub face_count: u32,
}

impl Subset {
    #[inline]
    pub fn new(
        id: u32,
        vertex_start: u32,
        vertex_count: u32,
        face_start: u32,
        face_count: u32,
    ) -> Self {
        Self {
            id,
            vertex_start,
            vertex_count,
            face_start,
            face_count,
        }
    }

    /// 索引起始位置（face_start * 3）
    #[inline]
    pub fn index_start(&self) -> u32 {
        self.face_start * 3
    }

    /// 索引数量（face_count * 3）
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.face_count * 3
    }
}

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn center(&self) -> [f32; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    /// 最长边
    pub fn max_extent(&self) -> f32 {
        (0..3)
            .map(|i| self.max[i] - self.min[i])
            .fold(0.0, f32::max)
    }
}

/// CPU侧网格数据
///
/// 加载器的输出，不包含GPU资源；渲染器只接收转换后的 [`ColorMesh`]。
#[derive(Debug, Clone)]
pub struct MeshData {
    /// 顶点数组
    pub vertices: Vec<Vertex>,

    /// 索引数组
    ///
    /// 每3个索引定义一个三角形。使用32位索引以支持超过65535个顶点的模型。
    pub indices: Vec<u32>,

    /// 子网格列表
    pub subsets: Vec<Subset>,

    /// 网格名称（可选）
    pub name: Option<String>,
}

impl MeshData {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            subsets: Vec::new(),
            name: None,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 验证网格数据的有效性
    ///
    /// 检查：
    /// - 索引数量是3的倍数
    /// - 所有索引都在有效范围内
    /// - 子网格描述符的范围有效
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "索引数量必须是3的倍数，当前为: {}",
                self.indices.len()
            ));
        }

        let vertex_count = self.vertices.len() as u32;
        if let Some((i, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, &index)| index >= vertex_count)
        {
            return Err(format!(
                "索引 {} 处的值 {} 超出顶点范围 (共 {} 个顶点)",
                i, index, vertex_count
            ));
        }

        let triangle_count = self.triangle_count() as u32;
        for (i, subset) in self.subsets.iter().enumerate() {
            if subset.vertex_start + subset.vertex_count > vertex_count {
                return Err(format!(
                    "子网格 {} 的顶点范围超出边界: start={}, count={}, total={}",
                    i, subset.vertex_start, subset.vertex_count, vertex_count
                ));
            }
            if subset.face_start + subset.face_count > triangle_count {
                return Err(format!(
                    "子网格 {} 的面范围超出边界: start={}, count={}, total={}",
                    i, subset.face_start, subset.face_count, triangle_count
                ));
            }
        }

        Ok(())
    }

    /// 计算包围盒，空网格返回 `None`
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?;
        let mut bounds = Bounds {
            min: first.position,
            max: first.position,
        };
        for v in &self.vertices[1..] {
            for i in 0..3 {
                bounds.min[i] = bounds.min[i].min(v.position[i]);
                bounds.max[i] = bounds.max[i].max(v.position[i]);
            }
        }
        Some(bounds)
    }

    /// 转换为可直接上传的彩色网格
    ///
    /// 模型被平移到原点并等比缩放，最长边为 1（与立方体同尺寸）。
    /// 顶点颜色取 `0.5 * (n + 1)`，与球体一致。
    pub fn to_color_mesh(&self) -> ColorMesh<u32> {
        let (center, scale) = match self.bounds() {
            Some(b) if b.max_extent() > f32::EPSILON => (b.center(), 1.0 / b.max_extent()),
            Some(b) => (b.center(), 1.0),
            None => ([0.0; 3], 1.0),
        };

        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let position = [
                    (v.position[0] - center[0]) * scale,
                    (v.position[1] - center[1]) * scale,
                    (v.position[2] - center[2]) * scale,
                ];
                let n = v.normal;
                let color = [0.5 * (n[0] + 1.0), 0.5 * (n[1] + 1.0), 0.5 * (n[2] + 1.0)];
                ColorVertex::new(position, color, n)
            })
            .collect();

        ColorMesh {
            vertices,
            indices: self.indices.clone(),
        }
    }
}

impl Default for MeshData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_mesh() -> MeshData {
        let mut mesh = MeshData::with_name("Triangle");
        mesh.vertices.push(Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 0.0]));
        mesh.vertices.push(Vertex::new([4.0, 0.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0]));
        mesh.vertices.push(Vertex::new([0.0, 2.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0]));
        mesh.indices.extend_from_slice(&[0, 1, 2]);
        mesh
    }

    #[test]
    fn test_subset_index_helpers() {
        let subset = Subset::new(0, 0, 100, 10, 20);

        assert_eq!(subset.index_start(), 30);
        assert_eq!(subset.index_count(), 60);
    }

    #[test]
    fn test_mesh_data_counts() {
        let mesh = triangle_mesh();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.name.as_deref(), Some("Triangle"));
    }

    #[test]
    fn test_mesh_data_validation() {
        let mut mesh = triangle_mesh();
        assert!(mesh.validate().is_ok());

        mesh.indices.push(0);
        assert!(mesh.validate().is_err());

        mesh.indices.extend_from_slice(&[1, 5]);
        let err = mesh.validate().unwrap_err();
        assert!(err.contains("超出顶点范围"));
    }

    #[test]
    fn test_subset_out_of_range() {
        let mut mesh = triangle_mesh();
        mesh.subsets.push(Subset::new(0, 0, 3, 0, 2));
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_bounds() {
        let bounds = triangle_mesh().bounds().unwrap();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [4.0, 2.0, 0.0]);
        assert_eq!(bounds.max_extent(), 4.0);
        assert!(MeshData::new().bounds().is_none());
    }

    #[test]
    fn test_to_color_mesh_fits_unit_cube() {
        let color = triangle_mesh().to_color_mesh();

        assert_eq!(color.vertices.len(), 3);
        assert_eq!(color.indices, vec![0, 1, 2]);
        for v in &color.vertices {
            for i in 0..3 {
                assert!(v.position[i] >= -0.5 - 1e-6 && v.position[i] <= 0.5 + 1e-6);
            }
        }
        // 最长边 (x) 缩放到 1
        assert_relative_eq!(color.vertices[1].position[0] - color.vertices[0].position[0], 1.0);
        // 法线 (0,0,-1) 映射为颜色 (0.5,0.5,0)
        assert_eq!(color.vertices[0].color, [0.5, 0.5, 0.0]);
    }
}
