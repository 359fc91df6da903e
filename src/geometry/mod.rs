/// 几何体模块
///
/// 示例使用的顶点格式、内置几何体以及模型加载。
///
/// # 模块结构
///
/// - `vertex`: 顶点数据结构定义
/// - `primitives`: 三角形、立方体、球体
/// - `mesh`: 导入模型的 CPU 侧数据
/// - `loaders`: 模型加载器
///
/// # 数据流
///
/// ```text
/// 内置几何体 ──────────────┐
///                          ↓
/// OBJ → ObjLoader → MeshData → ColorMesh → 上传到 GPU
/// ```

pub mod vertex;
pub mod primitives;
pub mod mesh;
pub mod loaders;

// 重新导出常用类型
pub use vertex::{ColorVertex, Dx11Vertex, PositionColorVertex, Vertex};
pub use primitives::ColorMesh;
pub use mesh::{MeshData, Subset};
