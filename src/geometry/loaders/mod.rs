/// 模型加载器模块
///
/// 提供统一的模型加载接口。目前只支持 Wavefront OBJ（使用 tobj crate）。
use crate::core::error::{DemoError, MeshFault, Result};
use crate::geometry::mesh::MeshData;
use std::path::Path;

pub mod obj_loader;

pub use obj_loader::ObjLoader;

/// 网格加载器 trait
///
/// 加载器是无状态的，返回 CPU 侧的 `MeshData`，不涉及 GPU 资源。
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件不存在或无法读取
    /// - 文件格式错误或损坏
    /// - 数据验证失败
    fn load_from_file(path: &Path) -> Result<MeshData>;

    /// 从内存中的文件内容加载网格
    fn load_from_memory(data: &[u8]) -> Result<MeshData>;

    /// 支持的文件扩展名列表（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器
pub fn load_mesh(path: &Path) -> Result<MeshData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| DemoError::mesh(path.display().to_string(), MeshFault::UnsupportedFormat, "无法确定文件扩展名"))?;

    if ObjLoader::supported_extensions().contains(&extension.as_str()) {
        ObjLoader::load_from_file(path)
    } else {
        Err(DemoError::mesh(
            path.display().to_string(),
            MeshFault::UnsupportedFormat,
            format!("没有 .{} 的加载器", extension),
        ))
    }
}
