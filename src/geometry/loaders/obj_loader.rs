/// OBJ 文件加载器
///
/// 使用 tobj crate 加载 Wavefront OBJ 格式的3D模型。
/// 支持顶点位置、法线、纹理坐标，缺失的法线按面法线重建。
use super::MeshLoader;
use crate::core::error::{DemoError, MeshFault, Result};
use crate::geometry::mesh::{MeshData, Subset};
use crate::geometry::vertex::Vertex;
use std::io::Cursor;
use std::path::Path;

/// OBJ 格式加载器
///
/// - 自动三角化
/// - 单一索引（位置/法线/UV 共用一套索引）
/// - UV 坐标翻转（V轴：1.0 - v）
/// - 忽略材质文件
pub struct ObjLoader;

impl ObjLoader {
    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        }
    }

    /// 把 tobj 的模型列表合并为一个 `MeshData`
    fn build_mesh(models: &[tobj::Model], name: &str) -> Result<MeshData> {
        if models.is_empty() {
            return Err(DemoError::mesh(name, MeshFault::InvalidGeometry, "OBJ 文件不包含任何模型"));
        }

        let mut mesh_data = MeshData::with_name(name);
        let mut missing_normals = false;

        for (mesh_idx, model) in models.iter().enumerate() {
            let mesh = &model.mesh;
            let positions = &mesh.positions;
            let normals = &mesh.normals;
            let texcoords = &mesh.texcoords;

            if positions.len() % 3 != 0 {
                return Err(DemoError::mesh(
                    name,
                    MeshFault::InvalidGeometry,
                    format!("顶点位置数据不完整: {} 个浮点数", positions.len()),
                ));
            }

            let vertex_start = mesh_data.vertices.len() as u32;
            let face_start = mesh_data.triangle_count() as u32;
            let vertex_count = positions.len() / 3;

            if normals.len() < vertex_count * 3 {
                missing_normals = true;
            }

            for i in 0..vertex_count {
                let position = [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];

                let normal = if normals.len() >= (i + 1) * 3 {
                    [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]]
                } else {
                    [0.0, 0.0, 0.0]
                };

                let texcoord = if texcoords.len() >= (i + 1) * 2 {
                    [texcoords[i * 2], 1.0 - texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };

                mesh_data.vertices.push(Vertex::new(position, normal, texcoord));
            }

            mesh_data
                .indices
                .extend(mesh.indices.iter().map(|&index| vertex_start + index));

            mesh_data.subsets.push(Subset::new(
                mesh_idx as u32,
                vertex_start,
                vertex_count as u32,
                face_start,
                (mesh.indices.len() / 3) as u32,
            ));
        }

        mesh_data
            .validate()
            .map_err(|reason| DemoError::mesh(name, MeshFault::InvalidGeometry, reason))?;

        if missing_normals {
            tracing::info!("OBJ 文件缺少法线数据，正在重建...");
            reconstruct_normals(&mut mesh_data.vertices, &mesh_data.indices);
        }

        tracing::info!(
            "成功加载 OBJ 文件: {} 个顶点, {} 个三角形, {} 个子网格",
            mesh_data.vertex_count(),
            mesh_data.triangle_count(),
            mesh_data.subsets.len()
        );

        Ok(mesh_data)
    }
}

impl MeshLoader for ObjLoader {
    fn load_from_file(path: &Path) -> Result<MeshData> {
        if !path.exists() {
            return Err(DemoError::mesh(path.display().to_string(), MeshFault::NotFound, ""));
        }

        let (models, _materials) = tobj::load_obj(path, &Self::load_options())
            .map_err(|e| DemoError::mesh(path.display().to_string(), MeshFault::Parse, e.to_string()))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unnamed");

        Self::build_mesh(&models, name)
    }

    fn load_from_memory(data: &[u8]) -> Result<MeshData> {
        let mut reader = Cursor::new(data);
        let (models, _materials) =
            tobj::load_obj_buf(&mut reader, &Self::load_options(), |_| {
                Err(tobj::LoadError::OpenFileFailed)
            })
            .map_err(|e| DemoError::mesh("<memory>", MeshFault::Parse, e.to_string()))?;

        Self::build_mesh(&models, "<memory>")
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["obj"]
    }
}

/// 按面法线重建顶点法线
///
/// 共享顶点的法线取相邻面法线（按面积加权）的平均值。
fn reconstruct_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accum = vec![[0.0f32; 3]; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = vertices[a].position;
        let pb = vertices[b].position;
        let pc = vertices[c].position;

        let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        let face = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];

        for &i in &[a, b, c] {
            for k in 0..3 {
                accum[i][k] += face[k];
            }
        }
    }

    for (vertex, n) in vertices.iter_mut().zip(accum) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        vertex.normal = if len > f32::EPSILON {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD_OBJ: &str = "\
o Quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ObjLoader::supported_extensions(), &["obj"]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ObjLoader::load_from_file(Path::new("nonexistent.obj"));
        assert!(matches!(
            result,
            Err(DemoError::MeshLoad { fault: MeshFault::NotFound, .. })
        ));
    }

    #[test]
    fn test_load_from_memory_triangulates() {
        let mesh = ObjLoader::load_from_memory(QUAD_OBJ.as_bytes()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.subsets.len(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_missing_normals_are_rebuilt() {
        let mesh = ObjLoader::load_from_memory(QUAD_OBJ.as_bytes()).unwrap();

        for v in &mesh.vertices {
            assert_relative_eq!(v.normal[0], 0.0);
            assert_relative_eq!(v.normal[1], 0.0);
            assert_relative_eq!(v.normal[2], 1.0);
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(ObjLoader::load_from_memory(b"").is_err());
    }
}
