//! 内嵌的 HLSL 源码
//!
//! 三角形与 Lambert 着色器编译进可执行文件；PBR 着色器在启动时从磁盘
//! 读取，这里同样内嵌一份用于测试和检查。

/// D3D12 三角形（`VSMain` / `PSMain`）
pub const DX12_TRIANGLE: &str = include_str!("dx12/shaders/triangle.hlsl");

/// D3D12 Lambert 立方体（`VSMain` / `PSMain`）
pub const DX12_LAMBERT: &str = include_str!("dx12/shaders/lambert.hlsl");

/// D3D12 PBR 演示（`VSMain` / `PSMain`）
pub const DX12_PBR: &str = include_str!("dx12/shaders/pbr.hlsl");

/// D3D11 三角形（`main`，用 `VERTEX_SHADER` 宏区分阶段）
pub const DX11_TRIANGLE: &str = include_str!("dx11/shaders/triangle.hlsl");

/// 依次列出 `cbuffer` 块中声明的字段名
pub fn cbuffer_fields(source: &str) -> Vec<&str> {
    let Some(start) = source.find("cbuffer") else {
        return Vec::new();
    };
    let body = &source[start..];
    let (Some(open), Some(close)) = (body.find('{'), body.find('}')) else {
        return Vec::new();
    };

    body[open + 1..close]
        .split(';')
        .filter_map(|decl| decl.split_whitespace().last())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_present() {
        for source in [DX12_TRIANGLE, DX12_LAMBERT, DX12_PBR] {
            assert!(source.contains("VSMain"));
            assert!(source.contains("PSMain"));
        }
        assert!(DX11_TRIANGLE.contains("main("));
        assert!(DX11_TRIANGLE.contains("VERTEX_SHADER"));
    }

    #[test]
    fn test_lambert_cbuffer_order() {
        assert_eq!(cbuffer_fields(DX12_LAMBERT), ["mvp", "world", "lightDir", "_pad0"]);
    }

    #[test]
    fn test_pbr_cbuffer_order() {
        assert_eq!(
            cbuffer_fields(DX12_PBR),
            [
                "mvp", "world",
                "lightDir", "ambient",
                "mode", "_pad1",
                "viewPos", "shininess",
                "specIntensity", "_pad2",
                "baseColor", "metallic",
                "roughness", "ao", "_pad3",
                "lightPos", "lightIntensity",
                "lightColor", "_pad4",
            ]
        );
    }

    #[test]
    fn test_triangle_has_no_cbuffer() {
        assert!(cbuffer_fields(DX12_TRIANGLE).is_empty());
    }
}
