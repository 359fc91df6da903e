/// Build script for dx_learning
///
/// # Shader Compilation Strategy:
/// - DX12 / DX11: HLSL is compiled at runtime via D3DCompile
/// - The triangle and Lambert shaders are embedded with include_str!,
///   the PBR shader is read from disk at startup
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=src/gfx/dx12/shaders/triangle.hlsl");
    println!("cargo:rerun-if-changed=src/gfx/dx12/shaders/lambert.hlsl");
    println!("cargo:rerun-if-changed=src/gfx/dx12/shaders/pbr.hlsl");
    println!("cargo:rerun-if-changed=src/gfx/dx11/shaders/triangle.hlsl");
}
