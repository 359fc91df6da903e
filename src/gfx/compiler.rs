//! 运行时 HLSL 编译（D3DCompile）
//!
//! 编译失败时错误中带上编译器输出的日志。Debug 构建附加
//! `D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION`。

use std::borrow::Cow;
use std::ffi::CString;

use tracing::debug;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::{ID3DBlob, D3D_SHADER_MACRO};

use crate::core::error::{DemoError, Result};
use crate::scene::ShaderSource;

/// 读取着色器源码，返回（名称，源码）
pub fn load_source(source: &ShaderSource) -> Result<(String, Cow<'static, str>)> {
    match source {
        ShaderSource::Embedded { name, source } => Ok((name.to_string(), Cow::Borrowed(*source))),
        ShaderSource::File(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                DemoError::ShaderCompilation(format!("Failed to read {}: {}", path.display(), e))
            })?;
            Ok((path.display().to_string(), Cow::Owned(text)))
        }
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|e| DemoError::ShaderCompilation(format!("Invalid shader string {:?}: {}", value, e)))
}

/// 编译一个着色器阶段
///
/// `defines` 为 `(名称, 值)` 列表。
pub fn compile_hlsl(
    name: &str,
    source: &str,
    entry: &str,
    target: &str,
    defines: &[(&str, &str)],
) -> Result<ID3DBlob> {
    let source_name = c_string(name)?;
    let entry_c = c_string(entry)?;
    let target_c = c_string(target)?;

    let define_strings = defines
        .iter()
        .map(|(k, v)| Ok((c_string(k)?, c_string(v)?)))
        .collect::<Result<Vec<_>>>()?;
    let mut macros: Vec<D3D_SHADER_MACRO> = define_strings
        .iter()
        .map(|(k, v)| D3D_SHADER_MACRO {
            Name: PCSTR(k.as_ptr() as *const u8),
            Definition: PCSTR(v.as_ptr() as *const u8),
        })
        .collect();
    macros.push(D3D_SHADER_MACRO::default());

    let flags = if cfg!(debug_assertions) {
        D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        0
    };

    let mut blob = None;
    let mut error_blob = None;

    unsafe {
        let result = D3DCompile(
            source.as_ptr() as _,
            source.len(),
            PCSTR(source_name.as_ptr() as *const u8),
            Some(macros.as_ptr()),
            None,
            PCSTR(entry_c.as_ptr() as *const u8),
            PCSTR(target_c.as_ptr() as *const u8),
            flags,
            0,
            &mut blob,
            Some(&mut error_blob),
        );

        if let Err(e) = result {
            let log = error_blob
                .map(|error: ID3DBlob| {
                    let bytes = std::slice::from_raw_parts(
                        error.GetBufferPointer() as *const u8,
                        error.GetBufferSize(),
                    );
                    String::from_utf8_lossy(bytes).into_owned()
                })
                .unwrap_or_else(|| format!("{:?}", e));
            return Err(DemoError::ShaderCompilation(format!(
                "{} ({} {}): {}",
                name, entry, target, log
            )));
        }
    }

    debug!(shader = name, entry, target, "Shader compiled");
    blob.ok_or_else(|| DemoError::ShaderCompilation(format!("{}: compiler returned no bytecode", name)))
}

/// 字节码视图
pub fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}
