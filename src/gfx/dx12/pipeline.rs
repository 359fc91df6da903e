//! 根签名与管线状态对象
//!
//! 根签名只有一个可选的根 CBV（b0）；管线状态按场景的 [`PipelineDesc`]
//! 配置输入布局和深度测试，光栅化固定为实心填充、背面剔除。

use std::mem::ManuallyDrop;

use windows::core::s;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use super::context::{BACK_BUFFER_FORMAT, DEPTH_FORMAT};
use crate::core::error::{DemoError, Result};
use crate::gfx::compiler::{compile_hlsl, load_source};
use crate::scene::{PipelineDesc, VertexLayout};

/// 编译完成的管线
pub struct Dx12Pipeline {
    pub root_signature: ID3D12RootSignature,
    pub pso: ID3D12PipelineState,
}

impl Dx12Pipeline {
    pub fn new(device: &ID3D12Device, desc: &PipelineDesc) -> Result<Self> {
        let root_signature = create_root_signature(device, desc.constants)?;

        let (name, source) = load_source(&desc.shader)?;
        let vs = compile_hlsl(&name, &source, desc.vs_entry, "vs_5_0", &[])?;
        let ps = compile_hlsl(&name, &source, desc.ps_entry, "ps_5_0", &[])?;

        let input_elements = input_elements(desc.layout);

        unsafe {
            let mut pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
                pRootSignature: ManuallyDrop::new(Some(root_signature.clone())),
                VS: D3D12_SHADER_BYTECODE {
                    pShaderBytecode: vs.GetBufferPointer(),
                    BytecodeLength: vs.GetBufferSize(),
                },
                PS: D3D12_SHADER_BYTECODE {
                    pShaderBytecode: ps.GetBufferPointer(),
                    BytecodeLength: ps.GetBufferSize(),
                },
                BlendState: default_blend(),
                SampleMask: u32::MAX,
                RasterizerState: D3D12_RASTERIZER_DESC {
                    FillMode: D3D12_FILL_MODE_SOLID,
                    CullMode: D3D12_CULL_MODE_BACK,
                    DepthClipEnable: true.into(),
                    ..Default::default()
                },
                DepthStencilState: depth_state(desc.depth),
                InputLayout: D3D12_INPUT_LAYOUT_DESC {
                    pInputElementDescs: input_elements.as_ptr(),
                    NumElements: input_elements.len() as u32,
                },
                PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
                NumRenderTargets: 1,
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
                ..Default::default()
            };
            pso_desc.RTVFormats[0] = BACK_BUFFER_FORMAT;
            if desc.depth {
                pso_desc.DSVFormat = DEPTH_FORMAT;
            }

            let pso: windows::core::Result<ID3D12PipelineState> = device.CreateGraphicsPipelineState(&pso_desc);
            // 释放描述结构中多出的一份引用
            ManuallyDrop::drop(&mut pso_desc.pRootSignature);

            let pso = pso.map_err(|e| {
                DemoError::ResourceCreation(format!("Failed to create pipeline state for {}: {:?}", name, e))
            })?;

            Ok(Self { root_signature, pso })
        }
    }
}

/// 根签名：`with_constants` 时包含 b0 根 CBV
pub fn create_root_signature(device: &ID3D12Device, with_constants: bool) -> Result<ID3D12RootSignature> {
    let root_parameters = [D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            Descriptor: D3D12_ROOT_DESCRIPTOR {
                ShaderRegister: 0,
                RegisterSpace: 0,
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_ALL,
    }];
    let parameter_count = if with_constants { root_parameters.len() } else { 0 };

    let root_desc = D3D12_ROOT_SIGNATURE_DESC {
        NumParameters: parameter_count as u32,
        pParameters: if with_constants { root_parameters.as_ptr() } else { std::ptr::null() },
        NumStaticSamplers: 0,
        pStaticSamplers: std::ptr::null(),
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT
            | D3D12_ROOT_SIGNATURE_FLAG_DENY_HULL_SHADER_ROOT_ACCESS
            | D3D12_ROOT_SIGNATURE_FLAG_DENY_DOMAIN_SHADER_ROOT_ACCESS
            | D3D12_ROOT_SIGNATURE_FLAG_DENY_GEOMETRY_SHADER_ROOT_ACCESS,
    };

    unsafe {
        let mut signature = None;
        let mut error = None;
        if let Err(e) = D3D12SerializeRootSignature(&root_desc, D3D_ROOT_SIGNATURE_VERSION_1, &mut signature, Some(&mut error)) {
            let log = error
                .map(|blob: ID3DBlob| {
                    String::from_utf8_lossy(crate::gfx::compiler::blob_bytes(&blob)).into_owned()
                })
                .unwrap_or_default();
            return Err(DemoError::ResourceCreation(format!(
                "Failed to serialize root signature: {:?} {}",
                e, log
            )));
        }
        let signature: ID3DBlob = signature
            .ok_or_else(|| DemoError::ResourceCreation("Root signature blob is null".to_string()))?;

        device
            .CreateRootSignature(
                0,
                std::slice::from_raw_parts(signature.GetBufferPointer() as _, signature.GetBufferSize()),
            )
            .map_err(|e| DemoError::ResourceCreation(format!("Failed to create root signature: {:?}", e)))
    }
}

fn element(semantic: windows::core::PCSTR, offset: u32) -> D3D12_INPUT_ELEMENT_DESC {
    D3D12_INPUT_ELEMENT_DESC {
        SemanticName: semantic,
        SemanticIndex: 0,
        Format: DXGI_FORMAT_R32G32B32_FLOAT,
        InputSlot: 0,
        AlignedByteOffset: offset,
        InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
        InstanceDataStepRate: 0,
    }
}

/// 顶点布局对应的输入元素
pub fn input_elements(layout: VertexLayout) -> Vec<D3D12_INPUT_ELEMENT_DESC> {
    match layout {
        VertexLayout::PositionColor => vec![element(s!("POSITION"), 0), element(s!("COLOR"), 12)],
        VertexLayout::PositionColorNormal => vec![
            element(s!("POSITION"), 0),
            element(s!("COLOR"), 12),
            element(s!("NORMAL"), 24),
        ],
    }
}

fn default_blend() -> D3D12_BLEND_DESC {
    let target = D3D12_RENDER_TARGET_BLEND_DESC {
        BlendEnable: false.into(),
        LogicOpEnable: false.into(),
        SrcBlend: D3D12_BLEND_ONE,
        DestBlend: D3D12_BLEND_ZERO,
        BlendOp: D3D12_BLEND_OP_ADD,
        SrcBlendAlpha: D3D12_BLEND_ONE,
        DestBlendAlpha: D3D12_BLEND_ZERO,
        BlendOpAlpha: D3D12_BLEND_OP_ADD,
        LogicOp: D3D12_LOGIC_OP_NOOP,
        RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
    };
    D3D12_BLEND_DESC {
        AlphaToCoverageEnable: false.into(),
        IndependentBlendEnable: false.into(),
        RenderTarget: [target; 8],
    }
}

fn depth_state(enabled: bool) -> D3D12_DEPTH_STENCIL_DESC {
    if !enabled {
        return D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: false.into(),
            StencilEnable: false.into(),
            ..Default::default()
        };
    }
    D3D12_DEPTH_STENCIL_DESC {
        DepthEnable: true.into(),
        DepthWriteMask: D3D12_DEPTH_WRITE_MASK_ALL,
        DepthFunc: D3D12_COMPARISON_FUNC_LESS,
        StencilEnable: false.into(),
        StencilReadMask: 0xFF,
        StencilWriteMask: 0xFF,
        FrontFace: D3D12_DEPTH_STENCILOP_DESC::default(),
        BackFace: D3D12_DEPTH_STENCILOP_DESC::default(),
    }
}
