//! Direct3D 12 PBR 演示（T/M/R/A/P/G/F 切换状态）

use dx_learning::core::SampleKind;

fn main() -> anyhow::Result<()> {
    dx_learning::app::launch(Some(SampleKind::Pbr))
}
