//! Direct3D 11 彩色三角形

use dx_learning::core::SampleKind;

fn main() -> anyhow::Result<()> {
    dx_learning::app::launch(Some(SampleKind::Dx11Triangle))
}
