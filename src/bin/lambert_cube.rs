//! Direct3D 12 旋转的 Lambert 立方体

use dx_learning::core::SampleKind;

fn main() -> anyhow::Result<()> {
    dx_learning::app::launch(Some(SampleKind::Lambert))
}
