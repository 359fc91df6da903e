//! 通用启动器
//!
//! 示例类型来自 `config.toml` 的 `[sample] kind` 或 `--sample`，
//! 都没有时运行 PBR 演示。
//!
//! ```bash
//! cargo run -- --sample lambert
//! cargo run -- --sample dx11-triangle --warp
//! ```

fn main() -> anyhow::Result<()> {
    dx_learning::app::launch(None)
}
