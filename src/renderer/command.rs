//! 命令记录模块
//!
//! 场景不直接调用图形 API，而是把一帧的命令记录到 [`FrameRecorder`]。
//! 记录器总是以 PRESENT→RENDER_TARGET 转换开头、以 RENDER_TARGET→PRESENT
//! 转换结尾，后端再把得到的 [`CommandStream`] 逐条翻译为命令列表调用。
//!
//! # 一帧的命令流
//!
//! ```text
//! Transition(BackBuffer, Present → RenderTarget)
//! SetRenderTarget / ClearColor / ClearDepth
//! BindConstants / BindMesh / Draw | DrawIndexed
//! Transition(BackBuffer, RenderTarget → Present)
//! ```

use super::resource::ResourceState;
use crate::core::error::{DemoError, Result};

/// 上传到 GPU 的网格编号（场景 `meshes()` 中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// 命令流中引用的资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// 当前槽位的交换链缓冲区（既用于呈现，也是绘制目标）
    BackBuffer,
    /// 深度缓冲
    DepthBuffer,
}

/// 记录的命令
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// 资源状态转换
    Transition {
        resource: ResourceId,
        before: ResourceState,
        after: ResourceState,
    },
    /// 清除颜色缓冲
    ClearColor([f32; 4]),
    /// 清除深度缓冲
    ClearDepth(f32),
    /// 绑定渲染目标、视口和裁剪矩形
    SetRenderTarget { with_depth: bool },
    /// 绑定当前槽位的常量缓冲区区域
    BindConstants,
    /// 绑定顶点/索引缓冲区
    BindMesh(MeshId),
    /// 非索引绘制
    Draw { vertex_count: u32 },
    /// 索引绘制
    DrawIndexed { index_count: u32 },
}

impl RecordedCommand {
    /// 写入交换链缓冲区的命令
    fn writes_back_buffer(&self) -> bool {
        matches!(
            self,
            RecordedCommand::ClearColor(_)
                | RecordedCommand::Draw { .. }
                | RecordedCommand::DrawIndexed { .. }
        )
    }
}

/// 一帧的命令记录器
#[derive(Debug)]
pub struct FrameRecorder {
    commands: Vec<RecordedCommand>,
}

impl FrameRecorder {
    /// 开始记录，自动写入到渲染目标的转换
    pub fn begin() -> Self {
        Self {
            commands: vec![RecordedCommand::Transition {
                resource: ResourceId::BackBuffer,
                before: ResourceState::Present,
                after: ResourceState::RenderTarget,
            }],
        }
    }

    pub fn set_render_target(&mut self, with_depth: bool) -> &mut Self {
        self.commands.push(RecordedCommand::SetRenderTarget { with_depth });
        self
    }

    pub fn clear_color(&mut self, color: [f32; 4]) -> &mut Self {
        self.commands.push(RecordedCommand::ClearColor(color));
        self
    }

    pub fn clear_depth(&mut self, depth: f32) -> &mut Self {
        self.commands.push(RecordedCommand::ClearDepth(depth));
        self
    }

    pub fn bind_constants(&mut self) -> &mut Self {
        self.commands.push(RecordedCommand::BindConstants);
        self
    }

    pub fn bind_mesh(&mut self, mesh: MeshId) -> &mut Self {
        self.commands.push(RecordedCommand::BindMesh(mesh));
        self
    }

    pub fn draw(&mut self, vertex_count: u32) -> &mut Self {
        self.commands.push(RecordedCommand::Draw { vertex_count });
        self
    }

    pub fn draw_indexed(&mut self, index_count: u32) -> &mut Self {
        self.commands.push(RecordedCommand::DrawIndexed { index_count });
        self
    }

    /// 结束记录，追加回到呈现状态的转换
    pub fn finish(mut self) -> CommandStream {
        self.commands.push(RecordedCommand::Transition {
            resource: ResourceId::BackBuffer,
            before: ResourceState::RenderTarget,
            after: ResourceState::Present,
        });
        CommandStream {
            commands: self.commands,
        }
    }
}

/// 记录完成的命令流
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStream {
    commands: Vec<RecordedCommand>,
}

impl CommandStream {
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        validate_stream(&self.commands)
    }
}

/// 检查交换链缓冲区的状态转换
///
/// - 恰好一次 Present→RenderTarget，出现在任何 clear/draw 之前
/// - 恰好一次 RenderTarget→Present，之后不再有 clear/draw
/// - 每次转换的 `before` 与当前状态一致
pub fn validate_stream(commands: &[RecordedCommand]) -> Result<()> {
    let mut state = ResourceState::Present;
    let mut to_writable = 0usize;
    let mut to_present = 0usize;

    for (i, command) in commands.iter().enumerate() {
        match command {
            RecordedCommand::Transition {
                resource: ResourceId::BackBuffer,
                before,
                after,
            } => {
                if *before != state {
                    return Err(invalid(i, format!(
                        "转换前状态为 {:?}，实际状态为 {:?}",
                        before, state
                    )));
                }
                match after {
                    ResourceState::RenderTarget => to_writable += 1,
                    ResourceState::Present => to_present += 1,
                    _ => {}
                }
                state = *after;
            }
            cmd if cmd.writes_back_buffer() => {
                if !state.is_writable() {
                    return Err(invalid(i, format!("{:?} 写入了处于 {:?} 状态的缓冲区", cmd, state)));
                }
            }
            _ => {}
        }
    }

    if to_writable != 1 || to_present != 1 {
        return Err(DemoError::CommandExecution(format!(
            "交换链缓冲区转换次数错误: 到渲染目标 {} 次，到呈现 {} 次",
            to_writable, to_present
        )));
    }
    if state != ResourceState::Present {
        return Err(DemoError::CommandExecution(format!(
            "命令流结束时缓冲区处于 {:?} 状态",
            state
        )));
    }

    Ok(())
}

fn invalid(index: usize, reason: String) -> DemoError {
    DemoError::CommandExecution(format!("命令 {}: {}", index, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_frame() -> CommandStream {
        let mut recorder = FrameRecorder::begin();
        recorder
            .set_render_target(true)
            .clear_color([0.07, 0.1, 0.16, 1.0])
            .clear_depth(1.0)
            .bind_constants()
            .bind_mesh(MeshId(0))
            .draw_indexed(36);
        recorder.finish()
    }

    fn back_buffer(before: ResourceState, after: ResourceState) -> RecordedCommand {
        RecordedCommand::Transition {
            resource: ResourceId::BackBuffer,
            before,
            after,
        }
    }

    #[test]
    fn test_recorder_wraps_with_transitions() {
        let stream = cube_frame();
        let commands = stream.commands();

        assert_eq!(
            commands.first(),
            Some(&back_buffer(ResourceState::Present, ResourceState::RenderTarget))
        );
        assert_eq!(
            commands.last(),
            Some(&back_buffer(ResourceState::RenderTarget, ResourceState::Present))
        );
        assert!(stream.validate().is_ok());
    }

    #[test]
    fn test_empty_frame_is_valid() {
        assert!(FrameRecorder::begin().finish().validate().is_ok());
    }

    #[test]
    fn test_draw_after_present_is_rejected() {
        let mut commands = cube_frame().commands().to_vec();
        commands.push(RecordedCommand::Draw { vertex_count: 3 });
        assert!(validate_stream(&commands).is_err());
    }

    #[test]
    fn test_draw_before_transition_is_rejected() {
        let commands = vec![
            RecordedCommand::ClearColor([0.0; 4]),
            back_buffer(ResourceState::Present, ResourceState::RenderTarget),
            back_buffer(ResourceState::RenderTarget, ResourceState::Present),
        ];
        assert!(validate_stream(&commands).is_err());
    }

    #[test]
    fn test_missing_or_duplicate_transitions_are_rejected() {
        let missing_end = vec![
            back_buffer(ResourceState::Present, ResourceState::RenderTarget),
            RecordedCommand::Draw { vertex_count: 3 },
        ];
        assert!(validate_stream(&missing_end).is_err());

        let twice = vec![
            back_buffer(ResourceState::Present, ResourceState::RenderTarget),
            back_buffer(ResourceState::RenderTarget, ResourceState::Present),
            back_buffer(ResourceState::Present, ResourceState::RenderTarget),
            back_buffer(ResourceState::RenderTarget, ResourceState::Present),
        ];
        assert!(validate_stream(&twice).is_err());
    }

    #[test]
    fn test_mismatched_before_state_is_rejected() {
        let commands = vec![
            back_buffer(ResourceState::RenderTarget, ResourceState::Present),
        ];
        assert!(validate_stream(&commands).is_err());
    }

    #[test]
    fn test_depth_clear_does_not_touch_back_buffer() {
        let commands = vec![
            RecordedCommand::ClearDepth(1.0),
            back_buffer(ResourceState::Present, ResourceState::RenderTarget),
            back_buffer(ResourceState::RenderTarget, ResourceState::Present),
        ];
        assert!(validate_stream(&commands).is_ok());
    }
}
