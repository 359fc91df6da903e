//! 动画计时
//!
//! 每帧由时钟读数推进。旋转使用可暂停的累加时间；光源轨道默认直接使用
//! 真实经过的秒数，暂停时仍继续运动。`pause_affects_light` 打开后，
//! 光源轨道改用自己的可暂停累加时间。

use std::time::Duration;

/// 一帧的动画输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSample {
    /// 自启动以来的秒数
    pub seconds: f32,
    /// 驱动模型旋转的累加时间
    pub rotation_time: f32,
    /// 光源轨道角（弧度，1 rad/s）
    pub orbit_angle: f32,
}

#[derive(Debug, Clone)]
pub struct AnimationTimer {
    last_tick: Duration,
    rotation_time: f32,
    light_time: f32,
    paused: bool,
    pause_affects_light: bool,
}

impl AnimationTimer {
    pub fn new(pause_affects_light: bool) -> Self {
        Self {
            last_tick: Duration::ZERO,
            rotation_time: 0.0,
            light_time: 0.0,
            paused: false,
            pause_affects_light,
        }
    }

    /// 推进到 `now`
    pub fn tick(&mut self, now: Duration) -> AnimationSample {
        let seconds = now.as_secs_f32();
        let dt = now.saturating_sub(self.last_tick).as_secs_f32();
        self.last_tick = now;

        if !self.paused {
            self.rotation_time += dt;
            self.light_time += dt;
        }

        let orbit_angle = if self.pause_affects_light {
            self.light_time
        } else {
            seconds
        };

        AnimationSample {
            seconds,
            rotation_time: self.rotation_time,
            orbit_angle,
        }
    }

    /// 切换暂停，返回切换后的状态
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause_affects_light(&self) -> bool {
        self.pause_affects_light
    }
}

impl Default for AnimationTimer {
    fn default() -> Self {
        Self::new(false)
    }
}
