//! 节拍控制
//!
//! 限流等待、批次间和语言组间的冷却都经由 `Pacer` 抽象，
//! 测试注入无等待的实现即可摆脱真实时钟。

use std::time::Duration;

/// 可注入的延时依赖
pub trait Pacer: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// 真实时钟：阻塞当前工作线程
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClockPacer;

impl Pacer for WallClockPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// 空实现，测试和试跑用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn pause(&self, _duration: Duration) {}
}
