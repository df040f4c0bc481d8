//! 取消令牌
//!
//! 用显式的令牌代替线程中断：所有循环边界和阻塞等待前后
//! 都轮询令牌，触发后以 `Cancelled` 信号退出，与普通故障
//! 区分开。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{TranslateError, TranslateResult};

/// 运行范围的取消令牌，克隆共享同一状态
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发取消，幂等
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// 轮询点：已取消时返回 `Cancelled` 错误
    pub fn check(&self) -> TranslateResult<()> {
        if self.is_cancelled() {
            Err(TranslateError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation_state() {
        let token = CancelToken::new();
        let clone = token.clone();

        assert!(token.check().is_ok());

        clone.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(TranslateError::Cancelled)));
    }
}
