use super::{ActionError, Step};
use crate::input::KeyId;
use crate::pipeline::RunCtx;
use std::borrow::Cow;
use std::time::Duration;

/// 置前窗口后连续按同一个键 `times` 次，每次之后等待 `delay`。
pub struct PressKey {
    pub key: KeyId,
    pub times: u32,
    pub delay: Duration,
}

impl PressKey {
    /// 按一次，之后等待 0.3 秒。
    pub fn once(key: KeyId) -> Self {
        Self::repeat(key, 1, Duration::from_millis(300))
    }

    pub fn repeat(key: KeyId, times: u32, delay: Duration) -> Self {
        Self { key, times, delay }
    }

    /// 连按 `esc` 退回上一级界面。
    pub fn escape(times: u32, delay: Duration) -> Self {
        Self::repeat(KeyId::Escape, times, delay)
    }
}

impl Step for PressKey {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        ctx.activate();
        for _ in 0..self.times {
            ctx.press(self.key)?;
            ctx.sleep(self.delay)?;
        }
        Ok(())
    }

    fn label(&self) -> Cow<'static, str> {
        if self.times == 1 {
            Cow::Owned(format!("PressKey({})", self.key))
        } else {
            Cow::Owned(format!("PressKey({} x{})", self.key, self.times))
        }
    }
}
