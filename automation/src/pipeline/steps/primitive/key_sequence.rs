use super::{ActionError, Step};
use crate::input::KeyId;
use crate::pipeline::RunCtx;
use std::borrow::Cow;
use std::time::Duration;

/// 固定节奏的按键回放：每个键之前重新置前窗口，键与键之间等待 `delay`，最后一个键之后不等待。
pub struct KeySequence {
    pub keys: Vec<KeyId>,
    pub delay: Duration,
}

impl KeySequence {
    pub fn new(keys: Vec<KeyId>, delay: Duration) -> Self {
        Self { keys, delay }
    }
}

impl Step for KeySequence {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        let total = self.keys.len();
        for (i, key) in self.keys.iter().enumerate() {
            ctx.check_cancel()?;
            ctx.activate();
            tracing::info!("key {}/{}: {}", i + 1, total, key);
            ctx.press(*key)?;
            if i + 1 < total {
                ctx.sleep(self.delay)?;
            }
        }
        Ok(())
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("KeySequence({} keys)", self.keys.len()))
    }
}
