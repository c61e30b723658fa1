use super::{ActionError, Step};
use crate::pipeline::RunCtx;
use std::borrow::Cow;
use std::time::Duration;

/// 固定时长的等待步骤。
///
/// 用途
/// - 在界面切换、弹窗出现、动画过渡等场景插入时间缓冲，避免立刻截图导致误判。
///
/// 注意
/// - 等待期间每 100ms 检查一次取消标记，被取消时返回 `ActionError::Cancelled`。
pub struct SleepMs(pub u64);

impl Step for SleepMs {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        ctx.sleep(Duration::from_millis(self.0))
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("Sleep({}ms)", self.0))
    }
}
