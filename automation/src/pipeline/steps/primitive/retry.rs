use super::ActionError;
use crate::pipeline::RunCtx;
use std::time::Duration;

/// 在有限的预算内重复执行 `op`，只对暂时性错误（未找到、截图失败、AI 调用失败）重试。
///
/// 两次尝试之间的等待可被取消；最后一次的错误原样返回。
pub fn with_retry<T, F>(
    ctx: &mut RunCtx,
    label: &str,
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, ActionError>
where
    F: FnMut(&mut RunCtx, u32) -> Result<T, ActionError>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(ctx, attempt) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::debug!("[retry:{label}] attempt {attempt}/{attempts} failed: {err}");
                ctx.sleep(delay)?;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
