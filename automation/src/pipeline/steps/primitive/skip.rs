use super::{ActionError, Step};
use crate::pipeline::RunCtx;
use std::borrow::Cow;

/// 显式跳过：保留步骤编号，但不做任何操作，报告中记为“已跳过”。
pub struct SkipStep(pub &'static str);

impl Step for SkipStep {
    fn run(&self, _ctx: &mut RunCtx) -> Result<(), ActionError> {
        Err(ActionError::Skip(self.0.to_string()))
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("Skip")
    }
}
