use super::{Action, ActionError, Step, with_retry};
use crate::ai;
use crate::pipeline::RunCtx;
use std::borrow::Cow;
use std::time::Duration;

const AI_RETRY_DELAY: Duration = Duration::from_secs(2);

/// 如何解读模型的回答。
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expectation {
    /// 回答包含关键字（忽略大小写）时执行一次 `then`。
    Keyword(&'static str),
    /// 取回答中的第一个整数 n，执行 `then` n 次（不超过 `max`）；无法解析时按 `fallback` 次。
    Count { fallback: u32, max: u32 },
}

/// 截图交给 AI 判断，再根据回答决定是否/几次执行嵌套动作。
///
/// AI 调用失败在 `ai_attempts` 次内重试，仍失败则记录备注并跳过本检查，步骤继续。
/// 配置中关闭 AI 时同样跳过。
pub struct AiCheck {
    pub label: &'static str,
    pub prompt: &'static str,
    pub expect: Expectation,
    pub then: Vec<Action>,
}

impl AiCheck {
    /// 回答中出现 `keyword` 时执行一次 `then`。
    pub fn when(label: &'static str, prompt: &'static str, keyword: &'static str) -> Self {
        Self {
            label,
            prompt,
            expect: Expectation::Keyword(keyword),
            then: Vec::new(),
        }
    }

    /// 按回答中的数量重复执行 `then`。
    pub fn count(label: &'static str, prompt: &'static str, fallback: u32, max: u32) -> Self {
        Self {
            label,
            prompt,
            expect: Expectation::Count { fallback, max },
            then: Vec::new(),
        }
    }

    pub fn then(mut self, action: impl Into<Action>) -> Self {
        self.then.push(action.into());
        self
    }

    /// 根据回答求出 `then` 需要执行的次数。
    pub fn repetitions(&self, answer: &str) -> (u32, bool) {
        match self.expect {
            Expectation::Keyword(keyword) => (u32::from(ai::answer_contains(answer, keyword)), false),
            Expectation::Count { fallback, max } => match ai::first_number(answer) {
                Some(n) => (n.min(max), false),
                None => (fallback.min(max), true),
            },
        }
    }
}

impl Step for AiCheck {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        let config = ctx.config();
        let classifier = match ctx.classifier() {
            Some(c) if config.ai_enabled => c,
            _ => {
                ctx.note(format!("[{}] AI 未启用，跳过检查", self.label));
                return Ok(());
            }
        };

        let answer = with_retry(ctx, self.label, config.ai_attempts, AI_RETRY_DELAY, |ctx, _| {
            let frame = ctx.ensure_frame()?;
            classifier
                .classify(frame, self.prompt)
                .map_err(ActionError::Classifier)
        });
        let answer = match answer {
            Ok(answer) => answer,
            Err(err @ ActionError::Classifier(_)) | Err(err @ ActionError::Capture(_)) => {
                tracing::warn!("[{}] {err}", self.label);
                ctx.note(format!("[{}] {err}，已跳过检查", self.label));
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let (times, used_fallback) = self.repetitions(&answer);
        if used_fallback {
            ctx.note(format!(
                "[{}] 无法从回答中解析数量（{:?}），按 {times} 次处理",
                self.label,
                answer.trim()
            ));
        } else {
            ctx.note(format!("[{}] AI 回答 {:?} -> 执行 {times} 次", self.label, answer.trim()));
        }

        for _ in 0..times {
            for action in &self.then {
                action.run(ctx)?;
            }
        }
        Ok(())
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("AiCheck({})", self.label))
    }
}
