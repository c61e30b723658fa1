use crate::pipeline::RunCtx;
use std::borrow::Cow;
use thiserror::Error;

/// 单个动作的统一接口。
///
/// 每个动作在给定上下文中执行一次原子操作（找图点击、按键、等待……）。
/// - 动作自行处理需要的重试/等待，在预算耗尽后返回错误。
/// - 被取消时必须返回 `ActionError::Cancelled`，不得吞掉。
pub trait Step {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError>;

    /// 日志与报告中使用的名称。
    fn label(&self) -> Cow<'static, str>;
}

/// 动作失败的原因。
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("未找到模板 {template}（最高分 {best:.3}，阈值 {threshold:.2}，共 {attempts} 次）")]
    NotFound {
        template: String,
        best: f64,
        threshold: f64,
        attempts: u32,
    },
    #[error("模板不可用：{0:#}")]
    Asset(anyhow::Error),
    #[error("截图失败：{0:#}")]
    Capture(anyhow::Error),
    #[error("输入注入失败：{0:#}")]
    Input(anyhow::Error),
    #[error("AI 分析失败：{0:#}")]
    Classifier(anyhow::Error),
    #[error("{0}")]
    Skip(String),
    #[error("已取消")]
    Cancelled,
}

impl ActionError {
    /// 是否值得在重试预算内再试一次。
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ActionError::NotFound { .. } | ActionError::Capture(_) | ActionError::Classifier(_)
        )
    }
}

/// 步骤中可以出现的全部动作。
pub enum Action {
    MatchAndClick(MatchAndClick),
    ClickAt(ClickWindowPos),
    PressKey(PressKey),
    KeySequence(KeySequence),
    AiCheck(AiCheck),
    Sleep(SleepMs),
    Skip(SkipStep),
}

impl Action {
    fn step(&self) -> &dyn Step {
        match self {
            Action::MatchAndClick(s) => s,
            Action::ClickAt(s) => s,
            Action::PressKey(s) => s,
            Action::KeySequence(s) => s,
            Action::AiCheck(s) => s,
            Action::Sleep(s) => s,
            Action::Skip(s) => s,
        }
    }

    pub fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        self.step().run(ctx)
    }

    pub fn label(&self) -> Cow<'static, str> {
        self.step().label()
    }

    /// 动作（含嵌套动作）引用的模板文件名及其是否带备用坐标。
    pub fn templates(&self) -> Vec<(&'static str, bool)> {
        match self {
            Action::MatchAndClick(m) => vec![(m.template, m.fallback.is_some())],
            Action::AiCheck(check) => check.then.iter().flat_map(Action::templates).collect(),
            Action::ClickAt(_)
            | Action::PressKey(_)
            | Action::KeySequence(_)
            | Action::Sleep(_)
            | Action::Skip(_) => Vec::new(),
        }
    }

    pub fn uses_ai(&self) -> bool {
        matches!(self, Action::AiCheck(_))
    }
}

macro_rules! impl_from_step {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Action {
            fn from(step: $ty) -> Self {
                Action::$variant(step)
            }
        })*
    };
}

impl_from_step! {
    MatchAndClick => MatchAndClick,
    ClickWindowPos => ClickAt,
    PressKey => PressKey,
    KeySequence => KeySequence,
    AiCheck => AiCheck,
    SleepMs => Sleep,
    SkipStep => Skip,
}

pub mod ai_check;
pub mod click_window_pos;
pub mod key_sequence;
pub mod match_and_click;
pub mod press_key;
pub mod retry;
pub mod skip;
pub mod sleep_ms;

pub use ai_check::{AiCheck, Expectation};
pub use click_window_pos::{ClickWindowPos, WindowPos};
pub use key_sequence::KeySequence;
pub use match_and_click::MatchAndClick;
pub use press_key::PressKey;
pub use retry::with_retry;
pub use skip::SkipStep;
pub use sleep_ms::SleepMs;
