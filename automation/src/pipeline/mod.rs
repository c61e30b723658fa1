use crate::config::RunConfig;
use anyhow::{Context, Result, anyhow};
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;

mod context;
mod evening;
mod fleet;
mod morning;
mod preflight;
mod report;
mod steps;
#[cfg(test)]
pub(crate) mod testing;
mod value;

pub use context::*;
pub use preflight::preflight;
pub use report::*;
pub use steps::*;
pub use value::*;

/// 可按名称选择的流程。
pub const ROUTINE_NAMES: [&str; 4] = ["morning", "evening", "fleet-first", "fleet-second"];

/// 根据名字选择流程，便于扩展不同场景。
pub fn resolve_routine(name: &str, config: &RunConfig) -> Result<Routine> {
    match name {
        "morning" => Ok(morning::morning_routine(config)),
        "evening" => Ok(evening::evening_routine(config)),
        "fleet-first" | "fleet1" => fleet::fleet_first(config),
        "fleet-second" | "fleet2" => fleet::fleet_second(config),
        other => Err(anyhow!(
            "未知流程：{other}（可选：{}）",
            ROUTINE_NAMES.join(", ")
        )),
    }
}

/// 命令行给出的步骤编号不合法。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("步骤编号 {index} 无效：[{routine}] 共 {count} 步，编号从 1 开始")]
    OutOfRange {
        index: usize,
        routine: String,
        count: usize,
    },
}

/// 流程中的一个步骤：若干动作按顺序执行，任一动作失败即结束该步骤。
pub struct RoutineStep {
    pub label: &'static str,
    pub actions: Vec<Action>,
}

impl RoutineStep {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            actions: Vec::new(),
        }
    }

    /// 追加一个动作，返回自身以便链式调用。
    pub fn then(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn then_all(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        for action in &self.actions {
            tracing::debug!(step = self.label, action = %action.label(), "run action");
            action.run(ctx)?;
        }
        Ok(())
    }
}

/// 流程：由若干 `RoutineStep` 组成，按顺序执行。
pub struct Routine {
    pub name: &'static str,
    pub title: &'static str,
    pub steps: Vec<RoutineStep>,
    /// 每个步骤结束后的停顿。
    pub settle: Option<Duration>,
    /// 步骤失败后用于回到主界面的动作。
    pub recovery: Vec<Action>,
}

impl Routine {
    pub fn new(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            steps: Vec::new(),
            settle: None,
            recovery: Vec::new(),
        }
    }

    /// 追加一个步骤，返回自身以便链式调用。
    pub fn step(mut self, step: RoutineStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = Some(settle);
        self
    }

    pub fn with_recovery(mut self, action: impl Into<Action>) -> Self {
        self.recovery.push(action.into());
        self
    }

    /// 将 1 起始的步骤编号换算为下标；为空时选择全部步骤。
    pub fn select(&self, indices: &[usize]) -> Result<Vec<usize>, SelectionError> {
        if indices.is_empty() {
            return Ok((0..self.steps.len()).collect());
        }
        indices
            .iter()
            .map(|&index| {
                if index == 0 || index > self.steps.len() {
                    Err(SelectionError::OutOfRange {
                        index,
                        routine: self.name.to_string(),
                        count: self.steps.len(),
                    })
                } else {
                    Ok(index - 1)
                }
            })
            .collect()
    }

    /// 编号步骤列表，用于 `--list` 与用法提示。
    pub fn describe(&self) -> String {
        let mut out = format!("{} [{}]", self.title, self.name);
        for (i, step) in self.steps.iter().enumerate() {
            let _ = write!(out, "\n  {}. {}", i + 1, step.label);
        }
        out
    }

    fn selected<'r>(&'r self, selection: &'r [usize]) -> impl Iterator<Item = &'r RoutineStep> {
        selection.iter().filter_map(|&i| self.steps.get(i))
    }

    /// 选中步骤是否包含 AI 检查。
    pub fn uses_ai(&self, selection: &[usize]) -> bool {
        self.selected(selection)
            .flat_map(|s| s.actions.iter())
            .any(Action::uses_ai)
    }

    /// 选中步骤引用的模板（去重），以及是否带备用坐标。
    pub fn templates(&self, selection: &[usize]) -> Vec<(&'static str, bool)> {
        let mut out: Vec<(&'static str, bool)> = Vec::new();
        for (name, fallback) in self
            .selected(selection)
            .flat_map(|s| s.actions.iter())
            .flat_map(Action::templates)
        {
            match out.iter_mut().find(|(n, _)| *n == name) {
                // 只要有一处没有备用坐标，就按必需处理
                Some(entry) => entry.1 &= fallback,
                None => out.push((name, fallback)),
            }
        }
        out
    }

    /// 倒计时 → 绑定窗口 → 依次执行选中的步骤。
    ///
    /// 找不到窗口返回错误；步骤失败只写入报告，随后执行恢复动作并继续下一步。
    pub fn execute(&self, selection: &[usize], ctx: &mut RunCtx) -> Result<RunReport> {
        let mut report = RunReport::new(self.name);
        println!("运行流程 [{}] {}", self.name, self.title);

        if !countdown(ctx) {
            report.cancelled = true;
            return Ok(report);
        }

        let geometry = ctx.attach().context("查找游戏窗口失败")?;
        tracing::info!(
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height,
            "game window attached"
        );
        ctx.activate();

        for &i in selection {
            if ctx.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let Some(step) = self.steps.get(i) else {
                anyhow::bail!("步骤下标越界：{i}");
            };
            println!("[step {:02}] {}", i + 1, step.label);

            let outcome = match step.run(ctx) {
                Ok(()) => StepOutcome::Succeeded,
                Err(ActionError::Skip(reason)) => {
                    tracing::info!(step = step.label, "skipped: {reason}");
                    StepOutcome::Skipped(reason)
                }
                Err(ActionError::Cancelled) => {
                    report.cancelled = true;
                    StepOutcome::Failed(ActionError::Cancelled.to_string())
                }
                Err(err) => {
                    tracing::error!(step = step.label, "step failed: {err}");
                    if let Err(ActionError::Cancelled) = self.recover(ctx) {
                        report.cancelled = true;
                    }
                    StepOutcome::Failed(err.to_string())
                }
            };

            report.records.push(StepRecord {
                index: i + 1,
                label: step.label.to_string(),
                outcome,
                notes: ctx.take_notes(),
            });
            if report.cancelled {
                break;
            }

            if let Some(settle) = self.settle {
                if ctx.sleep(settle).is_err() {
                    report.cancelled = true;
                    break;
                }
            }
        }

        Ok(report)
    }

    fn recover(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        if self.recovery.is_empty() {
            return Ok(());
        }
        ctx.note("执行恢复动作，返回主界面");
        for action in &self.recovery {
            match action.run(ctx) {
                Ok(()) => {}
                Err(ActionError::Cancelled) => return Err(ActionError::Cancelled),
                Err(err) => tracing::warn!("recovery action failed: {err}"),
            }
        }
        Ok(())
    }
}

/// 按秒倒计时，给操作者切换到游戏窗口的时间；被取消返回 `false`。
fn countdown(ctx: &mut RunCtx) -> bool {
    let secs = ctx.config().countdown().as_secs();
    for remaining in (1..=secs).rev() {
        println!("{remaining} 秒后开始……");
        if ctx.sleep(Duration::from_secs(1)).is_err() {
            return false;
        }
    }
    !ctx.is_cancelled()
}

#[cfg(test)]
mod tests;
