use std::fmt;

/// 单个步骤的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Succeeded,
    Skipped(String),
    Failed(String),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// 1 起始的步骤编号。
    pub index: usize,
    pub label: String,
    pub outcome: StepOutcome,
    pub notes: Vec<String>,
}

/// 一次运行的汇总，按执行顺序记录每个步骤。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub routine: String,
    pub records: Vec<StepRecord>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(routine: impl Into<String>) -> Self {
        Self {
            routine: routine.into(),
            ..Self::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// 被取消时为 130（与 shell 对 SIGINT 的约定一致），否则为 0。
    ///
    /// 识别失败不影响退出码，详情见报告。
    pub fn exit_code(&self) -> i32 {
        if self.cancelled { 130 } else { 0 }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Succeeded => f.write_str("OK"),
            StepOutcome::Skipped(reason) => write!(f, "SKIPPED ({reason})"),
            StepOutcome::Failed(reason) => write!(f, "FAILED ({reason})"),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "运行报告 [{}]", self.routine)?;
        for record in &self.records {
            writeln!(
                f,
                "  [step {:02}] {} => {}",
                record.index, record.label, record.outcome
            )?;
            for note in &record.notes {
                writeln!(f, "      - {note}")?;
            }
        }
        if self.cancelled {
            writeln!(f, "  已被用户取消")?;
        }
        write!(
            f,
            "  共 {} 步，失败 {} 步",
            self.records.len(),
            self.failed()
        )
    }
}
