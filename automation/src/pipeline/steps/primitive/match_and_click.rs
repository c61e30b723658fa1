use super::{ActionError, ClickWindowPos, Step, WindowPos, with_retry};
use crate::actions;
use crate::pipeline::{RatioRect, RunCtx};
use std::borrow::Cow;
use vision::{MatchOptions, Template, TemplateMatcher};

/// 截图找图，命中后点击模板中心（可加偏移）。
///
/// 流程
/// - 每次尝试都重新截图，在 `region`（为空则全图）内做零均值归一化相关匹配。
/// - 分数 ≥ 阈值（`threshold`，为空则使用配置中的 `confidence_threshold`）视为命中。
/// - 未命中则等待 `match_interval` 后重试，最多 `match_attempts` 次。
/// - 预算耗尽：有 `fallback` 时点击备用坐标并记录备注，否则返回 `NotFound`。
///
/// 模板文件缺失或无法加载：有 `fallback` 时直接点击备用坐标（不截图、不重试），
/// 否则返回 `Asset` 错误，不重试。
pub struct MatchAndClick {
    /// `assets_dir` 下的文件名。
    pub template: &'static str,
    pub region: Option<RatioRect>,
    /// 相对模板中心的逻辑像素偏移。
    pub offset: (i32, i32),
    pub threshold: Option<f64>,
    pub fallback: Option<WindowPos>,
}

impl MatchAndClick {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            region: None,
            offset: (0, 0),
            threshold: None,
            fallback: None,
        }
    }

    pub fn in_region(mut self, region: RatioRect) -> Self {
        self.region = Some(region);
        self
    }

    /// 找图失败时改为点击窗口比例坐标。
    pub fn or_click_ratio(mut self, x: f32, y: f32) -> Self {
        self.fallback = Some(WindowPos { x, y });
        self
    }

    /// 返回命中位置的屏幕坐标。
    fn locate(&self, ctx: &mut RunCtx) -> Result<(i32, i32), ActionError> {
        let config = ctx.config();
        let path = config.template_path(self.template);
        let template = Template::open(&path).map_err(ActionError::Asset)?;
        let matcher = TemplateMatcher::with_options(MatchOptions::with_scale(config.match_scale));
        let threshold = self.threshold.unwrap_or(config.confidence_threshold);
        let attempts = config.match_attempts;

        with_retry(
            ctx,
            self.template,
            attempts,
            config.match_interval(),
            |ctx, attempt| {
                let geometry = ctx.geometry()?;
                let frame = ctx.capture_frame()?;
                let roi = self
                    .region
                    .map(|r| r.to_roi(frame.width(), frame.height()));
                let hit = matcher
                    .find(frame, &template, roi)
                    .map_err(ActionError::Asset)?;

                if !hit.is_above(threshold) {
                    tracing::debug!(
                        template = self.template,
                        score = hit.score,
                        attempt,
                        "template below threshold"
                    );
                    return Err(ActionError::NotFound {
                        template: self.template.to_string(),
                        best: hit.score as f64,
                        threshold,
                        attempts: attempt,
                    });
                }

                let (x, y) = actions::capture_to_screen(hit.center(), frame.dimensions(), &geometry);
                tracing::info!(
                    template = self.template,
                    score = hit.score,
                    x,
                    y,
                    "template found"
                );
                Ok((x + self.offset.0, y + self.offset.1))
            },
        )
    }
}

impl Step for MatchAndClick {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        if let Some(pos) = self.fallback {
            let path = ctx.config().template_path(self.template);
            if !path.is_file() {
                ctx.note(format!("模板 {path:?} 不存在，直接使用备用坐标 {pos}"));
                return ClickWindowPos { pos }.run(ctx);
            }
        }

        match self.locate(ctx) {
            Ok((x, y)) => ctx.click_screen(x, y),
            Err(err @ (ActionError::NotFound { .. } | ActionError::Asset(_))) => {
                match self.fallback {
                    Some(pos) => {
                        ctx.note(format!("{err}，改用备用坐标 {pos}"));
                        ClickWindowPos { pos }.run(ctx)
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("MatchAndClick({})", self.template))
    }
}
