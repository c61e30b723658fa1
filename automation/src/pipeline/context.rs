use super::steps::ActionError;
use crate::ai::ScreenClassifier;
use crate::cancel::{CancelToken, Clock};
use crate::config::RunConfig;
use crate::input::{InputSink, KeyId};
use crate::window::{Screen, WindowGeometry};
use anyhow::Result;
use image::RgbaImage;
use std::time::Duration;

/// 运行上下文：持有配置、各类设备句柄、取消标记，以及当前步骤的截图缓存与备注。
///
/// 步骤可选择：
/// - 使用 `ensure_frame` 复用缓存（两次截图之间没有输入/等待时）
/// - 调用 `capture_frame` 强制重新截图
///
/// 任何点击、按键或等待都会使缓存失效。
pub struct RunCtx<'a> {
    config: &'a RunConfig,
    screen: &'a mut dyn Screen,
    input: &'a mut dyn InputSink,
    clock: &'a mut dyn Clock,
    classifier: Option<&'a dyn ScreenClassifier>,
    cancel: CancelToken,
    geometry: Option<WindowGeometry>,
    frame: Option<RgbaImage>,
    notes: Vec<String>,
}

impl<'a> RunCtx<'a> {
    pub fn new(
        config: &'a RunConfig,
        screen: &'a mut dyn Screen,
        input: &'a mut dyn InputSink,
        clock: &'a mut dyn Clock,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            screen,
            input,
            clock,
            classifier: None,
            cancel,
            geometry: None,
            frame: None,
            notes: Vec::new(),
        }
    }

    /// 注入截图理解服务；未注入时 AI 检查会被跳过。
    pub fn with_classifier(mut self, classifier: &'a dyn ScreenClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn config(&self) -> &'a RunConfig {
        self.config
    }

    pub fn classifier(&self) -> Option<&'a dyn ScreenClassifier> {
        self.classifier
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 查找游戏窗口并缓存几何信息，整个运行期间只调用一次。
    pub fn attach(&mut self) -> Result<WindowGeometry> {
        let geometry = self.screen.attach()?;
        self.geometry = Some(geometry);
        Ok(geometry)
    }

    /// 已绑定窗口的几何信息；窗口可能被移动，因此每次都向系统查询，失败时退回缓存值。
    pub fn geometry(&mut self) -> Result<WindowGeometry, ActionError> {
        match self.screen.geometry() {
            Ok(g) => {
                self.geometry = Some(g);
                Ok(g)
            }
            Err(err) => match self.geometry {
                Some(g) => {
                    tracing::debug!("geometry query failed, using cached value: {err:#}");
                    Ok(g)
                }
                None => Err(ActionError::Capture(err)),
            },
        }
    }

    /// 将游戏窗口置前；失败只记录日志。
    pub fn activate(&mut self) {
        if let Err(err) = self.screen.activate() {
            tracing::warn!("activate window failed: {err:#}");
        }
    }

    /// 主动使缓存失效，以便下一次调用重新截图。
    pub fn invalidate(&mut self) {
        self.frame = None;
    }

    /// 确保缓存中包含截图，必要时触发 `capture`。
    pub fn ensure_frame(&mut self) -> Result<&RgbaImage, ActionError> {
        let frame = match self.frame.take() {
            Some(frame) => frame,
            None => self.screen.capture().map_err(ActionError::Capture)?,
        };
        Ok(self.frame.insert(frame))
    }

    /// 主动截图并刷新缓存，确保返回值总是最新画面。
    pub fn capture_frame(&mut self) -> Result<&RgbaImage, ActionError> {
        let frame = self.screen.capture().map_err(ActionError::Capture)?;
        Ok(self.frame.insert(frame))
    }

    /// 在屏幕坐标点击，随后按 `click_delay` 停顿。
    pub fn click_screen(&mut self, x: i32, y: i32) -> Result<(), ActionError> {
        self.check_cancel()?;
        tracing::debug!(x, y, "click");
        self.input.click(x, y).map_err(ActionError::Input)?;
        self.invalidate();
        self.sleep(self.config.click_delay())
    }

    pub fn press(&mut self, key: KeyId) -> Result<(), ActionError> {
        self.check_cancel()?;
        tracing::debug!(%key, "press");
        self.input.press_key(key).map_err(ActionError::Input)?;
        self.invalidate();
        Ok(())
    }

    /// 可取消的等待；被取消时返回 `ActionError::Cancelled`。
    pub fn sleep(&mut self, duration: Duration) -> Result<(), ActionError> {
        self.invalidate();
        if duration.is_zero() {
            return self.check_cancel();
        }
        if self.clock.sleep(duration, &self.cancel) {
            Ok(())
        } else {
            Err(ActionError::Cancelled)
        }
    }

    pub fn check_cancel(&self) -> Result<(), ActionError> {
        if self.cancel.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 为当前步骤追加一条备注，最终写入运行报告。
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.notes.push(message);
    }

    /// 取走当前步骤累积的备注。
    pub fn take_notes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notes)
    }
}
