//! 测试用的假设备：记录输入与等待，不触碰真实窗口、键鼠和网络。
use super::RunCtx;
use crate::ai::ScreenClassifier;
use crate::cancel::{CancelToken, Clock};
use crate::config::RunConfig;
use crate::input::{InputSink, KeyId};
use crate::window::{Screen, WindowGeometry};
use anyhow::{Result, anyhow, bail};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Click(i32, i32),
    Key(KeyId),
}

#[derive(Default)]
pub struct RecordingInput {
    pub events: Vec<InputEvent>,
}

impl RecordingInput {
    pub fn keys(&self) -> Vec<KeyId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Key(k) => Some(*k),
                InputEvent::Click(..) => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                InputEvent::Click(x, y) => Some((*x, *y)),
                InputEvent::Key(_) => None,
            })
            .collect()
    }
}

impl InputSink for RecordingInput {
    fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.events.push(InputEvent::Click(x, y));
        Ok(())
    }

    fn press_key(&mut self, key: KeyId) -> Result<()> {
        self.events.push(InputEvent::Key(key));
        Ok(())
    }
}

/// 只记录等待时长；`cancel_on_sleep = Some(n)` 时在第 n 次等待（1 起始）触发取消。
#[derive(Default)]
pub struct RecordingClock {
    pub sleeps: Vec<Duration>,
    pub cancel_on_sleep: Option<usize>,
}

impl RecordingClock {
    pub fn total(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for RecordingClock {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        self.sleeps.push(duration);
        if self.cancel_on_sleep == Some(self.sleeps.len()) {
            cancel.cancel();
            return false;
        }
        true
    }
}

pub const GEOMETRY: WindowGeometry = WindowGeometry {
    x: 100,
    y: 50,
    width: 160,
    height: 120,
};

/// 固定画面的假窗口；`frame` 为 2 倍分辨率截图时可模拟 Retina。
pub struct FakeScreen {
    pub geometry: WindowGeometry,
    pub frame: RgbaImage,
    pub present: bool,
    pub attached: bool,
    pub captures: usize,
    pub activations: usize,
}

impl Default for FakeScreen {
    fn default() -> Self {
        Self {
            geometry: GEOMETRY,
            frame: blank_frame(GEOMETRY.width, GEOMETRY.height),
            present: true,
            attached: false,
            captures: 0,
            activations: 0,
        }
    }
}

impl Screen for FakeScreen {
    fn attach(&mut self) -> Result<WindowGeometry> {
        if !self.present {
            bail!("未找到游戏窗口，游戏是否已打开？");
        }
        self.attached = true;
        Ok(self.geometry)
    }

    fn geometry(&self) -> Result<WindowGeometry> {
        Ok(self.geometry)
    }

    fn activate(&mut self) -> Result<()> {
        self.activations += 1;
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbaImage> {
        self.captures += 1;
        Ok(self.frame.clone())
    }
}

/// 依次返回预设回答；用完后报错。
#[derive(Default)]
pub struct StubClassifier {
    pub answers: RefCell<VecDeque<Result<String, String>>>,
    pub calls: Cell<usize>,
}

impl StubClassifier {
    pub fn answering<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(
                answers
                    .into_iter()
                    .map(|a| a.map(Into::into).map_err(Into::into))
                    .collect(),
            ),
            calls: Cell::new(0),
        }
    }
}

impl ScreenClassifier for StubClassifier {
    fn classify(&self, _image: &RgbaImage, _prompt: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        match self.answers.borrow_mut().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Err(anyhow!("no stubbed answer left")),
        }
    }
}

/// 把全部假设备组装在一起，`run` 期间借出一个 `RunCtx`。
pub struct Harness {
    pub config: RunConfig,
    pub screen: FakeScreen,
    pub input: RecordingInput,
    pub clock: RecordingClock,
    pub classifier: Option<StubClassifier>,
    pub cancel: CancelToken,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            config: RunConfig {
                click_delay_secs: 0.0,
                ..RunConfig::default()
            },
            screen: FakeScreen::default(),
            input: RecordingInput::default(),
            clock: RecordingClock::default(),
            classifier: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: StubClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn run<T>(&mut self, f: impl FnOnce(&mut RunCtx) -> T) -> T {
        let mut ctx = RunCtx::new(
            &self.config,
            &mut self.screen,
            &mut self.input,
            &mut self.clock,
            self.cancel.clone(),
        );
        if let Some(classifier) = &self.classifier {
            ctx = ctx.with_classifier(classifier);
        }
        f(&mut ctx)
    }
}

pub fn blank_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]))
}

/// 容易与灰色背景区分的 L 形图案。
pub fn marker(size: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        let arm = size / 4;
        if (x < arm && y < size - arm) || (y >= size - arm && x < size - arm) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

pub fn paste(frame: &mut RgbaImage, image: &GrayImage, at: (u32, u32)) {
    for (x, y, p) in image.enumerate_pixels() {
        let v = p.0[0];
        frame.put_pixel(at.0 + x, at.1 + y, Rgba([v, v, v, 255]));
    }
}

/// 每个测试独立的资源目录，避免并行测试互相覆盖。
pub fn assets_dir(test: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("swgoh-{}-{test}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
