use anyhow::{Result, anyhow};
use image::RgbaImage;
use serde::Deserialize;
#[cfg(target_os = "macos")]
use std::process::Command;
use std::{thread, time::Duration};
use xcap::Window;

/// 窗口在屏幕上的位置与逻辑尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// 目标窗口接口：绑定、置前、截图。
///
/// 运行开始时调用一次 `attach`，之后的步骤都复用同一个窗口句柄。
pub trait Screen {
    /// 查找并绑定目标窗口；找不到时返回错误（对整次运行而言是致命错误）。
    fn attach(&mut self) -> Result<WindowGeometry>;

    /// 已绑定窗口的几何信息。
    fn geometry(&self) -> Result<WindowGeometry>;

    /// 将窗口置于最前方。
    fn activate(&mut self) -> Result<()>;

    /// 以 RGBA 格式捕获窗口内容（物理像素，可能与逻辑尺寸不同）。
    fn capture(&mut self) -> Result<RgbaImage>;
}

/// 窗口候选项的最小描述，供 `WindowSelector` 做纯函数筛选。
#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub minimized: bool,
}

/// 游戏窗口的查找规则：标题关键字 + 期望尺寸。
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSelector {
    pub title_keywords: Vec<String>,
    /// 期望的窗口尺寸（宽、高），为空时不按尺寸筛选。
    pub target_size: Option<(u32, u32)>,
    /// 尺寸允许的偏差（像素）。
    pub size_tolerance: u32,
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self {
            title_keywords: vec![
                "Star Wars: Galaxy of Heroes".to_string(),
                "Galaxy of Heroes".to_string(),
                "SWGOH".to_string(),
                "Star Wars".to_string(),
            ],
            target_size: Some((1952, 1096)),
            size_tolerance: 100,
        }
    }
}

impl WindowSelector {
    /// 标题包含任一关键字即可，不区分大小写。
    fn title_matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.title_keywords
            .iter()
            .any(|k| !k.is_empty() && title.contains(&k.to_lowercase()))
    }

    fn size_matches(&self, width: u32, height: u32) -> bool {
        match self.target_size {
            Some((tw, th)) => {
                width.abs_diff(tw) < self.size_tolerance && height.abs_diff(th) < self.size_tolerance
            }
            None => false,
        }
    }

    /// 依次尝试：标题且尺寸匹配 → 仅标题匹配 → 仅尺寸匹配。返回候选项下标。
    pub fn select(&self, candidates: &[WindowInfo]) -> Option<usize> {
        let visible = || {
            candidates
                .iter()
                .enumerate()
                .filter(|(_, w)| !w.minimized && w.width > 0 && w.height > 0)
        };

        visible()
            .find(|(_, w)| self.title_matches(&w.title) && self.size_matches(w.width, w.height))
            .or_else(|| visible().find(|(_, w)| self.title_matches(&w.title)))
            .or_else(|| visible().find(|(_, w)| self.size_matches(w.width, w.height)))
            .map(|(i, _)| i)
    }
}

/// 包装 `xcap::Window`，负责发现、激活与截图游戏窗口。
pub struct GameWindow {
    selector: WindowSelector,
    window: Option<Window>,
}

impl GameWindow {
    /// 创建未绑定窗口的实例。
    pub fn new(selector: WindowSelector) -> Self {
        Self {
            selector,
            window: None,
        }
    }

    fn bound(&self) -> Result<&Window> {
        self.window
            .as_ref()
            .ok_or_else(|| anyhow!("尚未绑定游戏窗口"))
    }
}

impl Screen for GameWindow {
    /// 查找并缓存游戏窗口，后续操作都依赖此步骤。
    fn attach(&mut self) -> Result<WindowGeometry> {
        if self.window.is_none() {
            let windows = Window::all()?;
            let infos: Vec<WindowInfo> = windows
                .iter()
                .map(|w| WindowInfo {
                    title: w.title().unwrap_or_default(),
                    width: w.width().unwrap_or(0),
                    height: w.height().unwrap_or(0),
                    minimized: w.is_minimized().unwrap_or(false),
                })
                .collect();
            for info in &infos {
                tracing::debug!(title = %info.title, w = info.width, h = info.height, "window");
            }

            let index = self
                .selector
                .select(&infos)
                .ok_or_else(|| anyhow!("未找到游戏窗口，游戏是否已打开？"))?;
            tracing::info!(title = %infos[index].title, "found game window");
            self.window = Some(windows[index].clone());
        }
        self.geometry()
    }

    fn geometry(&self) -> Result<WindowGeometry> {
        let window = self.bound()?;
        Ok(WindowGeometry {
            x: window.x()?,
            y: window.y()?,
            width: window.width()?,
            height: window.height()?,
        })
    }

    fn activate(&mut self) -> Result<()> {
        let window = self.bound()?;
        focus(window)?;
        // Give the OS a moment to bring it front
        thread::sleep(Duration::from_millis(150));
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbaImage> {
        Ok(self.bound()?.capture_image()?)
    }
}

/// macOS：优先按 PID 置前，失败时按应用名称激活。
#[cfg(target_os = "macos")]
fn focus(window: &Window) -> Result<()> {
    let pid = window.pid()?;
    let app_name = window.app_name()?;

    let script_pid = format!(
        "tell application \"System Events\" to set frontmost of (first process whose unix id is {pid}) to true"
    );
    let status_pid = Command::new("osascript").args(["-e", &script_pid]).status();

    let ok = matches!(status_pid, Ok(s) if s.success());
    if !ok {
        let script_app = format!("tell application \"{app_name}\" to activate");
        let _ = Command::new("osascript").args(["-e", &script_app]).status();
    }
    Ok(())
}

#[cfg(windows)]
fn focus(window: &Window) -> Result<()> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

    let hwnd = HWND(window.id()? as usize as *mut core::ffi::c_void);
    // 返回 false 只表示系统拒绝抢占前台，不影响后续输入。
    let _ = unsafe { SetForegroundWindow(hwnd) };
    Ok(())
}

#[cfg(not(any(target_os = "macos", windows)))]
fn focus(window: &Window) -> Result<()> {
    tracing::debug!(title = ?window.title().ok(), "window focus not supported on this platform");
    Ok(())
}
