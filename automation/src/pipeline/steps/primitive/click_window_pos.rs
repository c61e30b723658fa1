use super::{ActionError, Step};
use crate::actions;
use crate::pipeline::RunCtx;
use crate::window::WindowGeometry;
use std::borrow::Cow;
use std::fmt;

/// 在窗口内按比例坐标执行点击。
pub struct ClickWindowPos {
    pub pos: WindowPos,
}

/// 窗口内的位置：0.0–1.0 的比例坐标，自动适配窗口大小。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowPos {
    pub x: f32,
    pub y: f32,
}

impl WindowPos {
    pub fn to_screen(self, geometry: &WindowGeometry) -> (i32, i32) {
        actions::ratio_to_screen(self.x, self.y, geometry)
    }
}

impl fmt::Display for WindowPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}%, {:.0}%)", self.x * 100.0, self.y * 100.0)
    }
}

impl ClickWindowPos {
    pub fn at_ratio(x: f32, y: f32) -> Self {
        Self {
            pos: WindowPos { x, y },
        }
    }
}

impl Step for ClickWindowPos {
    fn run(&self, ctx: &mut RunCtx) -> Result<(), ActionError> {
        let geometry = ctx.geometry()?;
        let (screen_x, screen_y) = self.pos.to_screen(&geometry);
        ctx.click_screen(screen_x, screen_y)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("ClickAt{}", self.pos))
    }
}
