use vision::Roi;

/// 以窗口比例（0.0–1.0）描述的矩形区域，运行时按截图尺寸展开为像素 ROI。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatioRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RatioRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 基于截图像素尺寸求出 ROI，结果总是落在截图范围内且至少 1x1。
    pub fn to_roi(&self, frame_w: u32, frame_h: u32) -> Roi {
        let x0 = px(self.x, frame_w).min(frame_w.saturating_sub(1));
        let y0 = px(self.y, frame_h).min(frame_h.saturating_sub(1));
        let x1 = px(self.x + self.width, frame_w).min(frame_w).max(x0 + 1);
        let y1 = px(self.y + self.height, frame_h).min(frame_h).max(y0 + 1);
        Roi::new(x0, y0, x1 - x0, y1 - y0)
    }
}

fn px(ratio: f32, total: u32) -> u32 {
    (ratio.clamp(0.0, 1.0) * total as f32).round() as u32
}
