/// Rectangular search region inside a frame, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region covering a whole `width` x `height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether the region lies completely inside a frame of the given size.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

/// Best correlation hit for one template on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    /// Top-left corner of the hit, in full-resolution frame pixels.
    pub top_left: (u32, u32),
    /// Template width (pixels).
    pub width: u32,
    /// Template height (pixels).
    pub height: u32,
    /// Zero-mean normalized correlation score, 0.0–1.0.
    pub score: f32,
}

impl TemplateMatch {
    /// Centre of the hit, in frame pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            self.top_left.0 as f64 + self.width as f64 / 2.0,
            self.top_left.1 as f64 + self.height as f64 / 2.0,
        )
    }

    /// Point inside the hit given as ratios of the template size.
    pub fn relative_point(&self, x: f32, y: f32) -> (f64, f64) {
        (
            self.top_left.0 as f64 + self.width as f64 * x.clamp(0.0, 1.0) as f64,
            self.top_left.1 as f64 + self.height as f64 * y.clamp(0.0, 1.0) as f64,
        )
    }

    pub fn is_above(&self, threshold: f64) -> bool {
        self.score as f64 >= threshold
    }
}
