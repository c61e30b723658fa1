/// Tunable parameters for a template search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Factor applied to both frame and template before correlating.
    ///
    /// The correlation is brute force, so full-resolution searches over a
    /// 2K window are slow. `0.5` quarters the work; values are clamped into
    /// `(0.05, 1.0]`.
    pub scale: f32,
}

impl MatchOptions {
    /// Options with a custom down-scaling factor.
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale: clamp_scale(scale),
        }
    }

    /// The effective scale after clamping.
    pub fn effective_scale(&self) -> f32 {
        clamp_scale(self.scale)
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

fn clamp_scale(scale: f32) -> f32 {
    if !scale.is_finite() {
        return 1.0;
    }
    scale.clamp(0.05, 1.0)
}
