use crate::VisionResult;
use crate::config::MatchOptions;
use crate::result::{Roi, TemplateMatch};
use anyhow::{Context, bail};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbaImage};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use std::path::{Path, PathBuf};

/// Reference image kept in grayscale, ready to be correlated against frames.
#[derive(Debug, Clone)]
pub struct Template {
    source: PathBuf,
    gray: GrayImage,
}

impl Template {
    /// Load a template from disk (PNG or anything `image` can decode).
    pub fn open(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let image =
            image::open(path).with_context(|| format!("failed to open template at {path:?}"))?;
        Ok(Self::from_image(path, &image))
    }

    /// Wrap an already decoded image. `source` is only used in log output.
    pub fn from_image(source: impl AsRef<Path>, image: &DynamicImage) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            gray: image.to_luma8(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }
}

/// Zero-mean normalized correlation search (OpenCV's `TM_CCOEFF_NORMED`).
///
/// Window sums come from `imageproc` integral images. Frames are converted to grayscale, optionally cropped to a region and
/// down-scaled, then searched exhaustively. Only the single best hit is
/// reported; whether it counts as "found" is up to the caller's threshold.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    options: MatchOptions,
}

impl TemplateMatcher {
    /// Build a matcher with default options (full resolution).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Search `template` inside `frame`, restricted to `roi` when given.
    ///
    /// The returned coordinates are always in full-resolution frame pixels,
    /// regardless of region and scale.
    pub fn find(
        &self,
        frame: &RgbaImage,
        template: &Template,
        roi: Option<Roi>,
    ) -> VisionResult<TemplateMatch> {
        let (frame_w, frame_h) = frame.dimensions();
        let roi = roi.unwrap_or_else(|| Roi::full(frame_w, frame_h));
        if !roi.fits(frame_w, frame_h) {
            bail!("ROI {roi:?} exceeds frame bounds {frame_w}x{frame_h}");
        }

        let (tpl_w, tpl_h) = template.dimensions();
        if tpl_w == 0 || tpl_h == 0 {
            bail!("template {:?} is empty", template.source());
        }
        if tpl_w > roi.width || tpl_h > roi.height {
            bail!(
                "template {:?} ({tpl_w}x{tpl_h}) is larger than the search region ({}x{})",
                template.source(),
                roi.width,
                roi.height
            );
        }

        let region = imageops::crop_imm(frame, roi.x, roi.y, roi.width, roi.height).to_image();
        let region_gray = imageops::grayscale(&region);

        let scale = self.options.effective_scale();
        let (haystack, needle) = if scale < 1.0 {
            (
                downscale(&region_gray, scale),
                downscale(&template.gray, scale),
            )
        } else {
            (region_gray, template.gray.clone())
        };
        if needle.width() > haystack.width() || needle.height() > haystack.height() {
            bail!("template does not fit the search region at scale {scale}");
        }

        let (score, (best_x, best_y)) = best_coefficient(&haystack, &needle);

        let top_left = (
            roi.x + unscale(best_x, scale).min(roi.width - tpl_w),
            roi.y + unscale(best_y, scale).min(roi.height - tpl_h),
        );
        tracing::debug!(
            template = ?template.source(),
            score,
            x = top_left.0,
            y = top_left.1,
            "template search"
        );

        Ok(TemplateMatch {
            top_left,
            width: tpl_w,
            height: tpl_h,
            score,
        })
    }
}

/// Best zero-mean normalized correlation of `needle` over `haystack`.
///
/// Windows or templates without variance score 0, so flat areas never match.
/// Negative correlations are reported as 0.
fn best_coefficient(haystack: &GrayImage, needle: &GrayImage) -> (f32, (u32, u32)) {
    let (hay_w, hay_h) = haystack.dimensions();
    let (tpl_w, tpl_h) = needle.dimensions();
    let n = f64::from(tpl_w) * f64::from(tpl_h);

    let mean = needle.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / n;
    let centered: Vec<f64> = needle.pixels().map(|p| f64::from(p.0[0]) - mean).collect();
    let needle_energy: f64 = centered.iter().map(|v| v * v).sum();
    if needle_energy <= FLAT_ENERGY {
        return (0.0, (0, 0));
    }

    let sums: Image<Luma<u64>> = integral_image::<_, u64>(haystack);
    let squares: Image<Luma<u64>> = integral_squared_image::<_, u64>(haystack);
    let pixels = haystack.as_raw();
    let (stride, row_len) = (hay_w as usize, tpl_w as usize);

    let mut best = (0.0f32, (0, 0));
    for y in 0..=hay_h - tpl_h {
        for x in 0..=hay_w - tpl_w {
            let (right, bottom) = (x + tpl_w - 1, y + tpl_h - 1);
            let [sum] = sum_image_pixels(&sums, x, y, right, bottom);
            let [square] = sum_image_pixels(&squares, x, y, right, bottom);
            let sum = sum as f64;
            let window_energy = square as f64 - sum * sum / n;
            if window_energy <= FLAT_ENERGY {
                continue;
            }

            let mut dot = 0.0;
            for (row, tpl_row) in centered.chunks_exact(row_len).enumerate() {
                let start = (y as usize + row) * stride + x as usize;
                dot += pixels[start..start + row_len]
                    .iter()
                    .zip(tpl_row)
                    .map(|(&p, &t)| f64::from(p) * t)
                    .sum::<f64>();
            }

            let score = (dot / (needle_energy * window_energy).sqrt()).clamp(0.0, 1.0) as f32;
            if score > best.0 {
                best = (score, (x, y));
            }
        }
    }
    best
}

/// Below this sum of squared deviations a window is treated as flat.
const FLAT_ENERGY: f64 = 1e-6;

fn downscale(image: &GrayImage, scale: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    imageops::resize(image, new_w, new_h, FilterType::Triangle)
}

fn unscale(value: u32, scale: f32) -> u32 {
    (value as f32 / scale).round() as u32
}

/// Convenience function: load `template_path` and search it in `frame` once.
pub fn find_template(
    frame: &RgbaImage,
    template_path: impl AsRef<Path>,
    options: Option<MatchOptions>,
) -> VisionResult<TemplateMatch> {
    let template = Template::open(template_path)?;
    TemplateMatcher::with_options(options.unwrap_or_default()).find(frame, &template, None)
}
