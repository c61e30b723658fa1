//! Template search for captured game frames.
//!
//! Zero-mean normalized correlation over grayscale frames: load a
//! reference PNG once as a [`Template`], then ask a [`TemplateMatcher`] for
//! the best hit on each captured frame. Callers compare
//! [`TemplateMatch::score`] against their own confidence threshold.

mod config;
mod engine;
mod result;

pub use config::MatchOptions;
pub use engine::{Template, TemplateMatcher, find_template};
pub use result::{Roi, TemplateMatch};

/// Crate-wide result type.
pub type VisionResult<T> = anyhow::Result<T>;
