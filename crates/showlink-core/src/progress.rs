//! Progress bars tiled across adjacent buttons.
//!
//! A song or section spans `[start, end]` beats. With `count` buttons in a
//! row each button owns `1/count` of that range and shows how far through
//! its own slice the playhead is, as one of [`FRAME_COUNT`] icon frames.

use serde::Serialize;

/// Frames per progress icon set (0 = empty, 72 = full).
pub const FRAME_COUNT: usize = 73;

/// Icon variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStyle {
    Full,
    FullTransparent,
    SlimLeft,
    SlimMid,
    SlimRight,
}

impl ProgressStyle {
    pub fn dir_name(self) -> &'static str {
        match self {
            ProgressStyle::Full => "full",
            ProgressStyle::FullTransparent => "full-transparent",
            ProgressStyle::SlimLeft => "slim-left",
            ProgressStyle::SlimMid => "slim-mid",
            ProgressStyle::SlimRight => "slim-right",
        }
    }
}

/// How a tiled bar is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BarStyle {
    Full,
    Slim,
}

impl BarStyle {
    /// Icon variant for button `index` (0-based) out of `count`.
    pub fn icon_style(self, index: u32, count: u32) -> ProgressStyle {
        match self {
            BarStyle::Full => ProgressStyle::Full,
            BarStyle::Slim if index == 0 => ProgressStyle::SlimLeft,
            BarStyle::Slim if index + 1 >= count => ProgressStyle::SlimRight,
            BarStyle::Slim => ProgressStyle::SlimMid,
        }
    }
}

/// Opaque reference to one pre-rendered icon frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct IconHandle {
    pub style: ProgressStyle,
    pub frame: usize,
}

impl std::fmt::Display for IconHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "progress/{}/{}/{}",
            FRAME_COUNT - 1,
            self.style.dir_name(),
            self.frame
        )
    }
}

/// Icon for a progress value in `[0, 1]`; out of range values clamp.
pub fn progress_icon(progress: f64, style: ProgressStyle) -> IconHandle {
    let clamped = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let frame = (clamped * (FRAME_COUNT - 1) as f64).round() as usize;
    IconHandle { style, frame }
}

/// Fraction of `[start, end]` covered by `position`, unclamped.
///
/// Unknown or empty ranges yield 0.
pub fn range_progress(position: f64, start: Option<f64>, end: Option<f64>) -> f64 {
    match (start, end) {
        (Some(start), Some(end)) if end > start => (position - start) / (end - start),
        _ => 0.0,
    }
}

/// Progress within the slice owned by button `index` of `count`.
pub fn button_percent(
    position: f64,
    start: Option<f64>,
    end: Option<f64>,
    count: u32,
    index: u32,
) -> f64 {
    let count = count.max(1) as f64;
    let total = range_progress(position, start, end);
    (total - index as f64 / count) / (1.0 / count)
}
