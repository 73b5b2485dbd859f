//! CLI output formatting.
//!
//! Output is one line per thumbnail, source first:
//!
//! ```text
//! photos/dawn.jpg → thumbs/dawn-200.jpg (800x600 → 200x150, rgb)
//! photos/dusk.jpg ✗ Can't open input photos/dusk.jpg: No such file or directory
//! ```
//!
//! Batch runs end with a summary line. Formatting functions return strings so
//! they can be tested without capturing stdout.

use crate::batch::BatchReport;
use crate::imaging::{ColorSpace, ResizeError, Thumbnail};
use std::path::Path;

fn color_label(color_space: ColorSpace) -> &'static str {
    match color_space {
        ColorSpace::Grayscale => "gray",
        ColorSpace::Rgb => "rgb",
    }
}

/// Line for a finished thumbnail.
pub fn format_thumbnail(input: &Path, output: &Path, thumb: &Thumbnail) -> String {
    format!(
        "{} → {} ({} → {}, {})",
        input.display(),
        output.display(),
        thumb.source,
        thumb.dimensions(),
        color_label(thumb.color_space)
    )
}

/// Line for a failed input.
pub fn format_failure(input: &Path, error: &ResizeError) -> String {
    format!("{} ✗ {}", input.display(), error)
}

/// All lines for a batch run, including the summary.
pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .results
        .iter()
        .map(|(item, result)| match result {
            Ok(thumb) => format_thumbnail(&item.input, &item.output, thumb),
            Err(e) => format_failure(&item.input, e),
        })
        .collect();
    lines.push(format!(
        "{} thumbnails, {} failed",
        report.succeeded(),
        report.failed()
    ));
    lines
}

/// Print a batch report to stdout.
pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{}", line);
    }
}
