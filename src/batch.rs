//! Parallel thumbnail generation for many inputs.
//!
//! Each input is an independent resize call with its own decoder and
//! buffers, so the calls share nothing but the (stateless) backend. Work is
//! spread over the global [rayon](https://docs.rs/rayon) pool; the CLI sizes
//! that pool from [`ProcessingConfig`](crate::config::ProcessingConfig).
//!
//! A failed input does not stop the batch. Every outcome is collected into a
//! [`BatchReport`] in input order.

use crate::imaging::{
    CodecSettings, ImageBackend, Policy, ResizeError, ResizeRequest, Thumbnail, create_thumbnail,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One input and where its thumbnail goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Outcome of a batch run, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<(BatchItem, Result<Thumbnail, ResizeError>)>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Thumbnail filename for an input: `{stem}-{size}.jpg`, or
/// `{stem}-{size}-square.jpg` for the square policy.
pub fn thumbnail_name(input: &Path, request: ResizeRequest) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match request.policy {
        Policy::Fit => format!("{}-{}.jpg", stem, request.target_size),
        Policy::Square => format!("{}-{}-square.jpg", stem, request.target_size),
    }
}

/// Pair every input with its output path under `output_dir`.
pub fn plan_batch(inputs: &[PathBuf], output_dir: &Path, request: ResizeRequest) -> Vec<BatchItem> {
    inputs
        .iter()
        .map(|input| BatchItem {
            input: input.clone(),
            output: output_dir.join(thumbnail_name(input, request)),
        })
        .collect()
}

/// Run every item in parallel.
pub fn run_batch(
    backend: &impl ImageBackend,
    request: ResizeRequest,
    items: Vec<BatchItem>,
    settings: &CodecSettings,
) -> BatchReport {
    let results = items
        .into_par_iter()
        .map(|item| {
            let result = create_thumbnail(backend, request, &item.input, &item.output, settings);
            if let Err(e) = &result {
                tracing::warn!(input = %item.input.display(), error = %e, "thumbnail failed");
            }
            (item, result)
        })
        .collect();
    BatchReport { results }
}
