//! Terminal progress for resolution batches.
//!
//! The library only knows about [`ProgressHook`]; this module adapts an
//! [`indicatif::ProgressBar`] to that hook so the CLI can show one.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::harness::ProgressHook;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// A bar styled for word resolution, initially without a length.
pub fn resolution_bar(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message);
    bar
}

/// Drive `bar` from `(current, total)` updates.
pub fn bar_hook(bar: ProgressBar) -> ProgressHook {
    Arc::new(move |current: usize, total: usize| {
        if bar.length() != Some(total as u64) {
            bar.set_length(total as u64);
        }
        bar.set_position(current as u64);
    })
}
