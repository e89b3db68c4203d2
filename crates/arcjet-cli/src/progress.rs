use std::sync::Mutex;

use arcjet_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives one indicatif bar per pipeline stage.
pub struct IndicatifReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut guard);
    }
}

fn stage_bar(stage: PipelineStage, total: Option<usize>) -> ProgressBar {
    let bar = match total {
        Some(n) => {
            let bar = ProgressBar::new(n as u64);
            if let Ok(style) = ProgressStyle::default_bar().template("{msg:20} [{bar:40}] {pos}/{len}") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(stage.to_string());
    bar
}

impl ProgressReporter for IndicatifReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.with_bar(|slot| {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            *slot = Some(stage_bar(stage, total_items));
        });
    }

    fn advance(&self, items_done: usize) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(items_done as u64);
            }
        });
    }

    fn finish_stage(&self) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                bar.finish();
            }
        });
    }
}
