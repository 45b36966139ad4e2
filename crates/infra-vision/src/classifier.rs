// Classification processor: load -> preprocess -> infer -> rank -> format

use crate::class_names::ClassNames;
use crate::image_loader::{preprocess, ImageLoader};
use crate::model::Model;
use crate::postprocess::{softmax, top_k, Prediction};
use batchcls_core::port::{ProcessError, Processor};
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default number of predictions per image
pub const DEFAULT_TOP_K: usize = 5;

/// Default file size limit (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Per-item classification options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub top_k: usize,
    pub softmax: bool,
    pub timing: bool,
    pub max_file_size: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            softmax: false,
            timing: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Processor that classifies one image path per call
///
/// Stateless apart from the shared model and class names.
pub struct ClassifyProcessor {
    model: Arc<dyn Model>,
    classes: ClassNames,
    loader: ImageLoader,
    config: ClassifierConfig,
}

impl ClassifyProcessor {
    pub fn new(model: Arc<dyn Model>, classes: ClassNames, config: ClassifierConfig) -> Self {
        Self {
            model,
            loader: ImageLoader::new(config.max_file_size),
            classes,
            config,
        }
    }

    /// Rank predictions for the image at `path`
    pub fn classify(&self, path: &str) -> crate::error::Result<Vec<Prediction>> {
        let image = self.loader.load(path)?;
        let tensor = preprocess(&image, self.model.input_size());

        let mut scores = self.model.infer(&tensor)?;
        if self.config.softmax {
            softmax(&mut scores);
        }

        Ok(top_k(&scores, self.config.top_k, &self.classes))
    }
}

impl Processor for ClassifyProcessor {
    fn process(&self, item: &str) -> Result<String, ProcessError> {
        let started = Instant::now();
        let predictions = self.classify(item)?;
        let elapsed = started.elapsed();

        debug!(path = %item, elapsed_ms = elapsed.as_millis() as u64, "Classified");
        let timing = self.config.timing.then_some(elapsed);
        Ok(format_result(item, timing, self.config.top_k, &predictions))
    }
}

/// `<path>[, <ms>ms][, <name> <conf>, ...]`, confidences with six decimals
pub fn format_result(
    path: &str,
    elapsed: Option<Duration>,
    top_k: usize,
    predictions: &[Prediction],
) -> String {
    let mut line = path.to_string();

    if let Some(elapsed) = elapsed {
        let _ = write!(line, ", {}ms", elapsed.as_millis());
    }

    if top_k != 0 {
        line.push_str(", ");
    }

    let ranked: Vec<String> = predictions
        .iter()
        .map(|p| format!("{} {:.6}", p.class_name, p.confidence))
        .collect();
    line.push_str(&ranked.join(", "));

    line
}
