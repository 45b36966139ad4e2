// Score post-processing: softmax and top-k ranking

use crate::class_names::ClassNames;
use std::cmp::Ordering;

/// A single ranked prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    pub confidence: f32,
}

/// Convert logits to probabilities in place (max-subtracted for stability)
pub fn softmax(scores: &mut [f32]) {
    let Some(max) = scores.iter().copied().reduce(f32::max) else {
        return;
    };

    let mut sum = 0.0f32;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
}

/// Highest `top_k` scores, best first
///
/// An index without a class name (model emits more scores than the names
/// file lists) is labelled `class_<index>`.
pub fn top_k(scores: &[f32], k: usize, classes: &ClassNames) -> Vec<Prediction> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    // Stable sort keeps the lower index first on ties
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(k)
        .map(|(index, confidence)| Prediction {
            class_name: classes.label(index),
            confidence,
        })
        .collect()
}
