// Model Port
// Raw scores for one preprocessed image; ranking happens in postprocess

use crate::error::Result;

/// Spatial input size expected by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    pub width: u32,
    pub height: u32,
}

impl InputSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Preprocessed image in NCHW layout: batch 1, RGB, values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub size: InputSize,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub const CHANNELS: usize = 3;

    /// `[1, 3, height, width]`
    pub fn shape(&self) -> [usize; 4] {
        [
            1,
            Self::CHANNELS,
            self.size.height as usize,
            self.size.width as usize,
        ]
    }

    /// One channel plane (0 = R, 1 = G, 2 = B)
    pub fn plane(&self, channel: usize) -> &[f32] {
        let len = self.size.width as usize * self.size.height as usize;
        &self.data[channel * len..(channel + 1) * len]
    }
}

/// Classification model
///
/// Shared by every worker. Implementations that cannot run concurrently
/// must serialize internally.
pub trait Model: Send + Sync {
    fn input_size(&self) -> InputSize;

    /// Raw per-class scores for one image
    fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Returns the same scores for every image
    pub struct FixedScoresModel {
        size: InputSize,
        scores: Vec<f32>,
    }

    impl FixedScoresModel {
        pub fn new(size: InputSize, scores: Vec<f32>) -> Self {
            Self { size, scores }
        }
    }

    impl Model for FixedScoresModel {
        fn input_size(&self) -> InputSize {
            self.size
        }

        fn infer(&self, _input: &ImageTensor) -> Result<Vec<f32>> {
            Ok(self.scores.clone())
        }
    }

    /// Scores are the mean of each RGB plane, so a red image ranks class 0 first
    pub struct ChannelMeanModel {
        size: InputSize,
    }

    impl ChannelMeanModel {
        pub fn new(size: InputSize) -> Self {
            Self { size }
        }
    }

    impl Model for ChannelMeanModel {
        fn input_size(&self) -> InputSize {
            self.size
        }

        fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>> {
            Ok((0..ImageTensor::CHANNELS)
                .map(|c| {
                    let plane = input.plane(c);
                    plane.iter().sum::<f32>() / plane.len() as f32
                })
                .collect())
        }
    }
}
