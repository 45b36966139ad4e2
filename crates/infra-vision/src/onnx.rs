// ONNX Runtime model backend (feature "onnx")

use crate::error::{Result, VisionError};
use crate::model::Model;
use std::path::Path;
use std::sync::Arc;

/// Load the model at `path` with whichever backend this build carries
///
/// Runs during setup; any error here is fatal for the run.
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn Model>> {
    let path = path.as_ref();

    #[cfg(feature = "onnx")]
    {
        Ok(Arc::new(backend::OnnxModel::load(path)?))
    }

    #[cfg(not(feature = "onnx"))]
    {
        tracing::warn!(model = %path.display(), "ONNX model requested but feature 'onnx' not enabled");
        Err(VisionError::Unsupported(format!(
            "cannot load '{}': built without the 'onnx' feature (rebuild with --features onnx)",
            path.display()
        )))
    }
}

#[cfg(feature = "onnx")]
pub use backend::OnnxModel;

#[cfg(feature = "onnx")]
mod backend {
    use super::*;
    use crate::model::{ImageTensor, InputSize};
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::{TensorRef, ValueType};
    use std::sync::Mutex;
    use tracing::info;

    /// ONNX Runtime session; `run` needs exclusive access, so calls from
    /// concurrent workers are serialized on the session lock.
    pub struct OnnxModel {
        session: Mutex<Session>,
        input_name: String,
        output_name: String,
        input_size: InputSize,
    }

    impl std::fmt::Debug for OnnxModel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OnnxModel")
                .field("input_name", &self.input_name)
                .field("output_name", &self.output_name)
                .field("input_size", &self.input_size)
                .finish()
        }
    }

    impl OnnxModel {
        pub fn load(path: &Path) -> Result<Self> {
            let model_err = |reason: String| {
                VisionError::Model(format!("'{}': {}", path.display(), reason))
            };

            let session = Session::builder()
                .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
                .and_then(|b| b.commit_from_file(path))
                .map_err(|e| model_err(format!("failed to create ONNX session: {}", e)))?;

            let input = session
                .inputs
                .first()
                .ok_or_else(|| model_err("model has no input nodes".to_string()))?;
            let output = session
                .outputs
                .first()
                .ok_or_else(|| model_err("model has no output nodes".to_string()))?;

            // Shape is [batch, channels, height, width]
            let dims: Vec<i64> = match &input.input_type {
                ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
                other => return Err(model_err(format!("unsupported input type {:?}", other))),
            };
            if dims.len() != 4 {
                return Err(model_err(format!("expected NCHW input, got shape {:?}", dims)));
            }
            let (height, width) = (dims[2], dims[3]);
            let input_size = match (u32::try_from(width), u32::try_from(height)) {
                (Ok(w), Ok(h)) if w > 0 && h > 0 => InputSize::new(w, h),
                _ => return Err(VisionError::InvalidInputSize { width, height }),
            };

            let input_name = input.name.clone();
            let output_name = output.name.clone();
            info!(
                model = %path.display(),
                input = %input_name,
                output = %output_name,
                width = input_size.width,
                height = input_size.height,
                "Loaded ONNX model"
            );

            Ok(Self {
                session: Mutex::new(session),
                input_name,
                output_name,
                input_size,
            })
        }
    }

    impl Model for OnnxModel {
        fn input_size(&self) -> InputSize {
            self.input_size
        }

        fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>> {
            let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
            let tensor = TensorRef::from_array_view((dims, input.data.as_slice()))
                .map_err(|e| VisionError::Inference(format!("tensor conversion: {}", e)))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| VisionError::Inference("session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => tensor])
                .map_err(|e| VisionError::Inference(format!("forward pass: {}", e)))?;

            let (_shape, data) = outputs[self.output_name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(|e| VisionError::Inference(format!("output extraction: {}", e)))?;

            Ok(data.to_vec())
        }
    }
}
