// batchcls Infrastructure - Vision Adapters
// Implements: Processor (classification), ItemFilter (image extensions), Model (ONNX)

pub mod byte_size;
pub mod class_names;
pub mod classifier;
pub mod error;
pub mod image_filter;
pub mod image_loader;
pub mod model;
pub mod onnx;
pub mod postprocess;

pub use byte_size::{parse_byte_size, ByteSizeError};
pub use class_names::ClassNames;
pub use classifier::{ClassifierConfig, ClassifyProcessor};
pub use error::VisionError;
pub use image_filter::SupportedImageFilter;
pub use image_loader::ImageLoader;
pub use model::{ImageTensor, InputSize, Model};
pub use onnx::load_model;
pub use postprocess::Prediction;
