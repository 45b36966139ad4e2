// Image loading: file checks, decode, resize and normalize

use crate::error::{Result, VisionError};
use crate::model::{ImageTensor, InputSize};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs;
use std::path::Path;

/// Loads images from disk with a size guard
#[derive(Debug, Clone)]
pub struct ImageLoader {
    max_file_size: u64,
}

impl ImageLoader {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Check the path, then decode by content (not by extension)
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DynamicImage> {
        let path = path.as_ref();

        let metadata = fs::metadata(path).map_err(|_| VisionError::NotRegularFile)?;
        if !metadata.is_file() {
            return Err(VisionError::NotRegularFile);
        }

        let size = metadata.len();
        if size == 0 {
            return Err(VisionError::EmptyFile);
        }
        if size > self.max_file_size {
            return Err(VisionError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(image)
    }
}

/// Resize to the model input, convert to RGB, scale to [0, 1], lay out as NCHW
pub fn preprocess(image: &DynamicImage, size: InputSize) -> ImageTensor {
    let rgb = image
        .resize_exact(size.width, size.height, FilterType::Triangle)
        .to_rgb8();

    let plane = size.width as usize * size.height as usize;
    let mut data = vec![0.0f32; ImageTensor::CHANNELS * plane];

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let offset = y as usize * size.width as usize + x as usize;
        for c in 0..ImageTensor::CHANNELS {
            data[c * plane + offset] = f32::from(pixel[c]) / 255.0;
        }
    }

    ImageTensor { size, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Write;

    fn write_png(dir: &Path, name: &str, color: [u8; 3]) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(8, 6, Rgb(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_valid_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "red.png", [255, 0, 0]);

        let image = ImageLoader::new(1024 * 1024).load(&path).unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
    }

    #[test]
    fn test_content_sniffing_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), "real.png", [0, 255, 0]);
        let disguised = dir.path().join("actually_png.jpg");
        fs::copy(&png, &disguised).unwrap();

        assert!(ImageLoader::new(1024 * 1024).load(&disguised).is_ok());
    }

    #[test]
    fn test_missing_and_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(1024);

        assert!(matches!(
            loader.load(dir.path().join("nope.png")),
            Err(VisionError::NotRegularFile)
        ));
        assert!(matches!(loader.load(dir.path()), Err(VisionError::NotRegularFile)));
    }

    #[test]
    fn test_empty_and_oversized_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        fs::File::create(&empty).unwrap();

        let big = dir.path().join("big.png");
        let mut f = fs::File::create(&big).unwrap();
        f.write_all(&[0u8; 2048]).unwrap();

        let loader = ImageLoader::new(1024);
        assert!(matches!(loader.load(&empty), Err(VisionError::EmptyFile)));
        assert!(matches!(
            loader.load(&big),
            Err(VisionError::FileTooLarge { size: 2048, limit: 1024 })
        ));
    }

    #[test]
    fn test_garbage_fails_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = ImageLoader::new(1024).load(&path).unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
        assert!(err.to_string().starts_with("could not read or decode image"));
    }

    #[test]
    fn test_preprocess_layout_and_range() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([255, 0, 51])));
        let tensor = preprocess(&image, InputSize::new(4, 2));

        assert_eq!(tensor.shape(), [1, 3, 2, 4]);
        assert_eq!(tensor.data.len(), 3 * 2 * 4);
        assert!(tensor.plane(0).iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!(tensor.plane(1).iter().all(|v| v.abs() < 1e-6));
        assert!(tensor.plane(2).iter().all(|v| (*v - 0.2).abs() < 1e-6));
    }
}
