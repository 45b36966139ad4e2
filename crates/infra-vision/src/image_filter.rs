// Supported-image extension filter for streamed paths

use batchcls_core::port::ItemFilter;
use std::path::Path;

/// Raster formats plus the common geospatial raster extensions
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bmp", "dib", "jpeg", "jpg", "jpe", "jp2", "png", "webp", "pbm", "pgm", "ppm", "pxm", "pnm",
    "sr", "ras", "tiff", "tif", "exr", "hdr", "pic", "dt0", "dt1", "dt2", "img", "j2k", "ecw",
];

/// Check an extension (with or without the leading dot), case-insensitive
pub fn is_supported_image_extension(extension: &str) -> bool {
    let extension = extension.strip_prefix('.').unwrap_or(extension);
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
}

/// Accepts lines whose path ends in a supported image extension
#[derive(Debug, Default, Clone, Copy)]
pub struct SupportedImageFilter;

impl ItemFilter for SupportedImageFilter {
    fn accepts(&self, candidate: &str) -> bool {
        Path::new(candidate)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_supported_image_extension)
    }
}
