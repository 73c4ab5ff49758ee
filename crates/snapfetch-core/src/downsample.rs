use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::DownsampleError;

/// Produces square-bounded copies of downloaded images.
///
/// The copy keeps the source's aspect ratio and fits within
/// `side x side`. The output format follows the destination's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downsampler {
    side: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Downsampled {
    Written { width: u32, height: u32 },
    /// The destination already existed and was left alone.
    AlreadyPresent,
}

impl Downsampler {
    pub fn new(side: u32) -> Self { Self { side: side.max(1) } }

    pub fn downsample(&self, source: &Path, destination: &Path) -> Result<Downsampled, DownsampleError> {
        if destination.exists() {
            return Ok(Downsampled::AlreadyPresent);
        }
        let format = ImageFormat::from_path(destination)
            .map_err(|_| DownsampleError::UnsupportedFormat(destination.to_path_buf()))?;

        let img = ImageReader::open(source)
            .map_err(|e| io_err(source, e))?
            .with_guessed_format()
            .map_err(|e| io_err(source, e))?
            .decode()
            .map_err(|e| DownsampleError::Decode {
                path: source.to_path_buf(),
                source: e,
            })?;

        let resized = img.resize(self.side, self.side, FilterType::Lanczos3);
        let resized = match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let staging = snapfetch_fetch::staging_path(destination)
            .map_err(|_| DownsampleError::UnsupportedFormat(destination.to_path_buf()))?;
        if let Err(source) = resized.save_with_format(&staging, format) {
            let _ = fs::remove_file(&staging);
            return Err(DownsampleError::Encode {
                path: destination.to_path_buf(),
                source,
            });
        }
        fs::rename(&staging, destination).map_err(|e| {
            let _ = fs::remove_file(&staging);
            io_err(destination, e)
        })?;

        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            width = resized.width(),
            height = resized.height(),
            "downsized copy written"
        );
        Ok(Downsampled::Written {
            width:  resized.width(),
            height: resized.height(),
        })
    }
}

fn io_err(path: &Path, source: std::io::Error) -> DownsampleError {
    DownsampleError::Io {
        path: path.to_path_buf(),
        source,
    }
}
