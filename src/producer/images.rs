use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use image::imageops::FilterType;
use log::error;
use tokio::sync::Semaphore;

use crate::config::Config;

/// One successfully processed listing image.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub filename: String,
    pub url: String,
}

/// Shrinks operator-supplied images to the mobile bound and re-encodes
/// them under the data directory. Each transform is independent and writes
/// only its own output file.
pub struct ImageProcessor {
    max_dimension: u32,
    quality: u8,
    concurrency: usize,
    raw_base_url: String,
}

impl ImageProcessor {
    pub fn new(config: &Config) -> ImageProcessor {
        ImageProcessor {
            max_dimension: config.image_max_dimension,
            quality: config.image_quality,
            concurrency: config.image_concurrency as usize,
            raw_base_url: config.raw_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Processes the batch concurrently, capped by the configured number of
    /// blocking transforms. One image failing is logged and skipped; the
    /// property keeps whatever links succeeded.
    pub async fn process_batch(
        &self,
        property_id: &str,
        inputs: &[PathBuf],
        output_dir: &Path,
    ) -> Vec<ProcessedImage> {
        let sem = Arc::new(Semaphore::new(self.concurrency));

        let mut handles = Vec::new();
        for input in inputs {
            let permit = Arc::clone(&sem).acquire_owned().await;

            let input = input.clone();
            let output_dir = output_dir.to_path_buf();
            let max_dimension = self.max_dimension;
            let quality = self.quality;

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                transform(&input, &output_dir, max_dimension, quality)
            }));
        }

        let mut processed = Vec::new();
        for (input, joined) in inputs.iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(filename)) => {
                    let url = format!(
                        "{}/img/{}/{}",
                        self.raw_base_url, property_id, filename
                    );
                    processed.push(ProcessedImage { filename, url });
                }
                Ok(Err(e)) => error!("Error while processing image {}: {}", input.display(), e),
                Err(e) => error!("Image task failed for {}: {}", input.display(), e),
            }
        }
        processed
    }
}

/// Fit within the square bound without enlargement, flatten to RGB and
/// write as JPEG with a timestamped filename so re-uploads never collide.
fn transform(input: &Path, output_dir: &Path, max_dimension: u32, quality: u8) -> Result<String> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create image dir {}", output_dir.display()))?;

    let img = image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let resized = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    let filename = format!("{}_{}.jpg", Utc::now().timestamp_millis(), stem);
    let output_path = output_dir.join(&filename);

    let mut out = std::fs::File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    image::DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_with_encoder(encoder)
        .with_context(|| format!("failed to encode {}", output_path.display()))?;

    Ok(filename)
}
