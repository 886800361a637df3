use crate::config::CanvasConfig;
use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::Path;

/// Load the target image as RGBA8, resized to the canvas when needed.
pub fn load_target<P: AsRef<Path>>(path: P, canvas: &CanvasConfig) -> Result<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();

    if image.dimensions() == (canvas.width, canvas.height) {
        log::info!("Loaded target {} ({}x{})", path.display(), canvas.width, canvas.height);
        return Ok(image);
    }

    log::warn!(
        "Target {} is {}x{}, resizing to the {}x{} canvas",
        path.display(),
        image.width(),
        image.height(),
        canvas.width,
        canvas.height
    );
    Ok(imageops::resize(&image, canvas.width, canvas.height, FilterType::Triangle))
}

pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, ImageFormat::Png)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
