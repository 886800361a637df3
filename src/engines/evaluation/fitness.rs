use crate::config::CanvasConfig;
use crate::error::{GaImageError, Result};
use crate::types::{ColorChannel, LocusMode};
use image::RgbaImage;
use std::sync::Arc;

/// Per-pixel distance between a rendered phenotype and whatever the scorer
/// compares it to. Summed over the canvas this is a chromosome's fitness,
/// so lower is better.
pub trait PixelScorer: Send + Sync {
    fn score(&self, phenotype: &RgbaImage, x: u32, y: u32) -> f64;

    /// Reject a canvas the scorer cannot address every pixel of
    fn check_canvas(&self, _canvas: &CanvasConfig) -> Result<()> {
        Ok(())
    }
}

impl<F> PixelScorer for F
where
    F: Fn(&RgbaImage, u32, u32) -> f64 + Send + Sync,
{
    fn score(&self, phenotype: &RgbaImage, x: u32, y: u32) -> f64 {
        self(phenotype, x, y)
    }
}

/// How a [`TargetScorer`] measures a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// Luma of the target against the rendered red channel
    Grayscale,
    /// One channel of the target against the same rendered channel
    Channel(ColorChannel),
    /// Sum of absolute differences over R, G and B
    Color,
}

impl ScoreKind {
    /// Scoring used for a population with the given name: channel tags
    /// score their channel, anything else depends on the locus mode.
    pub fn for_population(name: &str, mode: LocusMode) -> Self {
        if name == "grayscale" {
            return ScoreKind::Grayscale;
        }
        if let Some(channel) = ColorChannel::from_tag(name) {
            return ScoreKind::Channel(channel);
        }
        match mode {
            LocusMode::Monochrome => ScoreKind::Grayscale,
            LocusMode::Colored => ScoreKind::Color,
        }
    }
}

/// Scores phenotypes against a shared, read-only target image
#[derive(Debug, Clone)]
pub struct TargetScorer {
    target: Arc<RgbaImage>,
    kind: ScoreKind,
}

impl TargetScorer {
    pub fn new(target: Arc<RgbaImage>, kind: ScoreKind) -> Self {
        Self { target, kind }
    }

    pub fn for_population(target: Arc<RgbaImage>, name: &str, mode: LocusMode) -> Self {
        Self::new(target, ScoreKind::for_population(name, mode))
    }

}

impl PixelScorer for TargetScorer {
    fn check_canvas(&self, canvas: &CanvasConfig) -> Result<()> {
        if self.target.dimensions() != (canvas.width, canvas.height) {
            return Err(GaImageError::Configuration(format!(
                "Target is {}x{} but the canvas is {}x{}",
                self.target.width(),
                self.target.height(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(())
    }

    fn score(&self, phenotype: &RgbaImage, x: u32, y: u32) -> f64 {
        let t = self.target.get_pixel(x, y).0;
        let r = phenotype.get_pixel(x, y).0;
        let diff = |c: usize| (t[c] as f64 - r[c] as f64).abs();

        match self.kind {
            ScoreKind::Grayscale => {
                // integer weights keep a perfect match at exactly 0
                let gray = (t[0] as f64 * 30.0 + t[1] as f64 * 59.0 + t[2] as f64 * 11.0) / 100.0;
                (gray - r[0] as f64).abs()
            }
            ScoreKind::Channel(channel) => diff(channel.index()),
            ScoreKind::Color => diff(0) + diff(1) + diff(2),
        }
    }
}
