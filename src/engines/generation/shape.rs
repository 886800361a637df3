use crate::config::CanvasConfig;
use crate::engines::generation::gene::Gene;
use crate::types::{Locus, LocusMode};
use image::{Rgba, RgbaImage};

/// Geometry and paint shared by every shape kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub center: (f64, f64),
    pub size: (f64, f64),
    pub color: Rgba<u8>,
}

/// Read-only view of a gene as something that can be painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangle(Geometry),
    /// Axis-aligned ellipse inscribed in the bounding box
    Circle(Geometry),
}

impl Shape {
    pub fn from_gene(gene: &Gene, canvas: &CanvasConfig) -> Self {
        let locus = |l: Locus| gene.get(l).unwrap_or(0.0);

        let color = match canvas.locus_mode {
            LocusMode::Monochrome => {
                let v = to_channel(locus(Locus::R));
                Rgba([v, v, v, u8::MAX])
            }
            LocusMode::Colored => {
                let r = to_channel(locus(Locus::R));
                Rgba([
                    r,
                    gene.get(Locus::G).map(to_channel).unwrap_or(r),
                    gene.get(Locus::B).map(to_channel).unwrap_or(r),
                    gene.get(Locus::A).map(to_channel).unwrap_or(u8::MAX),
                ])
            }
        };

        let geometry = Geometry {
            center: (
                locus(Locus::X) * canvas.width as f64,
                locus(Locus::Y) * canvas.height as f64,
            ),
            size: (
                canvas.shape_extent(locus(Locus::Width)),
                canvas.shape_extent(locus(Locus::Height)),
            ),
            color,
        };

        if locus(Locus::Kind) < 0.5 {
            Shape::Rectangle(geometry)
        } else {
            Shape::Circle(geometry)
        }
    }

    pub fn geometry(&self) -> &Geometry {
        match self {
            Shape::Rectangle(g) | Shape::Circle(g) => g,
        }
    }

    /// Membership test for a point already inside the bounding box
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Shape::Rectangle(_) => true,
            Shape::Circle(g) => {
                let (cx, cy) = g.center;
                let (w, h) = g.size;
                let aspect = w / h;
                let radius = w / 2.0;
                (x - cx).powi(2) + ((y - cy) * aspect).powi(2) < radius * radius
            }
        }
    }

    /// Paint onto `image` in place. Pixels outside the canvas are skipped.
    pub fn draw_on(&self, image: &mut RgbaImage, use_alpha: bool) {
        let g = *self.geometry();
        let (cx, cy) = g.center;
        let (w, h) = g.size;
        let (width, height) = image.dimensions();

        let rows = h.ceil().max(0.0) as u32;
        let cols = w.ceil().max(0.0) as u32;

        for j in 0..rows {
            let y = cy - h / 2.0 + j as f64;
            if y < 0.0 || y >= height as f64 {
                continue;
            }
            let yi = y as u32;
            for i in 0..cols {
                let x = cx - w / 2.0 + i as f64;
                if x < 0.0 || x >= width as f64 {
                    continue;
                }
                if self.contains(x, y) {
                    blend(image.get_pixel_mut(x as u32, yi), g.color, use_alpha);
                }
            }
        }
    }
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, use_alpha: bool) {
    if use_alpha {
        let a = color.0[3] as f64 / 255.0;
        for c in 0..3 {
            let base = pixel.0[c] as f64;
            pixel.0[c] = (base * (1.0 - a) + color.0[c] as f64 * a).round() as u8;
        }
    } else {
        pixel.0[..3].copy_from_slice(&color.0[..3]);
    }
    pixel.0[3] = u8::MAX;
}
