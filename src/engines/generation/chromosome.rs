use crate::config::{AppConfig, CanvasConfig, CrossoverBias, GeneMutation};
use crate::engines::evaluation::PixelScorer;
use crate::engines::generation::gene::Gene;
use crate::error::{GaImageError, Result};
use crate::types::LocusMode;
use image::{Rgba, RgbaImage};
use rand::Rng;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// An ordered sequence of genes that decodes to one candidate painting.
///
/// Fitness and phenotype are memoized. Both caches are dropped by
/// [`Chromosome::reset`], which every mutating operation calls.
#[derive(Debug)]
pub struct Chromosome {
    genes: Vec<Gene>,
    fitness: Option<f64>,
    phenotype: Option<RgbaImage>,
}

// the fitness cache stays valid for identical genes; the raster is re-rendered on demand
impl Clone for Chromosome {
    fn clone(&self) -> Self {
        Self {
            genes: self.genes.clone(),
            fitness: self.fitness,
            phenotype: None,
        }
    }
}

impl Chromosome {
    pub fn random<R: Rng>(gene_count: usize, mode: LocusMode, rng: &mut R) -> Self {
        let genes = (0..gene_count).map(|_| Gene::random(mode, rng)).collect();
        Self::from_genes(genes)
    }

    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: None,
            phenotype: None,
        }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn cached_phenotype(&self) -> Option<&RgbaImage> {
        self.phenotype.as_ref()
    }

    /// Render from scratch and cache the result. Genes are put in paint
    /// order (ascending Z) as a side effect.
    pub fn decode(&mut self, canvas: &CanvasConfig) -> &RgbaImage {
        let image = self.render(canvas);
        self.phenotype.insert(image)
    }

    /// Cached phenotype, decoding first if needed
    pub fn phenotype(&mut self, canvas: &CanvasConfig) -> &RgbaImage {
        let image = match self.phenotype.take() {
            Some(image) => image,
            None => self.render(canvas),
        };
        self.phenotype.insert(image)
    }

    /// Sum of per-pixel scores over the whole canvas. Computed once until
    /// the next [`Chromosome::reset`].
    pub fn calculate_fitness(&mut self, scorer: &dyn PixelScorer, canvas: &CanvasConfig) -> f64 {
        if let Some(fitness) = self.fitness {
            return fitness;
        }

        let phenotype = self.phenotype(canvas);
        let (width, height) = phenotype.dimensions();
        let mut sum = 0.0;
        for y in 0..height {
            for x in 0..width {
                sum += scorer.score(phenotype, x, y);
            }
        }

        self.fitness = Some(sum);
        sum
    }

    pub fn reset(&mut self) {
        self.fitness = None;
        self.phenotype = None;
    }

    pub fn check_genes(&self) -> Result<()> {
        for (i, gene) in self.genes.iter().enumerate() {
            if !gene.check() {
                return Err(GaImageError::InvalidGene(format!(
                    "gene {} has a locus out of [0,1]: {:?}",
                    i,
                    gene.loci()
                )));
            }
        }
        Ok(())
    }

    /// Index where `intersect` switches from `self`'s genes to `other`'s.
    ///
    /// An unevaluated parent counts as fitness 0; two zero-distance parents
    /// split at the midpoint.
    pub fn crossover_point(&self, other: &Chromosome, bias: CrossoverBias) -> usize {
        let n = self.genes.len().min(other.genes.len());
        let f_self = self.fitness.unwrap_or(0.0);
        let f_other = other.fitness.unwrap_or(0.0);
        let total = f_self + f_other;

        let share = if total > 0.0 {
            match bias {
                CrossoverBias::Proportional => f_self / total,
                CrossoverBias::Inverse => f_other / total,
            }
        } else {
            0.5
        };

        ((n as f64 * share) as usize).min(n)
    }

    /// Single-point crossover. The child owns deep copies of its genes.
    pub fn intersect(&self, other: &Chromosome, bias: CrossoverBias) -> Chromosome {
        let n = self.genes.len().min(other.genes.len());
        let split = self.crossover_point(other, bias);

        let genes = self.genes[..split]
            .iter()
            .chain(&other.genes[split..n])
            .cloned()
            .collect();

        Chromosome::from_genes(genes)
    }

    /// Mutate `count` randomly chosen gene slots and drop the caches
    pub fn mutate<R: Rng>(&mut self, count: usize, config: &AppConfig, rng: &mut R) {
        if !self.genes.is_empty() {
            for _ in 0..count {
                let slot = rng.gen_range(0..self.genes.len());
                match config.evolution.gene_mutation {
                    GeneMutation::Perturb => {
                        self.genes[slot].mutate(config.evolution.loci_per_mutation, rng)
                    }
                    GeneMutation::Replace => {
                        self.genes[slot] = Gene::random(config.canvas.locus_mode, rng)
                    }
                }
            }
        }
        self.reset();
    }

    fn render(&mut self, canvas: &CanvasConfig) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(canvas.width, canvas.height, BACKGROUND);

        self.genes.sort_by(|a, b| a.z().total_cmp(&b.z()));
        for gene in &self.genes {
            gene.shape(canvas).draw_on(&mut image, canvas.use_alpha);
        }
        image
    }
}
