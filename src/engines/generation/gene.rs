use crate::config::CanvasConfig;
use crate::engines::generation::shape::Shape;
use crate::error::{GaImageError, Result};
use crate::types::{Locus, LocusMode};
use rand::Rng;

/// One shape's parameter vector.
///
/// Every locus lives in [0,1]. The vector length is fixed by the
/// [`LocusMode`] the gene was created for (7 monochrome, 10 colored).
/// `Clone` is a deep copy, so a cloned gene can be mutated freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    loci: Vec<f64>,
}

impl Gene {
    pub fn random<R: Rng>(mode: LocusMode, rng: &mut R) -> Self {
        let loci = (0..mode.locus_count()).map(|_| rng.gen::<f64>()).collect();
        Self { loci }
    }

    /// Build a gene from explicit values, rejecting wrong lengths and
    /// out-of-range loci.
    pub fn from_loci(loci: Vec<f64>, mode: LocusMode) -> Result<Self> {
        if loci.len() != mode.locus_count() {
            return Err(GaImageError::LocusCountMismatch {
                expected: mode.locus_count(),
                found: loci.len(),
            });
        }
        let gene = Self { loci };
        gene.validate()?;
        Ok(gene)
    }

    pub fn loci(&self) -> &[f64] {
        &self.loci
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    /// Value of a locus, `None` when the gene's mode does not carry it
    pub fn get(&self, locus: Locus) -> Option<f64> {
        self.loci.get(locus.index()).copied()
    }

    /// Paint order key
    pub fn z(&self) -> f64 {
        self.get(Locus::Z).unwrap_or(0.0)
    }

    /// Re-roll `count` randomly chosen loci (the same locus may be hit twice)
    pub fn mutate<R: Rng>(&mut self, count: usize, rng: &mut R) {
        if self.loci.is_empty() {
            return;
        }
        for _ in 0..count {
            let n = rng.gen_range(0..self.loci.len());
            self.loci[n] = rng.gen::<f64>();
        }
    }

    pub fn check(&self) -> bool {
        self.loci.iter().all(|p| (0.0..=1.0).contains(p))
    }

    pub fn validate(&self) -> Result<()> {
        if self.check() {
            Ok(())
        } else {
            Err(GaImageError::InvalidGene(format!("locus out of [0,1]: {:?}", self.loci)))
        }
    }

    pub fn shape(&self, canvas: &CanvasConfig) -> Shape {
        Shape::from_gene(self, canvas)
    }
}
