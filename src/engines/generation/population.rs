use crate::config::{AppConfig, SelectionMethod};
use crate::data::checkpoint::{self, PopulationDump};
use crate::engines::evaluation::PixelScorer;
use crate::engines::generation::{
    chromosome::Chromosome,
    operators::{roulette_selection, tournament_selection},
};
use crate::error::{GaImageError, Result};
use crate::types::ColorChannel;
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// A fixed-size generation of chromosomes scored against one target.
///
/// Fitness evaluation fans out over rayon; sorting, selection and
/// succession run on the calling thread once every individual is scored.
pub struct Population {
    config: Arc<AppConfig>,
    name: String,
    generation: usize,
    individuals: Vec<Chromosome>,
    scorer: Arc<dyn PixelScorer>,
    rng: StdRng,
}

impl Population {
    pub fn new(config: Arc<AppConfig>, name: impl Into<String>, scorer: Arc<dyn PixelScorer>) -> Result<Self> {
        scorer.check_canvas(&config.canvas)?;
        let name = name.into();
        let mut rng = Self::seeded_rng(&config, &name, 0);
        let individuals = (0..config.evolution.population_size)
            .map(|_| Chromosome::random(config.evolution.gene_count, config.canvas.locus_mode, &mut rng))
            .collect();

        Ok(Self {
            config,
            name,
            generation: 0,
            individuals,
            scorer,
            rng,
        })
    }

    pub fn from_individuals(
        config: Arc<AppConfig>,
        name: impl Into<String>,
        generation: usize,
        individuals: Vec<Chromosome>,
        scorer: Arc<dyn PixelScorer>,
    ) -> Result<Self> {
        if individuals.is_empty() {
            return Err(GaImageError::Configuration(
                "A population needs at least one individual".to_string()
            ));
        }
        scorer.check_canvas(&config.canvas)?;
        let name = name.into();
        let rng = Self::seeded_rng(&config, &name, generation);

        Ok(Self {
            config,
            name,
            generation,
            individuals,
            scorer,
            rng,
        })
    }

    /// Bind a parsed checkpoint to the active configuration. Gene and
    /// population sizes must match what the configuration would produce.
    pub fn from_dump(
        dump: PopulationDump,
        config: Arc<AppConfig>,
        scorer: Arc<dyn PixelScorer>,
    ) -> Result<Self> {
        let expected_size = config.evolution.population_size;
        if dump.individuals.len() != expected_size {
            return Err(GaImageError::Configuration(format!(
                "Checkpoint holds {} individuals, configuration expects {}",
                dump.individuals.len(),
                expected_size
            )));
        }

        let expected_genes = config.evolution.gene_count;
        if let Some(c) = dump.individuals.iter().find(|c| c.len() != expected_genes) {
            return Err(GaImageError::Configuration(format!(
                "Checkpoint chromosome has {} genes, configuration expects {}",
                c.len(),
                expected_genes
            )));
        }

        Self::from_individuals(config, dump.name, dump.generation, dump.individuals, scorer)
    }

    /// Read a checkpoint and rebuild the population. `scorer_for` receives
    /// the stored population name so the caller can pick the matching scorer.
    pub fn restore<R, F>(input: R, config: Arc<AppConfig>, scorer_for: F) -> Result<Self>
    where
        R: BufRead,
        F: FnOnce(&str) -> Arc<dyn PixelScorer>,
    {
        let dump = checkpoint::read_population(input, config.canvas.locus_mode)?;
        let scorer = scorer_for(&dump.name);
        Self::from_dump(dump, config, scorer)
    }

    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        checkpoint::write_population(&self.name, self.generation, self.individuals.iter(), out)
    }

    /// Reseed the selection/mutation stream
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> Option<ColorChannel> {
        ColorChannel::from_tag(&self.name)
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn individuals(&self) -> &[Chromosome] {
        &self.individuals
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Score every individual (memoized). Returns once all are done.
    pub fn evaluate(&mut self) {
        let scorer = self.scorer.as_ref();
        let canvas = &self.config.canvas;
        self.individuals.par_iter_mut().for_each(|c| {
            c.calculate_fitness(scorer, canvas);
        });
    }

    /// Advance one generation: evaluate, sort, keep elites, breed the rest.
    pub fn next(&mut self) {
        self.evaluate();
        self.sort_by_fitness();

        let config = Arc::clone(&self.config);
        let evolution = &config.evolution;
        let size = evolution.population_size;
        let elite_count = evolution.elite_count.min(self.individuals.len()).min(size);
        let mutated_genes = evolution.mutated_gene_count();

        let mut next = Vec::with_capacity(size);
        next.extend(self.individuals[..elite_count].iter().cloned());

        let fitnesses: Vec<f64> = self.individuals.iter().map(distance).collect();
        let mut mutations = 0usize;
        while next.len() < size {
            let i1 = self.select(&fitnesses);
            let i2 = self.select(&fitnesses);
            let mut child = self.individuals[i1].intersect(&self.individuals[i2], evolution.crossover_bias);
            if self.rng.gen::<f64>() < evolution.mutate_probability {
                child.mutate(mutated_genes, &config, &mut self.rng);
                mutations += 1;
            }
            next.push(child);
        }

        log::debug!(
            "[{}] generation {}: best {:.0}, {} elites, {} children ({} mutated)",
            self.name,
            self.generation,
            fitnesses.first().copied().unwrap_or_default(),
            elite_count,
            size - elite_count,
            mutations
        );

        self.individuals = next;
        self.generation += 1;
    }

    /// Best individual of the current generation
    pub fn survivor(&mut self) -> &Chromosome {
        self.evaluate();
        self.sort_by_fitness();
        &self.individuals[0]
    }

    /// Rendered phenotype of the best individual
    pub fn survivor_phenotype(&mut self) -> &RgbaImage {
        self.evaluate();
        self.sort_by_fitness();
        let canvas = &self.config.canvas;
        self.individuals[0].phenotype(canvas)
    }

    pub fn best_fitness(&mut self) -> f64 {
        self.survivor().fitness().unwrap_or_default()
    }

    pub fn average_fitness(&mut self) -> f64 {
        self.evaluate();
        let sum: f64 = self.individuals.iter().map(distance).sum();
        sum / self.individuals.len() as f64
    }

    fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
    }

    fn select(&mut self, fitnesses: &[f64]) -> usize {
        match self.config.evolution.selection_method {
            SelectionMethod::Roulette => roulette_selection(fitnesses, &mut self.rng),
            SelectionMethod::Tournament => {
                tournament_selection(fitnesses, self.config.evolution.tournament_size, &mut self.rng)
            }
        }
    }

    /// Seeded stream for one population. Channels get distinct streams, and
    /// a population resumed at a later generation does not replay the
    /// stream a fresh run starts with.
    fn seeded_rng(config: &AppConfig, name: &str, generation: usize) -> StdRng {
        match config.evolution.seed {
            Some(seed) => {
                let offset = ColorChannel::from_tag(name).map_or(0, |c| c.index() as u64 + 1);
                let resumed = (generation as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                StdRng::seed_from_u64(seed.wrapping_add(offset).wrapping_add(resumed))
            }
            None => StdRng::from_entropy(),
        }
    }
}

fn distance(c: &Chromosome) -> f64 {
    c.fitness().unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocusMode;

    fn tiny_config() -> Arc<AppConfig> {
        let mut config = AppConfig::default();
        config.canvas.width = 12;
        config.canvas.height = 12;
        config.canvas.shape_size_min = 2.0;
        config.canvas.shape_size_max = 6.0;
        config.evolution.population_size = 8;
        config.evolution.elite_count = 2;
        config.evolution.gene_count = 6;
        config.evolution.mutate_probability = 0.5;
        config.evolution.seed = Some(5);
        Arc::new(config)
    }

    fn darkness() -> Arc<dyn PixelScorer> {
        Arc::new(|img: &RgbaImage, x: u32, y: u32| img.get_pixel(x, y).0[0] as f64)
    }

    #[test]
    fn test_new_population_shape() {
        let population = Population::new(tiny_config(), "r", darkness()).unwrap();
        assert_eq!(population.len(), 8);
        assert_eq!(population.generation(), 0);
        assert_eq!(population.channel(), Some(ColorChannel::Red));
        assert!(population.individuals().iter().all(|c| c.len() == 6));
        assert!(population.individuals().iter().all(|c| c.genes()[0].len() == LocusMode::Monochrome.locus_count()));
    }

    #[test]
    fn test_evaluate_scores_everyone() {
        let mut population = Population::new(tiny_config(), "", darkness()).unwrap();
        population.evaluate();
        assert!(population.individuals().iter().all(|c| c.is_evaluated()));
    }

    #[test]
    fn test_next_keeps_size_and_elites() {
        let mut population = Population::new(tiny_config(), "", darkness()).unwrap();
        let best_before = population.survivor().clone();

        population.next();

        assert_eq!(population.len(), 8);
        assert_eq!(population.generation(), 1);
        assert_eq!(population.individuals()[0].genes(), best_before.genes());
    }

    #[test]
    fn test_best_fitness_never_regresses() {
        let mut population = Population::new(tiny_config(), "", darkness()).unwrap();
        let mut best = population.best_fitness();
        for _ in 0..10 {
            population.next();
            let current = population.best_fitness();
            assert!(current <= best);
            best = current;
        }
    }

    #[test]
    fn test_tournament_selection_runs() {
        let mut config = (*tiny_config()).clone();
        config.evolution.selection_method = SelectionMethod::Tournament;
        config.evolution.tournament_size = 3;
        let mut population = Population::new(Arc::new(config), "", darkness()).unwrap();
        population.next();
        population.next();
        assert_eq!(population.generation(), 2);
        assert_eq!(population.len(), 8);
    }

    #[test]
    fn test_average_is_mean_of_fitness() {
        let mut population = Population::new(tiny_config(), "", darkness()).unwrap();
        let average = population.average_fitness();
        let manual: f64 = population
            .individuals()
            .iter()
            .map(|c| c.fitness().unwrap())
            .sum::<f64>()
            / 8.0;
        assert_eq!(average, manual);
    }

    #[test]
    fn test_from_individuals_rejects_empty() {
        let result = Population::from_individuals(tiny_config(), "", 0, Vec::new(), darkness());
        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_populations_are_reproducible() {
        let a = Population::new(tiny_config(), "g", darkness()).unwrap();
        let b = Population::new(tiny_config(), "g", darkness()).unwrap();
        let c = Population::new(tiny_config(), "b", darkness()).unwrap();
        assert_eq!(a.individuals()[0].genes(), b.individuals()[0].genes());
        assert_ne!(a.individuals()[0].genes(), c.individuals()[0].genes());
    }

    #[test]
    fn test_resumed_population_uses_a_fresh_stream() {
        let config = tiny_config();
        let mut fresh = Population::seeded_rng(&config, "r", 0);
        let mut again = Population::seeded_rng(&config, "r", 0);
        let mut resumed = Population::seeded_rng(&config, "r", 3);

        let first: u64 = fresh.gen();
        assert_eq!(first, again.gen::<u64>());
        assert_ne!(first, resumed.gen::<u64>());
    }

    #[test]
    fn test_population_rejects_mismatched_target() {
        use crate::engines::evaluation::{ScoreKind, TargetScorer};
        use crate::error::GaImageError;

        let small: Arc<dyn PixelScorer> = Arc::new(TargetScorer::new(
            Arc::new(RgbaImage::new(4, 4)),
            ScoreKind::Grayscale,
        ));
        assert!(matches!(
            Population::new(tiny_config(), "", Arc::clone(&small)),
            Err(GaImageError::Configuration(_))
        ));
        let blanks = vec![Chromosome::from_genes(Vec::new())];
        assert!(Population::from_individuals(tiny_config(), "", 0, blanks, small).is_err());
    }
}
