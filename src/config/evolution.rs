use super::traits::{check_unit_interval, ConfigSection};
use crate::error::GaImageError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elite_count: usize,
    pub gene_count: usize,
    pub mutate_probability: f64,
    pub mutate_ratio: f64,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    pub gene_mutation: GeneMutation,
    pub loci_per_mutation: usize,
    pub crossover_bias: CrossoverBias,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    Roulette,
    Tournament,
}

/// What chromosome mutation does to a chosen gene slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneMutation {
    /// Re-roll some loci of the existing gene
    Perturb,
    /// Put a brand new random gene in the slot
    Replace,
}

/// Which parent's fitness share decides the crossover split point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossoverBias {
    /// split = floor(n * f_self / (f_self + f_other))
    Proportional,
    /// split = floor(n * f_other / (f_self + f_other)), fitter parent gives more genes
    Inverse,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            generations: 500,
            elite_count: 10,
            gene_count: 300,
            mutate_probability: 0.2,
            mutate_ratio: 0.5,
            selection_method: SelectionMethod::Roulette,
            tournament_size: 2,
            gene_mutation: GeneMutation::Perturb,
            loci_per_mutation: 1,
            crossover_bias: CrossoverBias::Proportional,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Number of genes touched when a child is selected for mutation
    pub fn mutated_gene_count(&self) -> usize {
        (self.gene_count as f64 * self.mutate_ratio) as usize
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), GaImageError> {
        if self.population_size == 0 {
            return Err(GaImageError::Configuration(
                "Population size must be at least 1".to_string()
            ));
        }
        if self.elite_count > self.population_size {
            return Err(GaImageError::Configuration(format!(
                "Elite count ({}) cannot exceed population size ({})",
                self.elite_count, self.population_size
            )));
        }
        if self.gene_count == 0 {
            return Err(GaImageError::Configuration(
                "Gene count must be at least 1".to_string()
            ));
        }
        if self.tournament_size == 0 {
            return Err(GaImageError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        if self.loci_per_mutation == 0 {
            return Err(GaImageError::Configuration(
                "Loci per mutation must be at least 1".to_string()
            ));
        }
        check_unit_interval(Self::section_name(), "mutate_probability", self.mutate_probability)?;
        check_unit_interval(Self::section_name(), "mutate_ratio", self.mutate_ratio)?;
        Ok(())
    }
}
