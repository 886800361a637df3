use crate::config::AppConfig;
use crate::engines::evaluation::{PixelScorer, ScoreKind, TargetScorer};
use crate::engines::generation::population::Population;
use crate::error::{GaImageError, Result};
use crate::types::ColorChannel;
use image::{Rgba, RgbaImage};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

pub trait ProgressCallback: Send {
    fn on_run_start(&mut self, _population: &mut Population) -> Result<()> {
        Ok(())
    }
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, population: &mut Population) -> Result<()>;
}

/// Outcome of one population's run, written next to the images as JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub start_generation: usize,
    pub final_generation: usize,
    pub best_fitness: f64,
    /// Average fitness before the first step, then after every step
    pub average_fitness: Vec<f64>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn generations_run(&self) -> usize {
        self.final_generation - self.start_generation
    }
}

/// Result of a three-channel run
pub struct ChannelRun {
    /// Red, green and blue populations, in that order
    pub populations: Vec<Population>,
    pub summaries: Vec<RunSummary>,
    pub image: RgbaImage,
}

/// Drives populations to the configured generation count.
pub struct EvolutionEngine {
    config: Arc<AppConfig>,
    cancel: Arc<AtomicBool>,
}

impl EvolutionEngine {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared flag; setting it stops every run of this engine after the
    /// current generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Step `population` from its current generation up to the configured
    /// total. A restored population continues where its checkpoint left off.
    pub fn run<C: ProgressCallback + ?Sized>(
        &self,
        population: &mut Population,
        callback: &mut C,
    ) -> Result<RunSummary> {
        let start_generation = population.generation();
        let target = self.config.evolution.generations;

        let mut average_fitness = vec![population.average_fitness()];
        callback.on_run_start(population)?;

        let mut cancelled = false;
        while population.generation() < target {
            if self.is_cancelled() {
                log::warn!(
                    "[{}] cancelled at generation {}",
                    population.name(),
                    population.generation()
                );
                cancelled = true;
                break;
            }

            callback.on_generation_start(population.generation());
            population.next();
            average_fitness.push(population.average_fitness());
            callback.on_generation_complete(population)?;
        }

        Ok(RunSummary {
            name: population.name().to_string(),
            start_generation,
            final_generation: population.generation(),
            best_fitness: population.best_fitness(),
            average_fitness,
            cancelled,
        })
    }

    /// Evolve red, green and blue populations concurrently, each scored on
    /// its own channel, then merge their best renders.
    pub fn run_separately<F>(&self, target: Arc<RgbaImage>, callback_for: F) -> Result<ChannelRun>
    where
        F: Fn(ColorChannel) -> Box<dyn ProgressCallback> + Sync,
    {
        if !self.config.canvas.locus_mode.is_monochrome() {
            return Err(GaImageError::Configuration(
                "Separate channel runs require the monochrome locus mode".to_string()
            ));
        }
        self.check_target(&target)?;

        let outcomes = thread::scope(|s| -> Result<Vec<(Population, RunSummary)>> {
            let mut handles = Vec::with_capacity(ColorChannel::ALL.len());
            for channel in ColorChannel::ALL {
                let target = Arc::clone(&target);
                let callback_for = &callback_for;
                let handle = thread::Builder::new()
                    .name(format!("channel-{}", channel.tag()))
                    .spawn_scoped(s, move || self.run_channel(channel, target, callback_for(channel)))?;
                handles.push(handle);
            }

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| GaImageError::Worker("channel thread panicked".to_string()))
                        .and_then(|outcome| outcome)
                })
                .collect()
        })?;

        let (mut populations, summaries): (Vec<_>, Vec<_>) = outcomes.into_iter().unzip();
        let count = populations.len();
        let image = match populations.as_mut_slice() {
            [red, green, blue] => combine_channels(
                red.survivor_phenotype(),
                green.survivor_phenotype(),
                blue.survivor_phenotype(),
            ),
            _ => {
                return Err(GaImageError::Worker(format!(
                    "expected 3 channel populations, got {}",
                    count
                )))
            }
        };

        Ok(ChannelRun {
            populations,
            summaries,
            image,
        })
    }

    fn run_channel(
        &self,
        channel: ColorChannel,
        target: Arc<RgbaImage>,
        mut callback: Box<dyn ProgressCallback>,
    ) -> Result<(Population, RunSummary)> {
        let scorer: Arc<dyn PixelScorer> = Arc::new(TargetScorer::new(target, ScoreKind::Channel(channel)));
        let mut population = Population::new(Arc::clone(&self.config), channel.tag(), scorer)?;
        log::debug!("[{}] starting channel run", channel);
        let summary = self.run(&mut population, &mut *callback)?;
        Ok((population, summary))
    }

    pub fn check_target(&self, target: &RgbaImage) -> Result<()> {
        let canvas = &self.config.canvas;
        if target.dimensions() != (canvas.width, canvas.height) {
            return Err(GaImageError::Configuration(format!(
                "Target is {}x{} but the canvas is {}x{}",
                target.width(),
                target.height(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(())
    }
}

/// Take R from `red`, G from `green` and B from `blue`; alpha is opaque.
pub fn combine_channels(red: &RgbaImage, green: &RgbaImage, blue: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(red.width(), red.height(), |x, y| {
        Rgba([
            red.get_pixel(x, y).0[0],
            green.get_pixel(x, y).0[1],
            blue.get_pixel(x, y).0[2],
            255,
        ])
    })
}
