use super::evolution_engine::ProgressCallback;
use super::population::Population;
use crate::data::snapshots::SnapshotWriter;
use crate::error::Result;

/// Logs the generation average. Only one population of a multi-channel run
/// needs to report, so the others can be built with `reporting = false`.
pub struct LogProgressCallback {
    reporting: bool,
}

impl LogProgressCallback {
    pub fn new(reporting: bool) -> Self {
        Self { reporting }
    }
}

impl Default for LogProgressCallback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_run_start(&mut self, population: &mut Population) -> Result<()> {
        if self.reporting {
            log::info!("gen:{} - ave:{}", population.generation(), population.average_fitness());
        }
        Ok(())
    }

    fn on_generation_start(&mut self, generation: usize) {
        log::trace!("Generation {} starting", generation + 1);
    }

    fn on_generation_complete(&mut self, population: &mut Population) -> Result<()> {
        if self.reporting {
            log::info!("gen:{} - ave:{}", population.generation(), population.average_fitness());
        }
        Ok(())
    }
}

/// Logging plus periodic survivor snapshots
pub struct SnapshotProgressCallback {
    log: LogProgressCallback,
    writer: SnapshotWriter,
}

impl SnapshotProgressCallback {
    pub fn new(reporting: bool, writer: SnapshotWriter) -> Self {
        Self {
            log: LogProgressCallback::new(reporting),
            writer,
        }
    }
}

impl ProgressCallback for SnapshotProgressCallback {
    fn on_run_start(&mut self, population: &mut Population) -> Result<()> {
        self.log.on_run_start(population)
    }

    fn on_generation_start(&mut self, generation: usize) {
        self.log.on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, population: &mut Population) -> Result<()> {
        self.log.on_generation_complete(population)?;
        // absolute generation index of the step just taken, also after a restore
        let step = population.generation().saturating_sub(1);
        self.writer.write(step, population)?;
        Ok(())
    }
}
