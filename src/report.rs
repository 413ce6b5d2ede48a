//! Progress snapshots and observers.
//!
//! The swarm never prints. After every interval it produces an
//! [`IntervalReport`] and hands it to a [`ProgressObserver`], which decides
//! how (or whether) to render it.
//!
//! # Observers
//!
//! | Observer | Behaviour |
//! |----------|-----------|
//! | any `FnMut(&IntervalReport)` | called once per interval |
//! | [`MilestoneLogger`] | `tracing` event each time a particle crosses the next processed-task milestone |

use serde::{Deserialize, Serialize};

use crate::pso::Particle;

/// Progress of one processor slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorProgress {
    /// Slot index.
    pub processor: usize,
    /// Tasks consumed so far.
    pub tasks_processed: i64,
    /// Tasks still outstanding.
    pub remaining: i64,
}

/// Progress of one particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleProgress {
    /// Particle index within the swarm.
    pub particle: usize,
    /// Fitness of the current position.
    pub fitness: f64,
    /// Personal best fitness.
    pub best_fitness: f64,
    /// Whether every slot has drained.
    pub complete: bool,
    /// Per-slot counters.
    pub processors: Vec<ProcessorProgress>,
}

impl ParticleProgress {
    /// Captures a particle's counters.
    pub fn capture(index: usize, particle: &Particle, fitness: f64) -> Self {
        let processors = particle
            .tasks_processed()
            .iter()
            .zip(particle.position())
            .enumerate()
            .map(|(processor, (&tasks_processed, &remaining))| ProcessorProgress {
                processor,
                tasks_processed,
                remaining,
            })
            .collect();

        Self {
            particle: index,
            fitness,
            best_fitness: particle.best_fitness(),
            complete: particle.is_complete(),
            processors,
        }
    }

    /// Tasks consumed across all slots.
    pub fn total_processed(&self) -> i64 {
        self.processors.iter().map(|p| p.tasks_processed).sum()
    }

    /// Tasks outstanding across all slots.
    pub fn total_remaining(&self) -> i64 {
        self.processors.iter().map(|p| p.remaining).sum()
    }
}

/// State of the whole swarm after an interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalReport {
    /// Interval index (1-based; 0 before the first interval).
    pub interval: usize,
    /// One entry per particle, in index order.
    pub particles: Vec<ParticleProgress>,
    /// Global best fitness after this interval.
    pub global_best_fitness: f64,
    /// Whether every particle has drained.
    pub all_complete: bool,
}

impl IntervalReport {
    /// Tasks consumed across all particles.
    pub fn total_processed(&self) -> i64 {
        self.particles.iter().map(|p| p.total_processed()).sum()
    }

    /// Tasks outstanding across all particles.
    pub fn total_remaining(&self) -> i64 {
        self.particles.iter().map(|p| p.total_remaining()).sum()
    }

    /// Number of drained particles.
    pub fn complete_count(&self) -> usize {
        self.particles.iter().filter(|p| p.complete).count()
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmResult {
    /// Global best position found.
    pub best_position: Vec<i64>,
    /// Fitness of `best_position`.
    pub best_fitness: f64,
    /// Intervals executed by this run.
    pub intervals: usize,
    /// Whether every particle drained its pool.
    pub completed: bool,
    /// Global best fitness sampled after each interval.
    pub history: Vec<f64>,
}

/// Receives a report after every interval.
pub trait ProgressObserver {
    /// Called once per interval, after all particles have moved.
    fn on_interval(&mut self, report: &IntervalReport);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&IntervalReport),
{
    fn on_interval(&mut self, report: &IntervalReport) {
        self(report)
    }
}

/// Logs particle progress every `step` processed tasks.
///
/// Each particle has its own threshold; when its processed total reaches the
/// threshold, one `info` event is emitted with the per-processor remaining
/// loads and the threshold advances past the current total.
#[derive(Debug, Clone)]
pub struct MilestoneLogger {
    step: i64,
    next: Vec<i64>,
    emitted: usize,
}

impl MilestoneLogger {
    /// Creates a logger firing every `step` tasks (minimum 1).
    pub fn new(step: u64) -> Self {
        Self {
            step: i64::try_from(step).unwrap_or(i64::MAX).max(1),
            next: Vec::new(),
            emitted: 0,
        }
    }

    /// Number of milestone events emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl ProgressObserver for MilestoneLogger {
    fn on_interval(&mut self, report: &IntervalReport) {
        if self.next.len() < report.particles.len() {
            self.next.resize(report.particles.len(), self.step);
        }

        for progress in &report.particles {
            let processed = progress.total_processed();
            let Some(threshold) = self.next.get_mut(progress.particle) else {
                continue;
            };
            if processed < *threshold {
                continue;
            }

            let remaining: Vec<i64> = progress.processors.iter().map(|p| p.remaining).collect();
            tracing::info!(
                interval = report.interval,
                particle = progress.particle,
                processed,
                ?remaining,
                "particle reached milestone"
            );
            self.emitted += 1;
            *threshold = (processed / self.step + 1).saturating_mul(self.step);
        }
    }
}
