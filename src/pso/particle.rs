//! Particle: one candidate task distribution and its search state.
//!
//! # Representation
//!
//! - **position**: outstanding (not yet consumed) tasks per processor slot.
//! - **tasks_processed**: tasks each slot has consumed so far.
//! - The assigned load of a slot is `position[i] + tasks_processed[i]`.
//!
//! Pool invariant, held after every public call:
//! `sum(position) + sum(tasks_processed) == total_tasks`.
//!
//! # Reference
//! Kennedy & Eberhart (1995), "Particle Swarm Optimization"

use rand::Rng;

use super::fitness::mean;
use super::repair::{RepairOutcome, repair};
use crate::config::{FitnessPolicy, RepairOrder, SwarmConfig, UpdateShape, VelocityReference};
use crate::error::{Result, SwarmError};

/// A candidate assignment of tasks to processors.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec<i64>,
    velocity: Vec<f64>,
    best_position: Vec<i64>,
    best_fitness: f64,
    tasks_processed: Vec<i64>,
    total_tasks: i64,
}

impl Particle {
    /// Creates a particle with a random initial distribution.
    ///
    /// Draws one uniform weight per slot, normalizes the weights to the task
    /// pool, rounds, then repairs so the slots sum exactly to the pool.
    pub fn new<R: Rng>(config: &SwarmConfig, rng: &mut R) -> Self {
        let n = config.num_processors;
        let total = pool_size(config.total_tasks);

        let weights: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
        let weight_sum: f64 = weights.iter().sum();
        let position: Vec<i64> = if weight_sum > 0.0 {
            weights
                .iter()
                .map(|w| (w / weight_sum * total as f64).round() as i64)
                .collect()
        } else {
            vec![0; n]
        };

        Self::assemble(position, vec![0.0; n], total, config, rng)
    }

    /// Creates a particle from a pre-supplied distribution.
    ///
    /// `velocity` defaults to all zeros. The position is repaired to the
    /// configured pool, so it may under- or over-shoot `total_tasks`.
    ///
    /// # Errors
    /// [`SwarmError::DimensionMismatch`] if either vector does not have one
    /// entry per processor, [`SwarmError::NegativeLoad`] if a slot is negative.
    pub fn from_parts<R: Rng>(
        position: Vec<i64>,
        velocity: Option<Vec<f64>>,
        config: &SwarmConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let n = config.num_processors;
        if position.len() != n {
            return Err(SwarmError::DimensionMismatch {
                expected: n,
                actual: position.len(),
            });
        }
        if let Some(slot) = position.iter().position(|&p| p < 0) {
            return Err(SwarmError::NegativeLoad { slot });
        }
        let velocity = velocity.unwrap_or_else(|| vec![0.0; n]);
        if velocity.len() != n {
            return Err(SwarmError::DimensionMismatch {
                expected: n,
                actual: velocity.len(),
            });
        }

        Ok(Self::assemble(
            position,
            velocity,
            pool_size(config.total_tasks),
            config,
            rng,
        ))
    }

    fn assemble<R: Rng>(
        mut position: Vec<i64>,
        velocity: Vec<f64>,
        total_tasks: i64,
        config: &SwarmConfig,
        rng: &mut R,
    ) -> Self {
        repair(&mut position, total_tasks, config.repair, rng);
        let best_fitness = config.fitness.evaluate(&position);
        let n = position.len();
        Self {
            best_position: position.clone(),
            position,
            velocity,
            best_fitness,
            tasks_processed: vec![0; n],
            total_tasks,
        }
    }

    /// Outstanding tasks per slot.
    pub fn position(&self) -> &[i64] {
        &self.position
    }

    /// Current velocity per slot.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Lowest-fitness position this particle has held.
    pub fn best_position(&self) -> &[i64] {
        &self.best_position
    }

    /// Fitness of [`best_position`](Self::best_position).
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Tasks consumed per slot.
    pub fn tasks_processed(&self) -> &[i64] {
        &self.tasks_processed
    }

    /// Size of the task pool this particle distributes.
    pub fn total_tasks(&self) -> i64 {
        self.total_tasks
    }

    /// Number of processor slots.
    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    /// Assigned load per slot (outstanding + consumed).
    pub fn assigned(&self) -> Vec<i64> {
        self.position
            .iter()
            .zip(&self.tasks_processed)
            .map(|(p, t)| p + t)
            .collect()
    }

    /// Total tasks consumed across all slots.
    pub fn total_processed(&self) -> i64 {
        self.tasks_processed.iter().sum()
    }

    /// Tasks not yet consumed: `total_tasks - total_processed()`.
    pub fn remaining_pool(&self) -> i64 {
        self.total_tasks - self.total_processed()
    }

    /// Whether every slot has consumed all of its work.
    pub fn is_complete(&self) -> bool {
        self.position.iter().all(|&p| p <= 0)
    }

    /// Scores the current position.
    pub fn evaluate(&self, policy: FitnessPolicy) -> f64 {
        policy.evaluate(&self.position)
    }

    /// Runs one interval of work: every slot with outstanding tasks consumes
    /// up to `batch` of them. Returns the number of tasks consumed.
    ///
    /// Moves tasks from `position` into `tasks_processed`, so the pool
    /// invariant holds without a repair pass.
    pub fn consume(&mut self, batch: u64) -> i64 {
        let batch = pool_size(batch);
        let mut consumed = 0;
        for (outstanding, processed) in self.position.iter_mut().zip(&mut self.tasks_processed) {
            if *outstanding <= 0 {
                continue;
            }
            let take = batch.min(*outstanding);
            *outstanding -= take;
            *processed += take;
            consumed += take;
        }
        consumed
    }

    /// Updates the velocity toward the personal and global bests.
    ///
    /// ```text
    /// v[i] = w·v[i] + c1·r1·(local[i] - x[i]) + c2·r2·(global[i] - x[i])
    ///      + k·(mean(x) - x[i])                      (if load_factor is set)
    /// ```
    ///
    /// `r1`, `r2` are drawn per slot. With
    /// [`VelocityReference::BestFitness`], `local`/`global` are the fitness
    /// values of the best positions broadcast across all slots.
    ///
    /// Each component is clamped to `±remaining_pool()`: no slot can move
    /// more tasks than are still outstanding, so an inertia weight of 1 or
    /// more stays bounded.
    pub fn update_velocity<R: Rng>(
        &mut self,
        global_best: &[i64],
        config: &SwarmConfig,
        rng: &mut R,
    ) {
        let mean_load = mean(&self.position);
        let global_fitness = config.fitness.evaluate(global_best);
        let v_max = self.remaining_pool().max(0) as f64;

        for i in 0..self.position.len() {
            let r1 = rng.random::<f64>();
            let r2 = rng.random::<f64>();
            let x = self.position[i] as f64;

            let (local_ref, global_ref) = match config.reference {
                VelocityReference::BestPosition => (
                    self.best_position[i] as f64,
                    global_best.get(i).copied().unwrap_or(self.position[i]) as f64,
                ),
                VelocityReference::BestFitness => (self.best_fitness, global_fitness),
            };

            let cognitive = config.cognitive_factor * r1 * (local_ref - x);
            let social = config.social_factor * r2 * (global_ref - x);
            let balance = config.load_factor.map_or(0.0, |k| k * (mean_load - x));

            let velocity = config.inertia_weight * self.velocity[i] + cognitive + social + balance;
            self.velocity[i] = velocity.clamp(-v_max, v_max);
        }
    }

    /// Moves the particle along its velocity, then repairs the pool.
    ///
    /// - [`UpdateShape::DirectAdd`]: `x[i] += round(v[i])`, with the step
    ///   limited to `[-x[i], remaining_pool()]`.
    /// - [`UpdateShape::Redistribution`]: `v[i] / Σ|v|` weights the pool of
    ///   tasks sitting above the mean load. All-zero velocities leave the
    ///   position unchanged.
    ///
    /// No slot ends below its consumed count (outstanding ≥ 0).
    pub fn update_position<R: Rng>(&mut self, config: &SwarmConfig, rng: &mut R) -> RepairOutcome {
        match config.update {
            UpdateShape::DirectAdd => {
                let pool = self.remaining_pool().max(0);
                for (x, v) in self.position.iter_mut().zip(&self.velocity) {
                    let floor = -(*x).max(0);
                    let step = (v.round() as i64).clamp(floor, pool);
                    *x = x.saturating_add(step);
                }
            }
            UpdateShape::Redistribution => {
                let weight_sum: f64 = self.velocity.iter().map(|v| v.abs()).sum();
                if weight_sum > 0.0 && weight_sum.is_finite() {
                    let mean_load = mean(&self.position);
                    let redistributable: f64 = self
                        .position
                        .iter()
                        .map(|&x| (x as f64 - mean_load).max(0.0))
                        .sum();
                    for (x, v) in self.position.iter_mut().zip(&self.velocity) {
                        let delta = (v / weight_sum * redistributable).round() as i64;
                        *x += delta;
                    }
                }
            }
        }

        self.repair(config.repair, rng)
    }

    /// Restores the pool invariant against the tasks still outstanding.
    pub fn repair<R: Rng>(&mut self, order: RepairOrder, rng: &mut R) -> RepairOutcome {
        let target = self.remaining_pool();
        repair(&mut self.position, target, order, rng)
    }

    /// Records `fitness` as the personal best if strictly better.
    ///
    /// Returns `true` if the best was replaced.
    pub fn update_best(&mut self, fitness: f64) -> bool {
        if fitness < self.best_fitness {
            self.best_fitness = fitness;
            self.best_position.clone_from(&self.position);
            true
        } else {
            false
        }
    }
}

/// Clamps a configured count into the signed working range.
fn pool_size(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
