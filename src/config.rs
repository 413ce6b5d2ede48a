//! Swarm configuration.
//!
//! All tuning knobs of the load-balancing swarm live in [`SwarmConfig`].
//! Defaults reproduce the classic setup: 8 processors sharing a pool of
//! 100 000 tasks, each processor consuming up to 10 000 tasks per interval.
//!
//! # Reference
//! Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer" (inertia weight)

use serde::{Deserialize, Serialize};

/// Scalar score of a position vector.
///
/// **Lower = better.** The same policy is used for personal-best and
/// global-best comparisons for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitnessPolicy {
    /// Arithmetic mean of the outstanding loads.
    MeanLoad,
    /// Largest single outstanding load (penalizes the busiest processor).
    #[default]
    MaxLoad,
}

/// What the cognitive and social terms of the velocity update pull toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VelocityReference {
    /// Per-slot pull toward the personal/global best position vectors.
    #[default]
    BestPosition,
    /// Fitness of the best positions broadcast across all slots.
    ///
    /// Simplified variant: every slot is pulled toward the same scalar.
    BestFitness,
}

/// How a velocity vector is turned into a new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateShape {
    /// `position[i] += round(velocity[i])`, then repair.
    #[default]
    DirectAdd,
    /// Velocities become signed weights over the pool of tasks sitting above
    /// the mean load; bounds the churn of a single interval.
    Redistribution,
}

/// Slot visiting order for the final partial pass of the repair routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepairOrder {
    /// Ascending slot index. Fully deterministic.
    #[default]
    RoundRobin,
    /// Shuffled with the swarm RNG. Deterministic under a fixed seed.
    Random,
}

/// When the simulation loop stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Run until every particle has consumed its whole pool, optionally
    /// capped at `max_intervals`.
    UntilComplete {
        /// Safety cap on the number of intervals.
        max_intervals: Option<usize>,
    },
    /// Run exactly this many intervals, even past completion.
    FixedBudget(usize),
}

impl Default for Termination {
    fn default() -> Self {
        Self::UntilComplete {
            max_intervals: None,
        }
    }
}

/// Configuration for a load-balancing swarm.
///
/// # Example
/// ```
/// use u_balance::config::{FitnessPolicy, SwarmConfig, Termination};
///
/// let config = SwarmConfig::default()
///     .with_particles(20)
///     .with_processors(4)
///     .with_total_tasks(1_000)
///     .with_batch_size(100)
///     .with_fitness(FitnessPolicy::MeanLoad)
///     .with_termination(Termination::FixedBudget(5))
///     .with_seed(7);
/// assert_eq!(config.num_processors, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmConfig {
    /// Number of candidate distributions (default: 12).
    pub num_particles: usize,
    /// Number of processor slots per particle (default: 8).
    pub num_processors: usize,
    /// Size of the task pool (default: 100 000).
    pub total_tasks: u64,
    /// Tasks a processor may consume per interval (default: 10 000).
    pub batch_size: u64,
    /// Pull toward the personal best (default: 2.0).
    pub cognitive_factor: f64,
    /// Pull toward the global best (default: 2.0).
    pub social_factor: f64,
    /// Velocity carry-over between intervals (default: 0.9).
    ///
    /// Values of 1 and above are accepted: velocity is clamped to the
    /// remaining pool, so it cannot grow without bound.
    pub inertia_weight: f64,
    /// Optional pull of each slot toward the mean load (default: 0.5).
    pub load_factor: Option<f64>,
    /// Fitness policy.
    pub fitness: FitnessPolicy,
    /// Velocity reference variant.
    pub reference: VelocityReference,
    /// Position update shape.
    pub update: UpdateShape,
    /// Repair pass ordering.
    pub repair: RepairOrder,
    /// Stopping rule.
    pub termination: Termination,
    /// RNG seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            num_particles: 12,
            num_processors: 8,
            total_tasks: 100_000,
            batch_size: 10_000,
            cognitive_factor: 2.0,
            social_factor: 2.0,
            inertia_weight: 0.9,
            load_factor: Some(0.5),
            fitness: FitnessPolicy::default(),
            reference: VelocityReference::default(),
            update: UpdateShape::default(),
            repair: RepairOrder::default(),
            termination: Termination::default(),
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Sets the number of particles.
    pub fn with_particles(mut self, n: usize) -> Self {
        self.num_particles = n;
        self
    }

    /// Sets the number of processor slots.
    pub fn with_processors(mut self, n: usize) -> Self {
        self.num_processors = n;
        self
    }

    /// Sets the task pool size.
    pub fn with_total_tasks(mut self, total: u64) -> Self {
        self.total_tasks = total;
        self
    }

    /// Sets the per-interval consumption batch.
    pub fn with_batch_size(mut self, batch: u64) -> Self {
        self.batch_size = batch;
        self
    }

    /// Sets the cognitive, social and inertia coefficients.
    pub fn with_coefficients(mut self, cognitive: f64, social: f64, inertia: f64) -> Self {
        self.cognitive_factor = cognitive;
        self.social_factor = social;
        self.inertia_weight = inertia;
        self
    }

    /// Sets (or disables, with `None`) the load-balancing pull.
    pub fn with_load_factor(mut self, factor: Option<f64>) -> Self {
        self.load_factor = factor;
        self
    }

    /// Sets the fitness policy.
    pub fn with_fitness(mut self, policy: FitnessPolicy) -> Self {
        self.fitness = policy;
        self
    }

    /// Sets the velocity reference variant.
    pub fn with_reference(mut self, reference: VelocityReference) -> Self {
        self.reference = reference;
        self
    }

    /// Sets the position update shape.
    pub fn with_update(mut self, update: UpdateShape) -> Self {
        self.update = update;
        self
    }

    /// Sets the repair ordering.
    pub fn with_repair(mut self, order: RepairOrder) -> Self {
        self.repair = order;
        self
    }

    /// Sets the stopping rule.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
