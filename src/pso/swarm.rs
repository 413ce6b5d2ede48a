//! Swarm coordinator.
//!
//! Owns the particles, the global best and the RNG, and drives the
//! interval loop. Per interval, for every particle in index order:
//!
//! 1. consume up to `batch_size` tasks per slot
//! 2. update velocity against the current global best
//! 3. update position and repair the pool
//! 4. evaluate fitness
//! 5. update the personal best, then the global best (strictly less)
//!
//! Execution is single-threaded. The global best is read and written within
//! the same sequential pass, so later particles in an interval already see
//! improvements made by earlier ones.
//!
//! # Reference
//! Kennedy & Eberhart (1995), "Particle Swarm Optimization"

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace};

use super::Particle;
use crate::config::{SwarmConfig, Termination};
use crate::error::{Result, SwarmError};
use crate::report::{IntervalReport, ParticleProgress, ProgressObserver, SwarmResult};
use crate::validation::validate_config;

/// A swarm of candidate task distributions.
///
/// # Example
/// ```
/// use u_balance::config::SwarmConfig;
/// use u_balance::pso::Swarm;
///
/// let config = SwarmConfig::default()
///     .with_particles(10)
///     .with_processors(4)
///     .with_total_tasks(1_000)
///     .with_batch_size(100)
///     .with_seed(42);
/// let mut swarm = Swarm::new(config).unwrap();
/// let result = swarm.run();
/// assert!(result.completed);
/// assert!(swarm.particles().iter().all(|p| p.total_processed() == 1_000));
/// ```
#[derive(Debug, Clone)]
pub struct Swarm {
    config: SwarmConfig,
    particles: Vec<Particle>,
    fitness: Vec<f64>,
    global_best_position: Vec<i64>,
    global_best_fitness: f64,
    interval: usize,
    rng: SmallRng,
}

impl Swarm {
    /// Builds a swarm of randomly initialized particles.
    ///
    /// # Errors
    /// [`SwarmError::InvalidConfig`] if the configuration fails validation.
    pub fn new(config: SwarmConfig) -> Result<Self> {
        validate_config(&config).map_err(SwarmError::InvalidConfig)?;

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let particles = (0..config.num_particles)
            .map(|_| Particle::new(&config, &mut rng))
            .collect();

        Ok(Self::assemble(config, particles, rng))
    }

    /// Builds a swarm from pre-built particles.
    ///
    /// # Errors
    /// - [`SwarmError::InvalidConfig`] if the configuration fails validation.
    /// - [`SwarmError::ParticleCountMismatch`] if `particles.len()` differs
    ///   from `num_particles`.
    /// - [`SwarmError::DimensionMismatch`] if a particle has the wrong number
    ///   of slots.
    /// - [`SwarmError::PoolMismatch`] if a particle distributes a different
    ///   task pool.
    pub fn with_particles(config: SwarmConfig, particles: Vec<Particle>) -> Result<Self> {
        validate_config(&config).map_err(SwarmError::InvalidConfig)?;

        if particles.len() != config.num_particles {
            return Err(SwarmError::ParticleCountMismatch {
                expected: config.num_particles,
                actual: particles.len(),
            });
        }
        if let Some(p) = particles
            .iter()
            .find(|p| p.dimension() != config.num_processors)
        {
            return Err(SwarmError::DimensionMismatch {
                expected: config.num_processors,
                actual: p.dimension(),
            });
        }
        let expected_pool = i64::try_from(config.total_tasks).unwrap_or(i64::MAX);
        if let Some(p) = particles.iter().find(|p| p.total_tasks() != expected_pool) {
            return Err(SwarmError::PoolMismatch {
                expected: expected_pool,
                actual: p.total_tasks(),
            });
        }

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self::assemble(config, particles, rng))
    }

    fn assemble(config: SwarmConfig, particles: Vec<Particle>, rng: SmallRng) -> Self {
        let mut best_idx = 0;
        for (idx, p) in particles.iter().enumerate() {
            if p.best_fitness() < particles[best_idx].best_fitness() {
                best_idx = idx;
            }
        }
        let (global_best_position, global_best_fitness) = particles
            .get(best_idx)
            .map(|p| (p.best_position().to_vec(), p.best_fitness()))
            .unwrap_or_else(|| (vec![0; config.num_processors], f64::INFINITY));

        let fitness = particles.iter().map(|p| p.evaluate(config.fitness)).collect();

        info!(
            particles = particles.len(),
            processors = config.num_processors,
            total_tasks = config.total_tasks,
            batch_size = config.batch_size,
            global_best_fitness,
            "swarm initialized"
        );

        Self {
            config,
            particles,
            fitness,
            global_best_position,
            global_best_fitness,
            interval: 0,
            rng,
        }
    }

    /// Swarm configuration.
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Particles in index order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Best position observed by any particle.
    pub fn global_best_position(&self) -> &[i64] {
        &self.global_best_position
    }

    /// Fitness of the global best position.
    pub fn global_best_fitness(&self) -> f64 {
        self.global_best_fitness
    }

    /// Intervals executed so far.
    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Whether every particle has drained its pool.
    pub fn is_complete(&self) -> bool {
        self.particles.iter().all(|p| p.is_complete())
    }

    /// Current progress of every particle.
    pub fn snapshot(&self) -> IntervalReport {
        let particles: Vec<ParticleProgress> = self
            .particles
            .iter()
            .zip(&self.fitness)
            .enumerate()
            .map(|(idx, (p, &f))| ParticleProgress::capture(idx, p, f))
            .collect();
        let all_complete = particles.iter().all(|p| p.complete);

        IntervalReport {
            interval: self.interval,
            particles,
            global_best_fitness: self.global_best_fitness,
            all_complete,
        }
    }

    /// Runs one interval over every particle and returns the resulting snapshot.
    pub fn step(&mut self) -> IntervalReport {
        self.interval += 1;
        let batch = self.config.batch_size;

        for (idx, particle) in self.particles.iter_mut().enumerate() {
            particle.consume(batch);
            particle.update_velocity(&self.global_best_position, &self.config, &mut self.rng);
            particle.update_position(&self.config, &mut self.rng);

            let fitness = particle.evaluate(self.config.fitness);
            self.fitness[idx] = fitness;
            particle.update_best(fitness);

            if fitness < self.global_best_fitness {
                trace!(
                    interval = self.interval,
                    particle = idx,
                    from = self.global_best_fitness,
                    to = fitness,
                    "global best improved"
                );
                self.global_best_fitness = fitness;
                self.global_best_position.clone_from_slice(particle.position());
            }
        }

        let report = self.snapshot();
        debug!(
            interval = self.interval,
            global_best_fitness = self.global_best_fitness,
            complete = report.complete_count(),
            remaining = report.total_remaining(),
            "interval finished"
        );
        report
    }

    /// Runs until the configured [`Termination`] is reached.
    pub fn run(&mut self) -> SwarmResult {
        self.run_with(&mut |_: &IntervalReport| {})
    }

    /// Runs until the configured [`Termination`] is reached, reporting every
    /// interval to `observer`.
    ///
    /// `UntilComplete` returns immediately if every particle is already
    /// drained (e.g. a zero task pool). `FixedBudget(n)` always runs `n`
    /// intervals. Budgets count intervals of this call only.
    pub fn run_with<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> SwarmResult {
        let mut history = Vec::new();
        let mut intervals = 0;

        loop {
            let proceed = match self.config.termination {
                Termination::UntilComplete { max_intervals } => {
                    !self.is_complete() && max_intervals.map_or(true, |max| intervals < max)
                }
                Termination::FixedBudget(budget) => intervals < budget,
            };
            if !proceed {
                break;
            }

            let report = self.step();
            history.push(report.global_best_fitness);
            observer.on_interval(&report);
            intervals += 1;
        }

        let completed = self.is_complete();
        info!(
            intervals,
            completed,
            global_best_fitness = self.global_best_fitness,
            "swarm run finished"
        );

        SwarmResult {
            best_position: self.global_best_position.clone(),
            best_fitness: self.global_best_fitness,
            intervals,
            completed,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FitnessPolicy, RepairOrder, UpdateShape, VelocityReference};
    use crate::report::MilestoneLogger;
    use rand::SeedableRng;

    fn config() -> SwarmConfig {
        SwarmConfig::default()
            .with_particles(6)
            .with_processors(4)
            .with_total_tasks(1_000)
            .with_batch_size(50)
            .with_seed(42)
    }

    fn assert_invariants(swarm: &Swarm) {
        for p in swarm.particles() {
            assert_eq!(
                p.position().iter().sum::<i64>() + p.total_processed(),
                swarm.config().total_tasks as i64
            );
            assert!(p.position().iter().all(|&x| x >= 0));
            assert!(p.tasks_processed().iter().all(|&t| t >= 0));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = Swarm::new(config().with_processors(0)).unwrap_err();
        assert!(matches!(err, SwarmError::InvalidConfig(_)));
    }

    #[test]
    fn test_initial_global_best_is_minimum() {
        let swarm = Swarm::new(config()).unwrap();
        let min = swarm
            .particles()
            .iter()
            .map(|p| p.best_fitness())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(swarm.global_best_fitness(), min);
        assert_eq!(swarm.interval(), 0);
        assert_invariants(&swarm);
    }

    #[test]
    fn test_initial_global_best_tie_keeps_first() {
        let cfg = config().with_particles(2).with_total_tasks(8).with_processors(2);
        let mut rng = SmallRng::seed_from_u64(0);
        let a = Particle::from_parts(vec![4, 4], None, &cfg, &mut rng).unwrap();
        let b = Particle::from_parts(vec![4, 4], None, &cfg, &mut rng).unwrap();
        let swarm = Swarm::with_particles(cfg, vec![a, b]).unwrap();
        assert_eq!(swarm.global_best_position(), &[4, 4]);
        assert_eq!(swarm.global_best_fitness(), 4.0);
    }

    #[test]
    fn test_with_particles_checks_shape() {
        let cfg = config().with_particles(2).with_processors(2).with_total_tasks(10);
        let mut rng = SmallRng::seed_from_u64(0);
        let p = Particle::from_parts(vec![5, 5], None, &cfg, &mut rng).unwrap();

        let err = Swarm::with_particles(cfg.clone(), vec![p.clone()]).unwrap_err();
        assert_eq!(
            err,
            SwarmError::ParticleCountMismatch {
                expected: 2,
                actual: 1
            }
        );

        let wide = cfg.clone().with_processors(3);
        let q = Particle::from_parts(vec![3, 3, 4], None, &wide, &mut rng).unwrap();
        let err = Swarm::with_particles(cfg.clone(), vec![p.clone(), q]).unwrap_err();
        assert!(matches!(err, SwarmError::DimensionMismatch { actual: 3, .. }));

        let bigger = cfg.clone().with_total_tasks(20);
        let r = Particle::from_parts(vec![10, 10], None, &bigger, &mut rng).unwrap();
        let err = Swarm::with_particles(cfg, vec![p, r]).unwrap_err();
        assert_eq!(
            err,
            SwarmError::PoolMismatch {
                expected: 10,
                actual: 20
            }
        );
    }

    #[test]
    fn test_with_particles_reports_current_fitness() {
        let cfg = config().with_particles(1).with_processors(2).with_total_tasks(10);
        let mut rng = SmallRng::seed_from_u64(0);
        let mut p = Particle::from_parts(vec![8, 2], None, &cfg, &mut rng).unwrap();
        p.consume(5);
        assert_eq!(p.best_fitness(), 8.0);

        let swarm = Swarm::with_particles(cfg, vec![p]).unwrap();
        let snap = swarm.snapshot();
        assert_eq!(snap.particles[0].fitness, 3.0);
        assert_eq!(snap.particles[0].best_fitness, 8.0);
    }

    #[test]
    fn test_with_particles_seeding() {
        let cfg = config().with_particles(2);
        let mut rng = SmallRng::seed_from_u64(9);
        let particles: Vec<Particle> = (0..2).map(|_| Particle::new(&cfg, &mut rng)).collect();

        let mut a = Swarm::with_particles(cfg.clone(), particles.clone()).unwrap();
        let mut b = Swarm::with_particles(cfg.clone(), particles.clone()).unwrap();
        for _ in 0..5 {
            assert_eq!(a.step(), b.step());
        }

        let mut unseeded = cfg;
        unseeded.seed = None;
        let mut swarm = Swarm::with_particles(unseeded, particles).unwrap();
        let result = swarm.run();
        assert!(result.completed);
        assert_invariants(&swarm);
    }

    #[test]
    fn test_single_interval_drains_small_pool() {
        // 2 processors, pool 10, batch 10: one interval is enough
        let cfg = SwarmConfig::default()
            .with_particles(1)
            .with_processors(2)
            .with_total_tasks(10)
            .with_batch_size(10)
            .with_seed(3);
        let mut swarm = Swarm::new(cfg).unwrap();
        let report = swarm.step();
        assert!(report.all_complete);
        assert_eq!(report.interval, 1);
        assert_eq!(swarm.particles()[0].total_processed(), 10);
        assert_eq!(report.total_processed(), 10);

        let result = swarm.run();
        assert_eq!(result.intervals, 0);
        assert!(result.completed);
    }

    #[test]
    fn test_zero_pool_is_complete_immediately() {
        let cfg = config().with_processors(4).with_total_tasks(0);
        let mut swarm = Swarm::new(cfg).unwrap();
        assert!(swarm.is_complete());
        assert!(swarm
            .particles()
            .iter()
            .all(|p| p.position().iter().all(|&x| x == 0)));

        let result = swarm.run();
        assert!(result.completed);
        assert_eq!(result.intervals, 0);
        assert!(result.history.is_empty());
        assert_eq!(result.best_fitness, 0.0);
    }

    #[test]
    fn test_zero_pool_fixed_budget_steps_safely() {
        let cfg = config()
            .with_total_tasks(0)
            .with_update(UpdateShape::Redistribution)
            .with_termination(Termination::FixedBudget(3));
        let mut swarm = Swarm::new(cfg).unwrap();
        let result = swarm.run();
        assert_eq!(result.intervals, 3);
        assert_eq!(result.history, vec![0.0, 0.0, 0.0]);
        assert_invariants(&swarm);
    }

    #[test]
    fn test_step_preserves_invariants() {
        let mut swarm = Swarm::new(config()).unwrap();
        let mut processed: Vec<Vec<i64>> = swarm
            .particles()
            .iter()
            .map(|p| p.tasks_processed().to_vec())
            .collect();
        let mut best: Vec<f64> = swarm.particles().iter().map(|p| p.best_fitness()).collect();
        let mut global = swarm.global_best_fitness();

        while !swarm.is_complete() {
            swarm.step();
            assert_invariants(&swarm);
            for (i, p) in swarm.particles().iter().enumerate() {
                for (now, before) in p.tasks_processed().iter().zip(&processed[i]) {
                    assert!(now >= before);
                }
                assert!(p.best_fitness() <= best[i]);
                processed[i] = p.tasks_processed().to_vec();
                best[i] = p.best_fitness();
            }
            assert!(swarm.global_best_fitness() <= global);
            global = swarm.global_best_fitness();
            assert!(swarm.interval() <= 1_000);
        }
    }

    #[test]
    fn test_run_completes_every_particle() {
        let mut swarm = Swarm::new(config()).unwrap();
        let result = swarm.run();
        assert!(result.completed);
        assert_eq!(result.history.len(), result.intervals);
        assert!(swarm.particles().iter().all(|p| p.total_processed() == 1_000));
        assert_eq!(result.best_position, swarm.global_best_position());
    }

    #[test]
    fn test_default_scale_history_non_increasing() {
        let cfg = SwarmConfig::default()
            .with_particles(40)
            .with_processors(8)
            .with_total_tasks(100_000)
            .with_batch_size(10_000)
            .with_seed(2024);
        let mut swarm = Swarm::new(cfg).unwrap();
        let result = swarm.run();
        assert!(result.completed);
        assert!(!result.history.is_empty());
        for pair in result.history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn test_high_inertia_until_complete() {
        let cfg = config().with_batch_size(5).with_coefficients(2.0, 2.0, 1.5);
        let mut swarm = Swarm::new(cfg).unwrap();

        while !swarm.is_complete() {
            assert!(swarm.interval() <= 1_000);
            swarm.step();
            assert_invariants(&swarm);
            for p in swarm.particles() {
                let bound = p.remaining_pool() as f64;
                assert!(p.velocity().iter().all(|v| v.abs() <= bound));
            }
        }
    }

    #[test]
    fn test_high_inertia_default_scale_stays_in_pool() {
        let cfg = SwarmConfig::default()
            .with_batch_size(1)
            .with_coefficients(2.0, 2.0, 1.5)
            .with_seed(1);
        let mut swarm = Swarm::new(cfg).unwrap();
        for _ in 0..200 {
            swarm.step();
            assert_invariants(&swarm);
        }
        assert!(!swarm.is_complete());
    }

    #[test]
    fn test_fixed_budget_runs_past_completion() {
        let cfg = config()
            .with_batch_size(1_000)
            .with_termination(Termination::FixedBudget(5));
        let mut swarm = Swarm::new(cfg).unwrap();
        let result = swarm.run();
        assert_eq!(result.intervals, 5);
        assert_eq!(swarm.interval(), 5);
        assert!(result.completed);
    }

    #[test]
    fn test_interval_cap_stops_early() {
        let cfg = config()
            .with_batch_size(1)
            .with_termination(Termination::UntilComplete {
                max_intervals: Some(4),
            });
        let mut swarm = Swarm::new(cfg).unwrap();
        let result = swarm.run();
        assert_eq!(result.intervals, 4);
        assert!(!result.completed);
        assert_invariants(&swarm);
    }

    #[test]
    fn test_same_seed_same_run() {
        let cfg = config()
            .with_repair(RepairOrder::Random)
            .with_update(UpdateShape::Redistribution);
        let a = Swarm::new(cfg.clone()).unwrap().run();
        let b = Swarm::new(cfg).unwrap().run();
        assert_eq!(a, b);
    }

    #[test]
    fn test_variants_all_complete() {
        let fitness = [FitnessPolicy::MeanLoad, FitnessPolicy::MaxLoad];
        let updates = [UpdateShape::DirectAdd, UpdateShape::Redistribution];
        let references = [VelocityReference::BestPosition, VelocityReference::BestFitness];

        for &f in &fitness {
            for &u in &updates {
                for &r in &references {
                    let cfg = config().with_fitness(f).with_update(u).with_reference(r);
                    let mut swarm = Swarm::new(cfg).unwrap();
                    let result = swarm.run();
                    assert!(result.completed, "{f:?}/{u:?}/{r:?} did not complete");
                    assert_invariants(&swarm);
                }
            }
        }
    }

    #[test]
    fn test_observer_sees_every_interval() {
        let mut swarm = Swarm::new(config()).unwrap();
        let mut intervals = Vec::new();
        let mut processed = Vec::new();
        let result = swarm.run_with(&mut |r: &IntervalReport| {
            intervals.push(r.interval);
            processed.push(r.total_processed());
        });
        assert_eq!(intervals, (1..=result.intervals).collect::<Vec<_>>());
        assert!(processed.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(processed.last().copied(), Some(6 * 1_000));
    }

    #[test]
    fn test_milestone_logger_fires() {
        let mut swarm = Swarm::new(config()).unwrap();
        let mut logger = MilestoneLogger::new(250);
        swarm.run_with(&mut logger);
        // every particle crosses 250, 500, 750 and 1000 at least once each
        assert!(logger.emitted() >= 6);
    }

    #[test]
    fn test_snapshot_matches_particles() {
        let mut swarm = Swarm::new(config()).unwrap();
        swarm.step();
        let snap = swarm.snapshot();
        assert_eq!(snap.particles.len(), 6);
        for (progress, particle) in snap.particles.iter().zip(swarm.particles()) {
            assert_eq!(progress.processors.len(), 4);
            assert_eq!(progress.total_processed(), particle.total_processed());
            assert_eq!(
                progress.total_remaining(),
                particle.position().iter().sum::<i64>()
            );
            assert_eq!(progress.fitness, particle.evaluate(swarm.config().fitness));
        }
    }
}
