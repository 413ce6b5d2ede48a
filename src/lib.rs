//! Particle-swarm load balancing for the U-Engine ecosystem.
//!
//! Distributes a fixed pool of indivisible tasks across a fixed number of
//! processors with a Particle Swarm Optimization metaheuristic, and simulates
//! the processors consuming their share interval by interval.
//!
//! # Modules
//!
//! - **`config`**: `SwarmConfig` and the policy enumerations (fitness,
//!   velocity reference, update shape, repair order, termination)
//! - **`validation`**: Configuration checks run before a swarm is built
//! - **`pso`**: `Particle`, `Swarm` and the task-conservation `repair` routine
//! - **`report`**: Per-interval progress snapshots and observers
//! - **`error`**: Construction errors
//!
//! # Example
//!
//! ```
//! use u_balance::config::{FitnessPolicy, SwarmConfig};
//! use u_balance::pso::Swarm;
//!
//! let config = SwarmConfig::default()
//!     .with_particles(8)
//!     .with_processors(4)
//!     .with_total_tasks(2_000)
//!     .with_batch_size(250)
//!     .with_fitness(FitnessPolicy::MaxLoad)
//!     .with_seed(1);
//!
//! let mut swarm = Swarm::new(config).unwrap();
//! let result = swarm.run_with(&mut |report: &u_balance::report::IntervalReport| {
//!     assert!(report.total_processed() <= 8 * 2_000);
//! });
//! assert!(result.completed);
//! assert_eq!(result.best_position.len(), 4);
//! ```
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

pub mod config;
pub mod error;
pub mod pso;
pub mod report;
pub mod validation;

pub use error::{Result, SwarmError};
