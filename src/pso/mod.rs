//! Particle-swarm load balancing.
//!
//! Each [`Particle`] is one candidate distribution of the task pool over the
//! processor slots. The [`Swarm`] moves every particle toward the personal
//! and global bests while the slots consume work interval by interval.
//!
//! # Submodules
//!
//! - [`repair`]: task-conservation repair shared by every mutating operation
//!
//! # Reference
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

mod fitness;
mod particle;
pub mod repair;
mod swarm;

pub use particle::Particle;
pub use repair::{RepairOutcome, repair};
pub use swarm::Swarm;
