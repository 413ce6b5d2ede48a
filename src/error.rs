//! Error types for swarm construction.
//!
//! Only construction can fail. Once a [`Swarm`](crate::pso::Swarm) exists,
//! every interval recovers locally (clamping, repair, zero-denominator
//! guards) and never returns an error.

use crate::validation::ValidationError;

/// Result type for swarm operations.
pub type Result<T> = std::result::Result<T, SwarmError>;

/// Errors raised while building particles or a swarm.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SwarmError {
    /// The configuration failed validation.
    #[error("invalid swarm configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// A pre-supplied vector does not have one entry per processor.
    #[error("expected {expected} processor slots, got {actual}")]
    DimensionMismatch {
        /// Configured processor count.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },

    /// Pre-supplied particles do not match the configured particle count.
    #[error("expected {expected} particles, got {actual}")]
    ParticleCountMismatch {
        /// Configured particle count.
        expected: usize,
        /// Number of particles supplied.
        actual: usize,
    },

    /// A pre-supplied particle distributes a different task pool.
    #[error("expected a pool of {expected} tasks, got {actual}")]
    PoolMismatch {
        /// Configured pool size.
        expected: i64,
        /// Pool size of the supplied particle.
        actual: i64,
    },

    /// A pre-supplied position holds a negative load.
    #[error("processor slot {slot} has a negative load")]
    NegativeLoad {
        /// Offending slot index.
        slot: usize,
    },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
