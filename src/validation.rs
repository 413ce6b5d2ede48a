//! Configuration validation.
//!
//! Checks a [`SwarmConfig`] before any particle is built. Detects:
//! - Empty swarms (no particles)
//! - Particles with no processor slots
//! - A zero consumption batch (the simulation would never progress)
//! - Negative or non-finite PSO coefficients
//! - A fixed iteration budget of zero
//!
//! A task pool of zero is valid: every particle starts out complete.

use crate::config::{SwarmConfig, Termination};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// `num_particles` is zero.
    NoParticles,
    /// `num_processors` is zero.
    NoProcessors,
    /// `batch_size` is zero.
    ZeroBatch,
    /// A coefficient is negative, NaN or infinite.
    InvalidCoefficient,
    /// `Termination::FixedBudget(0)` or `max_intervals: Some(0)`.
    ZeroBudget,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a swarm configuration.
///
/// Checks:
/// 1. At least one particle
/// 2. At least one processor slot
/// 3. Batch size ≥ 1
/// 4. Cognitive, social, inertia and load factors are finite and ≥ 0
/// 5. Iteration budgets are ≥ 1 when present
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &SwarmConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.num_particles == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoParticles,
            "Swarm needs at least one particle",
        ));
    }

    if config.num_processors == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoProcessors,
            "Particles need at least one processor slot",
        ));
    }

    if config.batch_size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroBatch,
            "Batch size must be at least 1 task per interval",
        ));
    }

    let mut coefficients = vec![
        ("cognitive_factor", config.cognitive_factor),
        ("social_factor", config.social_factor),
        ("inertia_weight", config.inertia_weight),
    ];
    if let Some(load) = config.load_factor {
        coefficients.push(("load_factor", load));
    }
    for (name, value) in coefficients {
        if !value.is_finite() || value < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCoefficient,
                format!("Coefficient '{name}' must be finite and non-negative, got {value}"),
            ));
        }
    }

    let budget = match config.termination {
        Termination::FixedBudget(n) => Some(n),
        Termination::UntilComplete { max_intervals } => max_intervals,
    };
    if budget == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroBudget,
            "Interval budget must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
