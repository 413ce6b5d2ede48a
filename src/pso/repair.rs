//! Task-conservation repair.
//!
//! Restores an integer load vector to non-negative, sum-preserving form:
//!
//! 1. Clamp every slot to ≥ 0 (the clamped deficit becomes surplus).
//! 2. `surplus = target - sum(position)`.
//! 3. Walk an explicit list of eligible slots, adding one task per slot while
//!    `surplus > 0`, or removing one task from slots still holding work while
//!    `surplus < 0`, until the surplus is exhausted.
//!
//! Whole passes over the eligible list are applied in bulk, so the cost is
//! proportional to the number of slots rather than the size of the surplus.
//! Only the final partial pass depends on [`RepairOrder`], and it is the only
//! place the RNG is touched. A vector that already sums to `target` is left
//! untouched and consumes no randomness.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::RepairOrder;

/// What a repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Tasks added back by clamping negative slots to zero.
    pub clamped: i64,
    /// Net tasks added (positive) or removed (negative) by redistribution.
    pub adjusted: i64,
}

impl RepairOutcome {
    /// Whether the vector was already valid.
    pub fn is_noop(&self) -> bool {
        self.clamped == 0 && self.adjusted == 0
    }
}

/// Repairs `position` so that every slot is ≥ 0 and the slots sum to `target`.
///
/// A negative `target` is treated as zero.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_balance::config::RepairOrder;
/// use u_balance::pso::repair;
///
/// let mut rng = SmallRng::seed_from_u64(1);
/// let mut loads = vec![5, -2, 3];
/// repair(&mut loads, 10, RepairOrder::RoundRobin, &mut rng);
/// assert_eq!(loads, vec![6, 1, 3]);
/// ```
pub fn repair<R: Rng>(
    position: &mut [i64],
    target: i64,
    order: RepairOrder,
    rng: &mut R,
) -> RepairOutcome {
    let mut outcome = RepairOutcome::default();

    for slot in position.iter_mut() {
        if *slot < 0 {
            outcome.clamped += -*slot;
            *slot = 0;
        }
    }

    if position.is_empty() {
        return outcome;
    }

    let target = target.max(0);
    let load = position.iter().fold(0i64, |acc, &x| acc.saturating_add(x));
    let mut surplus = target - load;
    outcome.adjusted = surplus;

    while surplus != 0 {
        let eligible: Vec<usize> = if surplus > 0 {
            (0..position.len()).collect()
        } else {
            (0..position.len()).filter(|&i| position[i] > 0).collect()
        };
        // surplus < 0 means sum > target >= 0, so some slot holds work
        if eligible.is_empty() {
            break;
        }

        let n = eligible.len() as i64;
        let magnitude = surplus.abs();
        let passes = if surplus > 0 {
            magnitude / n
        } else {
            let min_load = eligible.iter().map(|&i| position[i]).min().unwrap_or(0);
            (magnitude / n).min(min_load)
        };

        if passes > 0 {
            let delta = passes * surplus.signum();
            for &i in &eligible {
                position[i] += delta;
            }
            surplus -= delta * n;
            continue;
        }

        // |surplus| < n: one partial pass settles it
        let mut eligible = eligible;
        if order == RepairOrder::Random {
            eligible.shuffle(rng);
        }
        for i in eligible {
            if surplus == 0 {
                break;
            }
            if surplus > 0 {
                position[i] += 1;
                surplus -= 1;
            } else {
                position[i] -= 1;
                surplus += 1;
            }
        }
    }

    outcome
}
