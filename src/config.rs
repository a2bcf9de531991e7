//! Run configuration.

use num_traits::ToPrimitive;

use crate::error::ValidationError;

/// Largest number of merged draws whose θ buffer can be allocated.
pub const MAX_DRAWS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/**
Settings for a sampler run.

```rust
use bayes_qld::config::SamplerConfig;

let config = SamplerConfig::new(1_000, 5_000).set_chains(4).set_seed(42);
assert!(config.validate().is_ok());
assert_eq!(config.total_draws(), Some(20_000));
```
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Discarded updates per chain.
    pub n_burnin: usize,
    /// Recorded updates per chain.
    pub n_samples: usize,
    /// Number of independent chains.
    pub n_chains: usize,
    /// Global seed; chain `i` uses `seed + i`. Drawn at random when `None`.
    pub seed: Option<u64>,
    /// Size of a dedicated thread pool; the global rayon pool is used when `None`.
    pub n_threads: Option<usize>,
    /// Draw a progress bar per chain.
    pub progress: bool,
}

impl SamplerConfig {
    /// A single-chain configuration.
    pub fn new(n_burnin: usize, n_samples: usize) -> Self {
        Self {
            n_burnin,
            n_samples,
            n_chains: 1,
            seed: None,
            n_threads: None,
            progress: false,
        }
    }

    /**
    Builds a configuration from the signed counts a host environment passes in.

    # Errors

    Returns [`ValidationError::NonPositive`] for the first count that is not
    positive, checking burn-in, samples and chains in that order, and
    [`ValidationError::TooManyDraws`] if the merged output cannot be allocated.
    */
    pub fn from_counts(n_burnin: i64, n_samples: i64, n_chains: i64) -> Result<Self, ValidationError> {
        let n_burnin = positive_count("burn-in steps", n_burnin)?;
        let n_samples = positive_count("sampling steps", n_samples)?;
        let n_chains = positive_count("chains", n_chains)?;
        let config = Self::new(n_burnin, n_samples).set_chains(n_chains);
        config.validate()?;
        Ok(config)
    }

    pub fn set_chains(mut self, n_chains: usize) -> Self {
        self.n_chains = n_chains;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn set_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = Some(n_threads);
        self
    }

    pub fn set_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Checks that every count is positive and the merged output fits in memory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_counts(self.n_burnin, self.n_samples, self.n_chains)?;
        if let Some(n_threads) = self.n_threads {
            positive_count("threads", n_threads)?;
        }
        Ok(())
    }

    /// Length of the merged output, `None` on overflow.
    pub fn total_draws(&self) -> Option<usize> {
        self.n_chains.checked_mul(self.n_samples)
    }
}

/// Converts `value` to a positive count, or reports it as [`ValidationError::NonPositive`].
pub(crate) fn positive_count<T>(what: &'static str, value: T) -> Result<usize, ValidationError>
where
    T: ToPrimitive + Copy,
{
    value
        .to_usize()
        .filter(|&v| v > 0)
        .ok_or_else(|| ValidationError::NonPositive {
            what,
            value: value.to_i64().unwrap_or(i64::MAX),
        })
}

/// Positivity of every count, and `n_chains × n_samples <=` [`MAX_DRAWS`].
pub(crate) fn check_counts(
    n_burnin: usize,
    n_samples: usize,
    n_chains: usize,
) -> Result<(), ValidationError> {
    positive_count("burn-in steps", n_burnin)?;
    positive_count("sampling steps", n_samples)?;
    positive_count("chains", n_chains)?;
    match n_chains.checked_mul(n_samples) {
        Some(total) if total <= MAX_DRAWS => Ok(()),
        _ => Err(ValidationError::TooManyDraws {
            n_chains,
            n_samples,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_unseeded_chain() {
        let config = SamplerConfig::new(10, 20);
        assert_eq!(config.n_chains, 1);
        assert_eq!(config.seed, None);
        assert_eq!(config.n_threads, None);
        assert!(!config.progress);
    }

    #[test]
    fn zero_counts_fail_validation() {
        assert!(SamplerConfig::new(0, 10).validate().is_err());
        assert!(SamplerConfig::new(10, 0).validate().is_err());
        assert!(SamplerConfig::new(10, 10).set_chains(0).validate().is_err());
        assert_eq!(
            SamplerConfig::new(10, 10).set_threads(0).validate(),
            Err(ValidationError::NonPositive {
                what: "threads",
                value: 0
            })
        );
    }

    #[test]
    fn signed_counts_are_checked_in_order() {
        assert_eq!(
            SamplerConfig::from_counts(-3, 0, 1),
            Err(ValidationError::NonPositive {
                what: "burn-in steps",
                value: -3
            })
        );
        assert_eq!(
            SamplerConfig::from_counts(5, 0, 1),
            Err(ValidationError::NonPositive {
                what: "sampling steps",
                value: 0
            })
        );
        assert_eq!(
            SamplerConfig::from_counts(5, 5, -1),
            Err(ValidationError::NonPositive {
                what: "chains",
                value: -1
            })
        );
        let config = SamplerConfig::from_counts(5, 6, 7).unwrap();
        assert_eq!((config.n_burnin, config.n_samples, config.n_chains), (5, 6, 7));
    }

    #[test]
    fn oversized_runs_are_rejected_without_overflow() {
        assert_eq!(
            SamplerConfig::from_counts(1, i64::MAX, 2),
            Err(ValidationError::TooManyDraws {
                n_chains: 2,
                n_samples: i64::MAX as usize
            })
        );
        let config = SamplerConfig::new(1, usize::MAX).set_chains(3);
        assert_eq!(config.total_draws(), None);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::TooManyDraws { .. })
        ));
        assert!(SamplerConfig::new(1, MAX_DRAWS).validate().is_ok());
        assert!(SamplerConfig::new(1, MAX_DRAWS + 1).validate().is_err());
    }
}
