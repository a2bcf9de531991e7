/*!
Entry points for a host environment.

The `sample_*` functions take the raw parallel vectors and signed counts a
binding layer receives, validate everything, and only then start sampling.
On a validation error no draws are returned.

```rust
use bayes_qld::api::sample_multi_chain;

let out = sample_multi_chain(&[3.0, 1.0, 0.0], &[6.0, 6.0, 6.0], &[1.0, 0.1, 0.01], 100, 10, 3)?;
assert_eq!(out.theta.len(), 30);
assert_eq!(out.chain_id.len(), 30);
assert_eq!(out.accept.len(), 30);
# Ok::<(), bayes_qld::error::QldError>(())
```
*/

use log::info;
use rand::Rng;

use crate::config::SamplerConfig;
use crate::core::ChainRunner;
use crate::dataset::DilutionDataset;
use crate::distributions::QuantalPosterior;
use crate::error::Result;
use crate::metropolis_hastings::MetropolisHastings;
use crate::samples::{MultiChainSamples, SampleRecord};

/**
Runs one chain and returns its θ draws and accept flags, each of length `n_sample`.

# Errors

Fails with [`QldError::Validation`](crate::error::QldError::Validation) if the
slices differ in length or hold an invalid dilution, if `n_burnin` or
`n_sample` is not positive, or if the draws would not fit in memory.
*/
pub fn sample_single_chain(
    positive_wells: &[f64],
    total_wells: &[f64],
    dilution_fraction: &[f64],
    n_burnin: i64,
    n_sample: i64,
) -> Result<SampleRecord> {
    let data = DilutionDataset::new(positive_wells, total_wells, dilution_fraction)?;
    let config = SamplerConfig::from_counts(n_burnin, n_sample, 1)?;
    let MultiChainSamples { theta, accept, .. } = run(&data, &config)?;
    Ok(SampleRecord { theta, accept })
}

/**
Runs `n_chains` independent chains and returns θ draws, 1-based chain ids and
accept flags, each of length `n_chains × n_sample`, grouped by chain.

# Errors

As [`sample_single_chain`], and also if `n_chains` is not positive.
*/
pub fn sample_multi_chain(
    positive_wells: &[f64],
    total_wells: &[f64],
    dilution_fraction: &[f64],
    n_burnin: i64,
    n_sample: i64,
    n_chains: i64,
) -> Result<MultiChainSamples> {
    let data = DilutionDataset::new(positive_wells, total_wells, dilution_fraction)?;
    let config = SamplerConfig::from_counts(n_burnin, n_sample, n_chains)?;
    run(&data, &config)
}

/**
Samples the posterior of θ for `data` as described by `config`.

With a seed in `config` the output is reproducible and does not depend on
`n_threads`.
*/
pub fn run(data: &DilutionDataset, config: &SamplerConfig) -> Result<MultiChainSamples> {
    config.validate()?;

    let seed = config
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen::<u64>());
    info!(
        "fitting {} dilution(s) with seed {seed} ({} chain(s))",
        data.len(),
        config.n_chains
    );

    let target = QuantalPosterior::new(data.clone());
    let mut mh = MetropolisHastings::with_seed(target, config.n_chains, seed);

    let mut sample = || {
        if config.progress {
            mh.run_with_progress(config.n_burnin, config.n_samples)
        } else {
            Ok(mh.run(config.n_burnin, config.n_samples))
        }
    };

    let out = match config.n_threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(sample)?,
        None => sample()?,
    };

    info!(
        "collected {} draws, acceptance rate {:.3}",
        out.len(),
        out.acceptance_rate()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QldError, ValidationError};
    use test_log::test;

    const POS: [f64; 3] = [3.0, 1.0, 0.0];
    const TOT: [f64; 3] = [6.0, 6.0, 6.0];
    const DIL: [f64; 3] = [1.0, 0.1, 0.01];

    #[test]
    fn single_chain_lengths() {
        let out = sample_single_chain(&POS, &TOT, &DIL, 50, 40).unwrap();
        assert_eq!(out.theta.len(), 40);
        assert_eq!(out.accept.len(), 40);
        assert!(out.accept.iter().all(|&a| a == 0 || a == 1));
    }

    #[test]
    fn zero_burn_in_is_a_validation_error() {
        let err = sample_single_chain(&POS, &TOT, &DIL, 0, 40).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn length_mismatch_reported_before_counts() {
        let err = sample_single_chain(&[1.0, 2.0], &[3.0, 3.0, 3.0], &DIL, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            QldError::Validation(ValidationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn oversized_run_fails_before_allocating() {
        let err = sample_multi_chain(&POS, &TOT, &DIL, 1, i64::MAX, 2).unwrap_err();
        assert!(matches!(
            err,
            QldError::Validation(ValidationError::TooManyDraws { n_chains: 2, .. })
        ));
        assert!(sample_single_chain(&POS, &TOT, &DIL, 1, i64::MAX).is_err());
    }

    #[test]
    fn dedicated_pool_gives_same_draws() {
        let data = DilutionDataset::new(&POS, &TOT, &DIL).unwrap();
        let config = SamplerConfig::new(100, 50).set_chains(3).set_seed(9);
        let global = run(&data, &config).unwrap();
        let pooled = run(&data, &config.clone().set_threads(2)).unwrap();
        assert_eq!(global, pooled);
    }

    #[test]
    fn progress_run_gives_same_draws() {
        let data = DilutionDataset::new(&POS, &TOT, &DIL).unwrap();
        let config = SamplerConfig::new(100, 50).set_chains(2).set_seed(3);
        let plain = run(&data, &config).unwrap();
        let shown = run(&data, &config.clone().set_progress(true)).unwrap();
        assert_eq!(plain, shown);
    }
}
