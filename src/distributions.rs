/*!
Target densities for the dilution-assay model.

The single model parameter θ is a dilution-scaled infectivity rate. A well at
dilution fraction `d` stays negative with probability `exp(-d·θ)`, so the
number of positive wells out of `n` is binomial with success probability
`1 - exp(-d·θ)`. θ carries an exponential prior with rate [`PRIOR_RATE`].

# Examples

```rust
use bayes_qld::dataset::DilutionDataset;
use bayes_qld::distributions::{QuantalPosterior, Target};

let data = DilutionDataset::new(&[3.0, 1.0, 0.0], &[6.0, 6.0, 6.0], &[1.0, 0.1, 0.01])?;
let posterior = QuantalPosterior::new(data);
let lp = posterior.unnorm_log_prob(0.8);
assert!(lp.is_finite());
# Ok::<(), bayes_qld::error::ValidationError>(())
```
*/

use num_traits::Float;

use crate::dataset::DilutionDataset;

/// Rate of the exponential prior on θ.
pub const PRIOR_RATE: f64 = 1e-4;

/// A continuous target distribution over a scalar parameter.
pub trait Target<T: Float> {
    /// Returns the log of the unnormalized density at `theta`.
    ///
    /// Only differences of this value are meaningful.
    fn unnorm_log_prob(&self, theta: T) -> T;
}

/**
Log of the binomial coefficient `C(n, k)`, computed as
`Σ_{j=k+1}^{n} ln j − Σ_{j=2}^{n-k} ln j`.

Summing logarithms instead of multiplying factorials keeps the result finite
for large well counts. `log_comb(n, n)` is exactly zero.

```rust
use bayes_qld::distributions::log_comb;

assert_eq!(log_comb(12.0_f64, 12.0), 0.0);
assert!((log_comb(5.0_f64, 2.0) - 10.0_f64.ln()).abs() < 1e-12);
```
*/
pub fn log_comb<T: Float>(n: T, k: T) -> T {
    let one = T::one();

    let mut upper = T::zero();
    let mut j = k + one;
    while j <= n {
        upper = upper + j.ln();
        j = j + one;
    }

    let mut lower = T::zero();
    let mut j = one + one;
    while j <= n - k {
        lower = lower + j.ln();
        j = j + one;
    }

    upper - lower
}

/**
Posterior of θ given a [`DilutionDataset`].

The value returned by [`Target::unnorm_log_prob`] is **not** a normalized
log-density: the prior's normalizing constant `ln λ` is dropped, and the
prior term `-λ·θ` is added once per dilution. Both only shift the value by a
θ-independent amount or fold into the rate, so the result is suitable for
Metropolis-Hastings ratios and nothing else.

At θ = 0 with any positive well the value is `-∞`; it is returned as such
rather than reported as an error.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct QuantalPosterior {
    data: DilutionDataset,
}

impl QuantalPosterior {
    pub fn new(data: DilutionDataset) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &DilutionDataset {
        &self.data
    }
}

impl Target<f64> for QuantalPosterior {
    fn unnorm_log_prob(&self, theta: f64) -> f64 {
        let mut lp = 0.0;
        for obs in &self.data {
            let pos = obs.positive_wells;
            let n = obs.total_wells;
            let d = obs.dilution_fraction;

            // ln(1 - exp(-dθ)); the term vanishes when no well is positive.
            let positive_term = if pos > 0.0 {
                pos * (-(-d * theta).exp_m1()).ln()
            } else {
                0.0
            };
            lp += log_comb(n, pos) + positive_term + (pos - n) * d * theta - PRIOR_RATE * theta;
        }
        lp
    }
}
