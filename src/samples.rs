//! Containers for chain output.

/// Result of a single Metropolis-Hastings update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// θ after the update.
    pub theta: f64,
    /// Whether the proposal was accepted.
    pub accepted: bool,
}

/// Ordered draws recorded during the sampling phase of one chain.
///
/// Burn-in draws never enter a record. `accept[i]` is 1 if the i-th recorded
/// update accepted its proposal, 0 otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRecord {
    pub theta: Vec<f64>,
    pub accept: Vec<u32>,
}

impl SampleRecord {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            theta: Vec::with_capacity(n),
            accept: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, transition: Transition) {
        self.theta.push(transition.theta);
        self.accept.push(u32::from(transition.accepted));
    }

    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    /// Fraction of recorded updates that accepted their proposal.
    pub fn acceptance_rate(&self) -> f64 {
        mean_flag(&self.accept)
    }

    /// Posterior mean of θ over the recorded draws.
    pub fn mean_theta(&self) -> f64 {
        mean(&self.theta)
    }
}

/**
Output of several chains, concatenated in chain order.

The three vectors are parallel: entry `i` is draw `theta[i]` from chain
`chain_id[i]` (1-based) with accept flag `accept[i]`. All draws of chain `c`
precede those of chain `c + 1`, and each chain keeps its sampling order.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiChainSamples {
    pub theta: Vec<f64>,
    pub chain_id: Vec<u32>,
    pub accept: Vec<u32>,
}

impl MultiChainSamples {
    /// Concatenates per-chain records, labelling the first one as chain 1.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SampleRecord>,
    {
        let mut out = Self::default();
        for (id, record) in (1u32..).zip(records) {
            out.chain_id
                .extend(std::iter::repeat(id).take(record.len()));
            out.theta.extend(record.theta);
            out.accept.extend(record.accept);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    /// Number of distinct chains in the output.
    pub fn n_chains(&self) -> usize {
        self.chain_id.last().map_or(0, |&id| id as usize)
    }

    /// θ draws of chain `id` (1-based); empty if there is no such chain.
    pub fn chain(&self, id: u32) -> &[f64] {
        let start = self.chain_id.partition_point(|&c| c < id);
        let end = self.chain_id.partition_point(|&c| c <= id);
        &self.theta[start..end]
    }

    pub fn acceptance_rate(&self) -> f64 {
        mean_flag(&self.accept)
    }

    pub fn mean_theta(&self) -> f64 {
        mean(&self.theta)
    }

    /// θ draws multiplied by `scale`, e.g. to express them as infectious units per million.
    pub fn to_iupm(&self, scale: f64) -> Vec<f64> {
        self.theta.iter().map(|&t| t * scale).collect()
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn mean_flag(flags: &[u32]) -> f64 {
    flags.iter().map(|&a| f64::from(a)).sum::<f64>() / flags.len() as f64
}
