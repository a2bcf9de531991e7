use indicatif::ProgressBar;
use indicatif::{MultiProgress, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::error::Result;
use crate::samples::{MultiChainSamples, SampleRecord, Transition};

pub trait MarkovChain {
    /// Does one iteration of the chain, returning the new θ and whether the
    /// proposal was accepted.
    fn step(&mut self) -> Transition;

    /// Current θ without stepping.
    fn current_theta(&self) -> f64;
}

/// Runs `n_burnin` discarded steps, then records `n_samples` steps.
///
/// The returned record is freshly allocated on every call.
pub fn run_chain<M: MarkovChain>(
    chain: &mut M,
    n_burnin: usize,
    n_samples: usize,
) -> SampleRecord {
    for _ in 0..n_burnin {
        chain.step();
    }

    let mut out = SampleRecord::with_capacity(n_samples);
    for _ in 0..n_samples {
        out.push(chain.step());
    }
    out
}

pub fn run_chain_with_progress<M: MarkovChain>(
    chain: &mut M,
    n_burnin: usize,
    n_samples: usize,
    pb: &ProgressBar,
) -> SampleRecord {
    pb.set_length(n_burnin.saturating_add(n_samples) as u64);

    pb.set_message("burn-in");
    for _ in 0..n_burnin {
        chain.step();
        pb.inc(1);
    }

    let mut out = SampleRecord::with_capacity(n_samples);
    let mut accepted = 0_usize;
    for i in 0..n_samples {
        let t = chain.step();
        accepted += usize::from(t.accepted);
        out.push(t);

        pb.inc(1);
        if (i + 1) % 256 == 0 || i + 1 == n_samples {
            pb.set_message(format!("AcceptRate={:.3}", accepted as f64 / (i + 1) as f64));
        }
    }
    out
}

/// A trait for "anything that owns multiple MarkovChains".
pub trait HasChains {
    type Chain: MarkovChain + std::marker::Send;

    /// Returns a mutable reference to the vector of chains.
    fn chains_mut(&mut self) -> &mut Vec<Self::Chain>;
}

pub trait ChainRunner: HasChains {
    /// Runs every chain in parallel and concatenates their records in chain order.
    fn run(&mut self, n_burnin: usize, n_samples: usize) -> MultiChainSamples {
        let n_chains = self.chains_mut().len();
        info!("sampling {n_chains} chain(s): {n_burnin} burn-in, {n_samples} recorded steps each");

        // Indexed collect keeps chain order regardless of scheduling.
        let records: Vec<SampleRecord> = self
            .chains_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, chain)| {
                let record = run_chain(chain, n_burnin, n_samples);
                debug!(
                    "chain {} finished: acceptance rate {:.3}",
                    i + 1,
                    record.acceptance_rate()
                );
                record
            })
            .collect();

        MultiChainSamples::from_records(records)
    }

    /// Like [`ChainRunner::run`], with one progress bar per chain.
    fn run_with_progress(
        &mut self,
        n_burnin: usize,
        n_samples: usize,
    ) -> Result<MultiChainSamples> {
        let n_chains = self.chains_mut().len();
        info!(
            "sampling {n_chains} chain(s) with progress: \
             {n_burnin} burn-in, {n_samples} recorded steps each"
        );

        let multi = MultiProgress::new();
        let pb_style = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-");

        let records: Vec<SampleRecord> = self
            .chains_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, chain)| {
                let pb = multi.add(ProgressBar::new(n_burnin.saturating_add(n_samples) as u64));
                pb.set_prefix(format!("Chain {}", i + 1));
                pb.set_style(pb_style.clone());

                let record = run_chain_with_progress(chain, n_burnin, n_samples, &pb);

                pb.finish_with_message(format!("Done! AcceptRate={:.3}", record.acceptance_rate()));
                debug!(
                    "chain {} finished: acceptance rate {:.3}",
                    i + 1,
                    record.acceptance_rate()
                );
                record
            })
            .collect();

        Ok(MultiChainSamples::from_records(records))
    }
}

impl<T: HasChains> ChainRunner for T {}
