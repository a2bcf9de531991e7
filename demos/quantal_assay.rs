//! Fits a six-step, four-fold dilution series and reports the posterior of θ.
//!
//! Run with `cargo run --release --example quantal_assay`.

use bayes_qld::api::run;
use bayes_qld::config::SamplerConfig;
use bayes_qld::dataset::DilutionDataset;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::error::Error;

/// Cells per well at the undiluted step, in millions.
const MILLION_CELLS_PER_WELL: f64 = 1.0;

fn quantile(sorted: &[f64], q: f64) -> f64 {
    sorted[((sorted.len() - 1) as f64 * q).round() as usize]
}

fn main() -> Result<(), Box<dyn Error>> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let data = DilutionDataset::new(
        &[12.0, 9.0, 4.0, 1.0, 0.0, 0.0],
        &[12.0, 12.0, 12.0, 12.0, 12.0, 12.0],
        &[1.0, 0.25, 0.0625, 0.015625, 0.00390625, 0.0009765625],
    )?;

    let config = SamplerConfig::new(2_000, 20_000)
        .set_chains(4)
        .set_seed(42)
        .set_progress(true);
    let samples = run(&data, &config)?;

    let mut iupm = samples.to_iupm(1.0 / MILLION_CELLS_PER_WELL);
    iupm.sort_unstable_by(f64::total_cmp);

    println!("Generated {} samples", samples.len());
    println!("Acceptance rate: {:.3}", samples.acceptance_rate());
    for id in 1..=samples.n_chains() as u32 {
        let chain = samples.chain(id);
        let mean = chain.iter().sum::<f64>() / chain.len() as f64;
        println!("  chain {id}: mean theta {mean:.3}");
    }
    println!(
        "IUPM posterior mean {:.3}, 95% interval [{:.3}, {:.3}]",
        iupm.iter().sum::<f64>() / iupm.len() as f64,
        quantile(&iupm, 0.025),
        quantile(&iupm, 0.975)
    );
    Ok(())
}
