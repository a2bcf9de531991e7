//! Bayesian estimation of infectious units per million (IUPM) from quantal
//! limited-dilution assays.
//!
//! The rate θ behind a dilution series is sampled with a log-space random-walk
//! Metropolis–Hastings sampler; several independent chains can be run in
//! parallel and merged. See [`api`] for the host-facing entry points.

pub mod api;
pub mod config;
pub mod core;
pub mod dataset;
pub mod distributions;
pub mod error;
pub mod metropolis_hastings;
pub mod random;
pub mod samples;
