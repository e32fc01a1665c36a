//! Exhaustive search over distancing durations.
//!
//! Every candidate in `0..=periods_of_pandemic` is evaluated and the first
//! maximum wins, so ties resolve to the shortest distancing. The parallel
//! variants fan the evaluations out with Rayon and then select in
//! candidate order, returning exactly what the sequential scan returns.

use crate::engine::Engine;
use crate::model::Params;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Optimum {
    pub periods_of_distancing: usize,
    pub utility: f64,
}

/// Optimal policy for a single pandemic length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub periods_of_pandemic: usize,
    pub periods_of_distancing: usize,
    pub utility: f64,
}

/// Number of distancing periods that maximizes utility.
pub fn optimize_periods_of_distancing(params: &Params) -> usize {
    optimize(params).periods_of_distancing
}

pub fn optimize(params: &Params) -> Optimum {
    let engine = Engine::new(*params);
    select_best(candidates(&engine).map(|n| engine.utility(n)))
}

/// Like [optimize] but evaluates the candidates across all CPU cores.
pub fn optimize_parallel(params: &Params) -> Optimum {
    let engine = Engine::new(*params);
    let utilities: Vec<f64> = candidates(&engine)
        .into_par_iter()
        .map(|n| engine.utility(n))
        .collect();
    select_best(utilities)
}

/// Optimize every pandemic length in `pandemic_lengths`.
///
/// Scenarios run in parallel; records are returned in ascending order of
/// pandemic length.
pub fn sweep(params: &Params, pandemic_lengths: RangeInclusive<usize>) -> Vec<SweepRecord> {
    pandemic_lengths
        .into_par_iter()
        .map(|periods_of_pandemic| {
            let optimum = optimize(&params.with_periods_of_pandemic(periods_of_pandemic));
            log::debug!("optimized periods_of_pandemic = {periods_of_pandemic}: {optimum:?}");
            SweepRecord {
                periods_of_pandemic,
                periods_of_distancing: optimum.periods_of_distancing,
                utility: optimum.utility,
            }
        })
        .collect()
}

fn candidates(engine: &Engine) -> RangeInclusive<usize> {
    0..=engine.params().periods_of_pandemic
}

fn select_best<I>(utilities: I) -> Optimum
where
    I: IntoIterator<Item = f64>,
{
    let mut best = Optimum {
        periods_of_distancing: 0,
        utility: f64::NEG_INFINITY,
    };
    for (periods_of_distancing, utility) in utilities.into_iter().enumerate() {
        if utility > best.utility {
            best = Optimum {
                periods_of_distancing,
                utility,
            };
        }
    }
    best
}
