//! Model data types.

use crate::config::check_num;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::Bound;

/// Parameters of the cost-benefit model.
///
/// Immutable for the duration of an evaluation, so a single value can be
/// shared across any number of concurrent evaluations.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Utility gained per period alive.
    pub benefit_of_life_per_period: f64,
    /// Utility lost per period spent distancing.
    pub cost_of_distancing_per_period: f64,

    /// Per-period infection probability of the never-infected when not distancing.
    pub risk_of_infection_if_not_distancing_per_period: f64,
    /// Death probability given infection.
    pub risk_of_death_given_infection: f64,

    /// Per-period discount rate applied to benefits and costs.
    pub discount_rate: f64,

    /// Number of periods simulated.
    pub periods_of_life: usize,
    /// Number of initial periods with an active infection risk.
    pub periods_of_pandemic: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            benefit_of_life_per_period: 1.0,
            cost_of_distancing_per_period: 0.25,
            risk_of_infection_if_not_distancing_per_period: 0.05,
            risk_of_death_given_infection: 0.01,
            discount_rate: 0.0,
            periods_of_life: 50 * 12,
            periods_of_pandemic: 12,
        }
    }
}

impl Params {
    /// Copy of these parameters with a different pandemic length.
    pub fn with_periods_of_pandemic(&self, periods_of_pandemic: usize) -> Self {
        Self {
            periods_of_pandemic,
            ..*self
        }
    }

    /// Check that every parameter lies in its meaningful range.
    ///
    /// # Errors
    /// Returns an error naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        check_num(
            self.benefit_of_life_per_period,
            (Bound::Excluded(0.0), Bound::Excluded(f64::INFINITY)),
        )
        .context("invalid benefit of life per period")?;
        check_num(self.cost_of_distancing_per_period, 0.0..f64::INFINITY)
            .context("invalid cost of distancing per period")?;

        check_num(
            self.risk_of_infection_if_not_distancing_per_period,
            0.0..=1.0,
        )
        .context("invalid risk of infection if not distancing")?;
        check_num(self.risk_of_death_given_infection, 0.0..=1.0)
            .context("invalid risk of death given infection")?;

        check_num(self.discount_rate, 0.0..f64::INFINITY).context("invalid discount rate")?;

        check_num(self.periods_of_life, 1..=1_000_000).context("invalid periods of life")?;
        check_num(self.periods_of_pandemic, 0..=self.periods_of_life)
            .context("invalid periods of pandemic")?;

        Ok(())
    }
}

/// Probability mass over the three health states.
///
/// The three probabilities add up to 1.0 at every period boundary.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct State {
    pub prob_dead: f64,
    pub prob_immune: f64,
    pub prob_never_infected: f64,
}

impl Default for State {
    /// Everyone alive and never infected.
    fn default() -> Self {
        Self {
            prob_dead: 0.0,
            prob_immune: 0.0,
            prob_never_infected: 1.0,
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prob_alive(&self) -> f64 {
        1.0 - self.prob_dead
    }
}

/// Discounted running totals.
#[derive(Debug, Default, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Totals {
    pub benefits_of_life: f64,
    pub costs_of_distancing: f64,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net utility: benefits minus costs.
    pub fn net(&self) -> f64 {
        self.benefits_of_life - self.costs_of_distancing
    }
}

/// Record of the simulation at the end of a single period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Snapshot {
    /// Period index, starting at 0.
    pub period: usize,

    /// Never-infected cohort was distancing during this period.
    pub distancing: bool,

    pub state: State,
    pub totals: Totals,
}
