use crate::model::{Params, Snapshot, State, Totals};

/// Utility evaluator.
///
/// Simulates a whole lifetime period by period for a given number of
/// distancing periods, accruing discounted benefits of life and
/// discounted costs of distancing.
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    params: Params,
}

impl Engine {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Net utility of distancing during the last `periods_of_distancing`
    /// periods of the pandemic.
    pub fn utility(&self, periods_of_distancing: usize) -> f64 {
        self.evaluate(periods_of_distancing, |_| {})
    }

    /// Same as [`Engine::utility`], calling `observer` at the end of every period.
    pub fn evaluate<F>(&self, periods_of_distancing: usize, mut observer: F) -> f64
    where
        F: FnMut(&Snapshot),
    {
        let par = &self.params;

        let mut state = State::new();
        let mut totals = Totals::new();
        let mut discount_factor = 1.0;

        for period in 0..par.periods_of_life {
            // Mortality of this period only shows up from the next one.
            let prob_alive = state.prob_alive();

            // Running totals are rescaled by the discount factor of the
            // previous period rather than discounting each term on its own.
            let benefit = prob_alive * par.benefit_of_life_per_period;
            totals.benefits_of_life = benefit + totals.benefits_of_life * discount_factor;

            let mut distancing = false;
            if period < par.periods_of_pandemic {
                // Distancing covers the final periods of the pandemic.
                distancing = par.periods_of_pandemic - (period + 1) < periods_of_distancing;

                // Only the never infected distance.
                let prob_distancing = if distancing {
                    state.prob_never_infected
                } else {
                    0.0
                };
                let cost = prob_distancing * par.cost_of_distancing_per_period;
                totals.costs_of_distancing = cost + totals.costs_of_distancing * discount_factor;

                if !distancing {
                    let prob_infected = state.prob_never_infected
                        * par.risk_of_infection_if_not_distancing_per_period;
                    let prob_death = prob_infected * par.risk_of_death_given_infection;
                    state.prob_dead += prob_alive * prob_death;
                    state.prob_never_infected -= prob_infected;
                    state.prob_immune = 1.0 - state.prob_dead - state.prob_never_infected;
                }
            }

            discount_factor /= 1.0 + par.discount_rate;

            observer(&Snapshot {
                period,
                distancing,
                state,
                totals,
            });
        }

        totals.net()
    }
}

/// Net utility of `params` for the given number of distancing periods.
pub fn utility(params: &Params, periods_of_distancing: usize) -> f64 {
    Engine::new(*params).utility(periods_of_distancing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha12Rng;

    const TOL: f64 = 1e-9;

    fn single_period_params() -> Params {
        Params {
            benefit_of_life_per_period: 1.0,
            cost_of_distancing_per_period: 0.25,
            risk_of_infection_if_not_distancing_per_period: 0.05,
            risk_of_death_given_infection: 0.01,
            discount_rate: 0.0,
            periods_of_life: 600,
            periods_of_pandemic: 1,
        }
    }

    fn random_params(rng: &mut ChaCha12Rng) -> Params {
        let periods_of_life = rng.random_range(1..240);
        Params {
            benefit_of_life_per_period: rng.random_range(0.1..2.0),
            cost_of_distancing_per_period: rng.random_range(0.0..1.0),
            risk_of_infection_if_not_distancing_per_period: rng.random_range(0.0..=1.0),
            risk_of_death_given_infection: rng.random_range(0.0..=1.0),
            discount_rate: rng.random_range(0.0..0.1),
            periods_of_life,
            periods_of_pandemic: rng.random_range(0..=periods_of_life),
        }
    }

    fn trace(engine: &Engine, periods_of_distancing: usize) -> Vec<Snapshot> {
        let mut snapshots = Vec::new();
        engine.evaluate(periods_of_distancing, |snapshot| snapshots.push(*snapshot));
        snapshots
    }

    #[test]
    fn single_period_of_risk_matches_closed_form() {
        let params = single_period_params();

        // One exposed period, then 599 periods alive with probability 1 - 0.05 * 0.01.
        let expected = 1.0 + 599.0 * (1.0 - 0.05 * 0.01);
        assert!((utility(&params, 0) - expected).abs() < TOL);

        // One distancing period at cost 0.25, everyone alive for 600 periods.
        assert_eq!(utility(&params, 1), 600.0 - 0.25);
    }

    #[test]
    fn no_pandemic_gives_benefits_only() {
        let params = single_period_params().with_periods_of_pandemic(0);
        let engine = Engine::new(params);

        assert_eq!(engine.utility(0), 600.0);
        for snapshot in trace(&engine, 0) {
            assert!(!snapshot.distancing);
            assert_eq!(snapshot.totals.costs_of_distancing, 0.0);
            assert_eq!(snapshot.state, State::new());
        }
    }

    #[test]
    fn no_pandemic_with_discounting_follows_recurrence() {
        let params = Params {
            discount_rate: 0.1,
            periods_of_life: 3,
            periods_of_pandemic: 0,
            ..single_period_params()
        };

        // b0 = 1, b1 = 1 + b0 / 1.1, b2 = 1 + b1 / 1.1^2
        let b1 = 1.0 + 1.0 / 1.1;
        let b2 = 1.0 + b1 / (1.1 * 1.1);
        assert!((utility(&params, 0) - b2).abs() < TOL);
    }

    #[test]
    fn zero_discount_rate_keeps_plain_sums() {
        let params = Params {
            cost_of_distancing_per_period: 0.5,
            periods_of_life: 10,
            periods_of_pandemic: 4,
            ..single_period_params()
        };
        // Full distancing: nobody ever gets infected.
        assert!((utility(&params, 4) - (10.0 - 4.0 * 0.5)).abs() < TOL);
    }

    #[test]
    fn distancing_is_anchored_to_end_of_pandemic() {
        let params = single_period_params().with_periods_of_pandemic(6);
        let engine = Engine::new(params);

        let flags: Vec<_> = trace(&engine, 2)
            .iter()
            .take(8)
            .map(|snapshot| snapshot.distancing)
            .collect();
        assert_eq!(
            flags,
            [false, false, false, false, true, true, false, false]
        );
    }

    #[test]
    fn distancing_beyond_pandemic_covers_whole_window() {
        let params = single_period_params().with_periods_of_pandemic(6);
        let engine = Engine::new(params);

        assert_eq!(engine.utility(6), engine.utility(100));
        let snapshots = trace(&engine, 100);
        assert!(snapshots[..6].iter().all(|snapshot| snapshot.distancing));
        assert!(snapshots[6..].iter().all(|snapshot| !snapshot.distancing));
    }

    #[test]
    fn mortality_lags_by_one_period() {
        let params = Params {
            risk_of_infection_if_not_distancing_per_period: 1.0,
            risk_of_death_given_infection: 0.5,
            periods_of_life: 2,
            periods_of_pandemic: 1,
            ..single_period_params()
        };
        let snapshots = trace(&Engine::new(params), 0);

        // Death in period 0 does not reduce the benefit of period 0.
        assert_eq!(snapshots[0].totals.benefits_of_life, 1.0);
        assert_eq!(snapshots[0].state.prob_dead, 0.5);
        assert_eq!(snapshots[0].state.prob_immune, 0.5);
        assert_eq!(snapshots[0].state.prob_never_infected, 0.0);
        assert_eq!(snapshots[1].totals.benefits_of_life, 1.5);
    }

    #[test]
    fn traced_and_untraced_utilities_are_identical() {
        let engine = Engine::new(Params {
            discount_rate: 0.003,
            ..single_period_params().with_periods_of_pandemic(24)
        });
        for periods_of_distancing in 0..=24 {
            let untraced = engine.utility(periods_of_distancing);
            let mut last = None;
            let traced = engine.evaluate(periods_of_distancing, |snapshot| {
                last = Some(snapshot.totals.net());
            });
            assert_eq!(untraced.to_bits(), traced.to_bits());
            assert_eq!(last, Some(traced));
        }
    }

    #[test]
    fn state_stays_a_partition() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        for _ in 0..200 {
            let params = random_params(&mut rng);
            let periods_of_distancing = rng.random_range(0..=params.periods_of_pandemic);
            let snapshots = trace(&Engine::new(params), periods_of_distancing);

            assert_eq!(snapshots.len(), params.periods_of_life);
            for snapshot in snapshots {
                let state = snapshot.state;
                let sum = state.prob_dead + state.prob_immune + state.prob_never_infected;
                assert!((sum - 1.0).abs() < TOL, "{params:?}: sum is {sum}");
                for prob in [state.prob_dead, state.prob_immune, state.prob_never_infected] {
                    assert!((-TOL..=1.0 + TOL).contains(&prob), "{params:?}: {state:?}");
                }
            }
        }
    }

    #[test]
    fn dead_grows_and_never_infected_shrinks() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for _ in 0..200 {
            let params = random_params(&mut rng);
            let periods_of_distancing = rng.random_range(0..=params.periods_of_pandemic);

            let mut prev = State::new();
            Engine::new(params).evaluate(periods_of_distancing, |snapshot| {
                assert!(snapshot.state.prob_dead >= prev.prob_dead);
                assert!(snapshot.state.prob_never_infected <= prev.prob_never_infected);
                if snapshot.distancing {
                    assert_eq!(snapshot.state, prev);
                }
                prev = snapshot.state;
            });
        }
    }

    #[test]
    fn costs_only_accrue_while_distancing() {
        let params = single_period_params().with_periods_of_pandemic(12);
        let mut prev_costs = 0.0;
        Engine::new(params).evaluate(3, |snapshot| {
            if snapshot.distancing {
                assert!(snapshot.totals.costs_of_distancing > prev_costs);
            } else {
                assert_eq!(snapshot.totals.costs_of_distancing, prev_costs);
            }
            prev_costs = snapshot.totals.costs_of_distancing;
        });
        assert!((prev_costs - 0.75 * (1.0 - 0.05_f64).powi(9)).abs() < TOL);
    }
}
