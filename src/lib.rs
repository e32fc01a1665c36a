//! Optimal duration of social distancing in a cost-benefit model of a pandemic.
//!
//! Over a lifetime of `periods_of_life` periods, probability mass moves
//! between three health states (never infected, immune and dead) while
//! discounted benefits of life and discounted costs of distancing accrue.
//! Distancing is applied during the last periods of the pandemic and the
//! duration with the highest net utility is selected.

pub mod config;
pub mod engine;
pub mod model;
pub mod optimizer;
pub mod report;

pub use config::Config;
pub use engine::{Engine, utility};
pub use model::Params;
pub use optimizer::{optimize, optimize_parallel, optimize_periods_of_distancing, sweep};
