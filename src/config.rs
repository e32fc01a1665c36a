use crate::model::Params;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::{RangeBounds, RangeInclusive},
    path::Path,
};

/// Run configuration.
///
/// Every section and key is optional; missing values fall back to the
/// defaults of [`Params`] and [`SweepConfig`].
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Model parameters.
    pub model: Params,

    /// Range of pandemic lengths swept by the report.
    pub sweep: SweepConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub min_periods_of_pandemic: usize,
    pub max_periods_of_pandemic: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_periods_of_pandemic: 1,
            max_periods_of_pandemic: 3 * 12,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Validate the model parameters over the whole sweep range.
    ///
    /// `model.periods_of_pandemic` is only used by single-scenario runs,
    /// which validate it on their own.
    pub fn validate(&self) -> Result<()> {
        let min = self.sweep.min_periods_of_pandemic;
        let max = self.sweep.max_periods_of_pandemic;
        check_num(max, 0..=self.model.periods_of_life)
            .context("invalid maximum periods of pandemic")?;
        check_num(min, 0..=max).context("invalid minimum periods of pandemic")?;

        self.model
            .with_periods_of_pandemic(max)
            .validate()
            .context("invalid model parameters")?;

        Ok(())
    }

    pub fn pandemic_lengths(&self) -> RangeInclusive<usize> {
        self.sweep.min_periods_of_pandemic..=self.sweep.max_periods_of_pandemic
    }
}

pub fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
