use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use distancing::{Config, Engine, Params, engine, optimizer, report};
use std::{io::Write, path::PathBuf};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the optimal distancing for a range of pandemic lengths (default).
    Sweep {
        #[arg(long)]
        min_periods_of_pandemic: Option<usize>,

        #[arg(long)]
        max_periods_of_pandemic: Option<usize>,

        /// Also save the records to a MessagePack file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the optimal distancing for a single pandemic length.
    Optimize {
        #[arg(long)]
        periods_of_pandemic: Option<usize>,

        /// Evaluate candidates on all cores.
        #[arg(long)]
        parallel: bool,
    },

    /// Print the utility of a single policy.
    Utility {
        #[arg(long)]
        periods_of_pandemic: Option<usize>,

        #[arg(long)]
        periods_of_distancing: usize,
    },

    /// Print the state of every period for a single policy.
    Trace {
        #[arg(long)]
        periods_of_pandemic: Option<usize>,

        #[arg(long)]
        periods_of_distancing: usize,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mut cfg = match &args.config {
        Some(file) => Config::from_file(file).context("failed to construct cfg")?,
        None => Config::default(),
    };
    log::info!("{cfg:#?}");

    let command = args.command.unwrap_or(Command::Sweep {
        min_periods_of_pandemic: None,
        max_periods_of_pandemic: None,
        output: None,
    });

    let mut out = std::io::stdout().lock();

    match command {
        Command::Sweep {
            min_periods_of_pandemic,
            max_periods_of_pandemic,
            output,
        } => {
            if let Some(min) = min_periods_of_pandemic {
                cfg.sweep.min_periods_of_pandemic = min;
            }
            if let Some(max) = max_periods_of_pandemic {
                cfg.sweep.max_periods_of_pandemic = max;
            }
            cfg.validate().context("invalid sweep range")?;

            let records = optimizer::sweep(&cfg.model, cfg.pandemic_lengths());
            report::write_sweep(&mut out, &records).context("failed to write sweep")?;

            if let Some(file) = output {
                report::save_records(&file, &records)
                    .with_context(|| format!("failed to save {file:?}"))?;
                log::info!("saved {file:?}");
            }
        }
        Command::Optimize {
            periods_of_pandemic,
            parallel,
        } => {
            let params = model_params(&cfg, periods_of_pandemic)?;
            let optimum = if parallel {
                optimizer::optimize_parallel(&params)
            } else {
                optimizer::optimize(&params)
            };
            report::write_optimum(&mut out, &optimum).context("failed to write optimum")?;
        }
        Command::Utility {
            periods_of_pandemic,
            periods_of_distancing,
        } => {
            let params = model_params(&cfg, periods_of_pandemic)?;
            let utility = engine::utility(&params, periods_of_distancing);
            report::write_utility(&mut out, utility).context("failed to write utility")?;
        }
        Command::Trace {
            periods_of_pandemic,
            periods_of_distancing,
        } => {
            let params = model_params(&cfg, periods_of_pandemic)?;
            let mut snapshots = Vec::with_capacity(params.periods_of_life);
            let utility = Engine::new(params)
                .evaluate(periods_of_distancing, |snapshot| snapshots.push(*snapshot));
            report::write_trace(&mut out, &snapshots).context("failed to write trace")?;
            report::write_utility(&mut out, utility).context("failed to write utility")?;
        }
    }

    out.flush().context("failed to flush stdout")?;

    Ok(())
}

fn model_params(cfg: &Config, periods_of_pandemic: Option<usize>) -> Result<Params> {
    let params = match periods_of_pandemic {
        Some(n) => cfg.model.with_periods_of_pandemic(n),
        None => cfg.model,
    };
    params.validate().context("invalid model parameters")?;
    Ok(params)
}
