use crate::model::Snapshot;
use crate::optimizer::{Optimum, SweepRecord};
use anyhow::{Context, Result};
use rmp_serde::encode;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub fn write_sweep<W: Write>(writer: &mut W, records: &[SweepRecord]) -> Result<()> {
    for record in records {
        writeln!(
            writer,
            "Pandemic periods {} Optimal periods of distancing at end {}",
            record.periods_of_pandemic, record.periods_of_distancing
        )?;
    }
    Ok(())
}

pub fn write_optimum<W: Write>(writer: &mut W, optimum: &Optimum) -> Result<()> {
    writeln!(
        writer,
        "Optimal periods of distancing at end {}",
        optimum.periods_of_distancing
    )?;
    write_utility(writer, optimum.utility)
}

pub fn write_utility<W: Write>(writer: &mut W, utility: f64) -> Result<()> {
    writeln!(writer, "Utility {utility}")?;
    Ok(())
}

pub fn write_trace<W: Write>(writer: &mut W, snapshots: &[Snapshot]) -> Result<()> {
    writeln!(
        writer,
        "#period distancing        prob_dead      prob_immune prob_never_inf         benefits            costs"
    )?;
    for snapshot in snapshots {
        let state = &snapshot.state;
        let totals = &snapshot.totals;
        writeln!(
            writer,
            " {:>6} {:>10} {:016.14} {:016.14} {:016.14} {:16.8} {:16.8}",
            snapshot.period,
            snapshot.distancing,
            state.prob_dead,
            state.prob_immune,
            state.prob_never_infected,
            totals.benefits_of_life,
            totals.costs_of_distancing,
        )?;
    }
    Ok(())
}

/// Save sweep records to a MessagePack-encoded file.
pub fn save_records<P: AsRef<Path>>(file: P, records: &[SweepRecord]) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, records).context("failed to serialize records")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
