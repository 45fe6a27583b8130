//! Trace persistence
//!
//! Consumes the per-cycle observation surface and writes it out as a
//! text log, a JSON document and a flat CSV table. No scheduling
//! logic lives here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SimulatorResult;
use crate::snapshot::CycleSnapshot;

/// Writes one run's trace to `BASE.txt`, `BASE.json` and `BASE.csv`
pub struct TraceLogger {
    text: BufWriter<File>,
    csv: csv::Writer<File>,
    json_path: PathBuf,
    snapshots: Vec<CycleSnapshot>,
}

impl TraceLogger {
    pub fn create(base: &Path) -> SimulatorResult<Self> {
        let text = BufWriter::new(File::create(base.with_extension("txt"))?);

        let mut csv = csv::Writer::from_path(base.with_extension("csv"))?;
        csv.write_record([
            "cycle",
            "station",
            "stage",
            "countdown",
            "instruction",
            "src1",
            "src2",
            "dest",
            "vj",
            "vk",
            "qj",
            "qk",
        ])?;

        Ok(Self {
            text,
            csv,
            json_path: base.with_extension("json"),
            snapshots: Vec::new(),
        })
    }

    /// Appends one cycle to the text and CSV outputs and buffers it
    /// for the JSON document
    pub fn record(&mut self, snapshot: &CycleSnapshot) -> SimulatorResult<()> {
        writeln!(self.text, "Cycle {}:", snapshot.cycle)?;
        for station in &snapshot.stations {
            match &station.instruction {
                Some(inst) => writeln!(
                    self.text,
                    "  {}: {:?} ({}) {}",
                    station.name, station.stage, station.countdown, inst
                )?,
                None => writeln!(self.text, "  {}: Idle", station.name)?,
            }
        }
        let registers: Vec<String> = snapshot
            .registers
            .iter()
            .map(|r| format!("{}={}", r.name, r.value))
            .collect();
        writeln!(self.text, "  registers: {}", registers.join(" "))?;
        writeln!(self.text)?;

        let blank = String::new;
        for s in &snapshot.stations {
            self.csv.write_record([
                snapshot.cycle.to_string(),
                s.name.clone(),
                format!("{:?}", s.stage),
                s.countdown.to_string(),
                s.instruction.clone().unwrap_or_else(blank),
                s.src1.clone().unwrap_or_else(blank),
                s.src2.clone().unwrap_or_else(blank),
                s.dest.clone().unwrap_or_else(blank),
                s.vj.map(|v| v.to_string()).unwrap_or_else(blank),
                s.vk.map(|v| v.to_string()).unwrap_or_else(blank),
                s.qj.clone().unwrap_or_else(blank),
                s.qk.clone().unwrap_or_else(blank),
            ])?;
        }

        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    /// Flushes the incremental outputs and writes the JSON document
    pub fn finish(mut self) -> SimulatorResult<()> {
        self.text.flush()?;
        self.csv.flush()?;

        let json = BufWriter::new(File::create(&self.json_path)?);
        serde_json::to_writer_pretty(json, &self.snapshots)?;
        Ok(())
    }
}
