use std::process;

use sim_lib::config::SimConfig;
use sim_lib::error::SimulatorResult;
use sim_lib::run_wrapper;

/// Demo programs: name, source text, initial register values
const PROGRAMS: &[(&str, &str, &[(&str, i64)])] = &[
    (
        "dependent-chain",
        "ADD R1, R2, R3\nADD R4, R1, R3\nMUL R5, R4, R1\n",
        &[("R2", 11), ("R3", 12)],
    ),
    (
        "independent",
        "ADD R1, R2, R3\nMUL R4, R2, R3\nSUB R5, R3, R2\nADDI R6, R2, #100\n",
        &[("R2", 11), ("R3", 12)],
    ),
    (
        "countdown-loop",
        "SUBI R1, R1, #1\nBNEZ R1, 0\n",
        &[("R1", 5)],
    ),
    (
        "store-load",
        "STORE R5, 8(R0)\nLOAD R2, 8(R0)\nADDI R6, R2, #1\n",
        &[("R5", 7)],
    ),
    (
        "division",
        "DIV R1, R2, R3\nADDI R4, R1, #1\n",
        &[("R2", 84), ("R3", 2)],
    ),
];

fn main() {
    if let Err(e) = run_eval() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval() -> SimulatorResult<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["Program", "Cycles", "Instructions", "CPI"])?;

    for (name, source, initial_values) in PROGRAMS {
        let config = SimConfig {
            initial_values: initial_values
                .iter()
                .map(|(reg, value)| (reg.to_string(), *value))
                .collect(),
            max_cycles: Some(100_000),
            ..SimConfig::default()
        };

        let program = run_wrapper::parse_program(source)?;
        match run_wrapper::run_program(&config, program, |_| Ok(())) {
            Ok(scheduler) => {
                let history = scheduler.history;
                let cpi = history.cycles as f64 / history.issued as f64;
                writer.write_record([
                    name.to_string(),
                    history.cycles.to_string(),
                    history.issued.to_string(),
                    format!("{:.3}", cpi),
                ])?;
            }
            Err(e) => {
                eprintln!("Warning: Failed to run program '{}': {}", name, e);
                writer.write_record([*name, "Error", "Error", "Error"])?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
