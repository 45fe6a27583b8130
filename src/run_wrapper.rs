//! A simulator wrapper
//!
//! Loads a textual program, builds a scheduler from one configuration
//! value and drives it cycle by cycle to the drain point.

use crate::config::SimConfig;
use crate::error::{ExecutionError, SimulatorError, SimulatorResult};
use crate::instruction::Instruction;
use crate::scheduler::{RunHistory, Scheduler};
use crate::snapshot::CycleSnapshot;

/// Decodes a whole program text: one instruction per line, blank
/// lines and `;` comment lines skipped. The first malformed line
/// aborts the load.
pub fn parse_program(content: &str) -> SimulatorResult<Vec<Instruction>> {
    let mut program = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let inst = Instruction::decode(line).map_err(|source| {
            SimulatorError::ProgramLoadError { line: line_num + 1, source }
        })?;
        program.push(inst);
    }
    Ok(program)
}

/// Reads and decodes a program file
pub fn load_program(path: &str) -> SimulatorResult<Vec<Instruction>> {
    let content = std::fs::read_to_string(path)?;
    parse_program(&content)
}

/// Drives a program to the drain point, handing each cycle's snapshot
/// to the observer. The configured cycle limit turns a livelocked
/// program into an error instead of an endless loop.
pub fn run_program<F>(
    config: &SimConfig,
    program: Vec<Instruction>,
    mut observer: F,
) -> SimulatorResult<Scheduler>
where
    F: FnMut(&CycleSnapshot) -> SimulatorResult<()>,
{
    let mut scheduler = Scheduler::new(config, program)?;

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        if let Some(limit) = config.max_cycles {
            if cycle > limit {
                return Err(ExecutionError::ExecutionLimitReached(limit).into());
            }
        }

        let done = scheduler.step()?;
        observer(&scheduler.snapshot(cycle))?;

        if done {
            return Ok(scheduler);
        }
    }
}

/// Run the program in the given file and return the accumulated
/// counters
pub fn run(path: &str, config: &SimConfig) -> SimulatorResult<RunHistory> {
    let program = load_program(path)?;
    let scheduler = run_program(config, program, |_| Ok(()))?;
    Ok(scheduler.history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let program = parse_program(
            "; initialization omitted\n\nADD R1, R2, R3\n   \nSUB R4, R2, R3\n",
        )
        .unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[1].text, "SUB R4, R2, R3");
    }

    #[test]
    fn test_parse_reports_the_failing_line() {
        let err = parse_program("ADD R1, R2, R3\nFROB R1\n").unwrap_err();
        match err {
            SimulatorError::ProgramLoadError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cycle_limit_catches_livelock() {
        // An unconditional self-jump reissues forever
        let config = SimConfig { max_cycles: Some(50), ..SimConfig::default() };
        let program = parse_program("JUMP 0").unwrap();

        let err = run_program(&config, program, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::ExecutionError(
                ExecutionError::ExecutionLimitReached(50)
            )
        ));
    }

    #[test]
    fn test_run_from_file() {
        let path = std::env::temp_dir()
            .join(format!("dispatch-prog-{}.txt", std::process::id()));
        std::fs::write(&path, "ADDI R1, R0, #42\n").unwrap();

        let history = run(path.to_str().unwrap(), &SimConfig::default()).unwrap();
        assert_eq!(history.issued, 1);
        assert_eq!(history.commits, 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_observer_sees_every_cycle() {
        let config = SimConfig {
            initial_values: vec![("R2".to_string(), 1), ("R3".to_string(), 2)],
            ..SimConfig::default()
        };
        let program = parse_program("ADD R1, R2, R3").unwrap();

        let mut cycles = Vec::new();
        let scheduler = run_program(&config, program, |snapshot| {
            cycles.push(snapshot.cycle);
            Ok(())
        })
        .unwrap();

        assert_eq!(cycles, (1..=cycles.len() as u64).collect::<Vec<_>>());
        assert_eq!(scheduler.history.cycles, cycles.len() as u64);
        assert_eq!(scheduler.history.issued, 1);
        assert_eq!(scheduler.history.commits, 1);
    }
}
