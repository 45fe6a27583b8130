//! Simulation configuration
//!
//! One explicit value passed at construction time; nothing here is
//! process-wide state.

use std::collections::HashSet;

use crate::error::{SimulatorError, SimulatorResult};
use crate::instruction::Opcode;

/// One functional-unit class: how many stations it owns, their fixed
/// execution latency, and the operation kinds they accept
#[derive(Clone, Debug)]
pub struct UnitClass {
    pub name: String,
    pub count: usize,
    pub latency: u32,
    pub accepts: Vec<Opcode>,
}

impl UnitClass {
    pub fn new(name: &str, count: usize, latency: u32, accepts: Vec<Opcode>) -> Self {
        Self { name: name.to_string(), count, latency, accepts }
    }
}

/// Full simulation configuration
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Functional-unit classes, in station-enumeration order
    pub units: Vec<UnitClass>,
    /// Declared register bank (registers and memory cells), in
    /// snapshot order
    pub bank: Vec<String>,
    /// (register name, value) pairs applied before cycle 0;
    /// unknown names are a fatal error
    pub initial_values: Vec<(String, i64)>,
    /// Abort with an error after this many cycles (livelock guard)
    pub max_cycles: Option<u64>,
    /// Print per-cycle diagnostics to stderr
    pub verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        use Opcode::*;
        Self {
            units: vec![
                UnitClass::new("ADD", 3, 2, vec![Add, Sub, AddI, SubI]),
                UnitClass::new("MUL", 2, 10, vec![Mul, MulI]),
                UnitClass::new("DIV", 1, 40, vec![Div, DivI]),
                UnitClass::new("MEM", 2, 3, vec![Load, Store]),
                UnitClass::new("BRANCH", 1, 1, vec![Jump, Beqz, Bnez]),
            ],
            bank: default_bank(),
            initial_values: Vec::new(),
            max_cycles: None,
            verbose: false,
        }
    }
}

impl SimConfig {
    /// Rejects configurations the scheduler cannot run with
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.units.is_empty() {
            return Err(SimulatorError::ConfigError(
                "no functional-unit classes declared".to_string(),
            ));
        }
        for unit in &self.units {
            if unit.count == 0 {
                return Err(SimulatorError::ConfigError(format!(
                    "unit class '{}' has zero stations",
                    unit.name
                )));
            }
            if unit.latency == 0 {
                return Err(SimulatorError::ConfigError(format!(
                    "unit class '{}' has zero latency",
                    unit.name
                )));
            }
            if unit.accepts.is_empty() {
                return Err(SimulatorError::ConfigError(format!(
                    "unit class '{}' accepts no operations",
                    unit.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for name in &self.bank {
            if !seen.insert(name) {
                return Err(SimulatorError::ConfigError(format!(
                    "register '{}' declared twice",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Default register bank: R0..R31 plus memory cells M0, M8, ..., M248
fn default_bank() -> Vec<String> {
    let mut bank: Vec<String> = (0..32).map(|i| format!("R{}", i)).collect();
    bank.extend((0..32).map(|i| format!("M{}", i * 8)));
    bank
}
