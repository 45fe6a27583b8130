//! Reservation station pool

use serde::Serialize;

use crate::config::UnitClass;
use crate::instruction::{Instruction, Opcode};

/// Index of a station in the pool; stored wherever a producer must be
/// remembered (register file, waiting operands)
pub type StationId = usize;

/// Per-station stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[default]
    Idle,
    Issue,
    Execute,
    Write,
}

/// Captured operand state: a resolved value or the station that will
/// produce it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Ready(i64),
    WaitingOn(StationId),
}

impl Operand {
    pub fn is_ready(self) -> bool {
        matches!(self, Operand::Ready(_))
    }

    pub fn value(self) -> Option<i64> {
        match self {
            Operand::Ready(v) => Some(v),
            Operand::WaitingOn(_) => None,
        }
    }

    pub fn tag(self) -> Option<StationId> {
        match self {
            Operand::Ready(_) => None,
            Operand::WaitingOn(s) => Some(s),
        }
    }
}

/// What a source operand names, fixed at issue time.
///
/// Memory operands are already addressed here: a load's `j` is its
/// resolved cell, a store's `dest` likewise.
#[derive(Clone, Debug, PartialEq)]
pub enum OperandRef {
    Reg(String),
    Imm(i64),
}

/// An instruction bound to a station, plus its progressively filled
/// operand state
#[derive(Clone, Debug)]
pub struct InFlight {
    pub inst: Instruction,
    /// Program index, assigned at issue; never changes afterwards
    pub index: usize,
    /// Resolved destination: a register, or the addressed cell for a
    /// store; None for branches
    pub dest: Option<String>,
    /// Source operand descriptors
    pub j: Option<OperandRef>,
    pub k: Option<OperandRef>,
    /// Captured operand state; None only where the descriptor is None
    pub vj: Option<Operand>,
    pub vk: Option<Operand>,
}

impl InFlight {
    /// True once every present operand is Ready
    pub fn operands_ready(&self) -> bool {
        self.vj.map_or(true, Operand::is_ready)
            && self.vk.map_or(true, Operand::is_ready)
    }
}

/// One reservation station slot
#[derive(Clone, Debug)]
pub struct Station {
    name: String,
    class: String,
    latency: u32,
    accepts: Vec<Opcode>,
    pub stage: Stage,
    pub countdown: u32,
    pub slot: Option<InFlight>,
}

impl Station {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn latency(&self) -> u32 {
        self.latency
    }

    pub fn accepts(&self, op: Opcode) -> bool {
        self.accepts.contains(&op)
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }
}

/// Fixed pool of stations, in class-declaration order
#[derive(Clone, Debug)]
pub struct StationPool {
    stations: Vec<Station>,
}

impl StationPool {
    /// Creates the pool from the configured unit classes; station names
    /// are CLASS_1, CLASS_2, ... in creation order
    pub fn make(units: &[UnitClass]) -> Self {
        let mut stations = Vec::new();
        for unit in units {
            for i in 0..unit.count {
                stations.push(Station {
                    name: format!("{}_{}", unit.name, i + 1),
                    class: unit.name.clone(),
                    latency: unit.latency,
                    accepts: unit.accepts.clone(),
                    stage: Stage::Idle,
                    countdown: 0,
                    slot: None,
                });
            }
        }
        Self { stations }
    }

    /// First idle station accepting `op`, scanning in creation order.
    /// None means a structural hazard; the caller stalls.
    pub fn allocate(&self, op: Opcode) -> Option<StationId> {
        self.stations
            .iter()
            .position(|s| s.is_idle() && s.accepts(op))
    }

    /// Binds an instruction: Idle -> Issue, countdown = latency
    pub fn bind(&mut self, id: StationId, inflight: InFlight) {
        let station = &mut self.stations[id];
        station.stage = Stage::Issue;
        station.countdown = station.latency;
        station.slot = Some(inflight);
    }

    /// Issue -> Execute, once both operands are Ready
    pub fn start_execute(&mut self, id: StationId) {
        self.stations[id].stage = Stage::Execute;
    }

    /// One execution cycle: decrement the countdown
    pub fn tick_execute(&mut self, id: StationId) {
        self.stations[id].countdown -= 1;
    }

    /// Execute -> Write, claiming the single completion port
    pub fn release_as_write(&mut self, id: StationId) {
        self.stations[id].stage = Stage::Write;
    }

    /// Back to Idle, unbinding the instruction
    pub fn reset(&mut self, id: StationId) {
        let station = &mut self.stations[id];
        station.stage = Stage::Idle;
        station.countdown = 0;
        station.slot = None;
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id]
    }

    pub fn station_mut(&mut self, id: StationId) -> &mut Station {
        &mut self.stations[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = StationId> {
        0..self.stations.len()
    }

    pub fn all_idle(&self) -> bool {
        self.stations.iter().all(Station::is_idle)
    }
}
