//! Per-cycle observation surface
//!
//! Read-only records handed to loggers and visualizers once per cycle.
//! Serialization formats are layered on top of these; the core's
//! contract ends here.

use serde::Serialize;

use crate::station::Stage;

/// State of one reservation station at a cycle boundary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub name: String,
    pub stage: Stage,
    pub countdown: u32,
    /// Bound instruction's textual form; None while Idle
    pub instruction: Option<String>,
    /// Source-1 name (register or addressed cell)
    pub src1: Option<String>,
    /// Source-2 register name, or the immediate literal rendered
    pub src2: Option<String>,
    pub dest: Option<String>,
    pub vj: Option<i64>,
    pub vk: Option<i64>,
    /// Producing station names for operands still waiting
    pub qj: Option<String>,
    pub qk: Option<String>,
}

/// One register's state at a cycle boundary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisterSnapshot {
    pub name: String,
    pub value: i64,
}

/// Everything observable about one simulated cycle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleSnapshot {
    pub cycle: u64,
    pub stations: Vec<StationSnapshot>,
    pub registers: Vec<RegisterSnapshot>,
}
