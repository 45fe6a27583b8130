//! Register file with the pending-producer relation

use std::collections::HashMap;

use crate::error::RegisterError;
use crate::station::StationId;

/// One named register (or addressable memory cell)
#[derive(Clone, Debug)]
pub struct Register {
    name: String,
    value: i64,
    /// The reservation station that will next write this register.
    /// A lookup key into the station pool, not a reference.
    producer: Option<StationId>,
}

impl Register {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn producer(&self) -> Option<StationId> {
        self.producer
    }
}

/// Register file simulation.
///
/// Registers keep their declaration order for snapshots; lookups go
/// through a name index.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    regs: Vec<Register>,
    index: HashMap<String, usize>,
}

impl RegisterFile {
    /// Builds a register file from a declared bank, all values zero
    pub fn make(bank: &[String]) -> Self {
        let mut regs = Vec::with_capacity(bank.len());
        let mut index = HashMap::with_capacity(bank.len());
        for name in bank {
            index.insert(name.clone(), regs.len());
            regs.push(Register {
                name: name.clone(),
                value: 0,
                producer: None,
            });
        }
        Self { regs, index }
    }

    fn lookup(&self, name: &str) -> Result<usize, RegisterError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| RegisterError::UnknownRegister(name.to_string()))
    }

    /// Current value and pending producer of a register
    pub fn read(&self, name: &str) -> Result<(i64, Option<StationId>), RegisterError> {
        let i = self.lookup(name)?;
        Ok((self.regs[i].value, self.regs[i].producer))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Records `station` as the next writer of `name`.
    ///
    /// Overwrites any prior producer; with in-order issue the newest
    /// issuing instruction is always the recorded producer.
    pub fn mark_pending(
        &mut self,
        name: &str,
        station: StationId,
    ) -> Result<(), RegisterError> {
        let i = self.lookup(name)?;
        self.regs[i].producer = Some(station);
        Ok(())
    }

    /// Commits `value` to `name` and clears the pending producer.
    ///
    /// Fails if `station` is not the recorded producer; producer
    /// identity is the forwarding key, so a superseded station must
    /// never write through.
    pub fn commit(
        &mut self,
        name: &str,
        station: StationId,
        value: i64,
    ) -> Result<(), RegisterError> {
        let i = self.lookup(name)?;
        if self.regs[i].producer != Some(station) {
            return Err(RegisterError::StaleProducer {
                register: name.to_string(),
                station,
            });
        }
        self.regs[i].value = value;
        self.regs[i].producer = None;
        Ok(())
    }

    /// Applies one initial-value assignment (before cycle 0)
    pub fn set_initial(&mut self, name: &str, value: i64) -> Result<(), RegisterError> {
        let i = self.lookup(name)?;
        self.regs[i].value = value;
        Ok(())
    }

    /// Registers in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.regs.iter()
    }
}
