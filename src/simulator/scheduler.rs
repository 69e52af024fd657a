// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// scheduler.rs
//
// This file contains the scheduler: it owns the register-status map and the
// issue counter, dispatches the instruction-queue head to a free station of
// the matching pool, and releases register-status entries when their
// producing station wins the common data bus.

use std::collections::HashMap;

use log::debug;

use super::components::{PoolKind, QueueEntry, StationId, StationPools, Tag};
use super::config::Algorithm;
use super::instruction::{Instruction, Register};

/// The issue and register-status unit.
///
/// The register-status map has one entry per floating-point register plus
/// one for "no register" (the destination of a store); each entry is either
/// `RegisterFile` or the station currently computing the register's next
/// value. Only the scheduler mutates the map.
#[derive(Debug)]
pub struct Scheduler {
    algorithm: Algorithm,
    issue_number: usize,
    register_status: HashMap<Register, Tag>,
}

impl Scheduler {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            issue_number: 0,
            register_status: Self::fresh_register_status(),
        }
    }

    fn fresh_register_status() -> HashMap<Register, Tag> {
        let mut status = HashMap::with_capacity(33);
        for index in 0..32 {
            status.insert(Register::F(index), Tag::RegisterFile);
        }
        status.insert(Register::None, Tag::RegisterFile);
        status
    }

    pub fn reset(&mut self) {
        self.issue_number = 0;
        self.register_status = Self::fresh_register_status();
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    /// Current provider of a register's next value. Address registers are
    /// always register-file-resident.
    pub fn register_status(&self, register: Register) -> Tag {
        self.register_status
            .get(&register)
            .copied()
            .unwrap_or(Tag::RegisterFile)
    }

    /// Try to issue the queue head to a free station of the matching pool.
    /// Returns false on a WAW hazard (scoreboard only) or when the pool has
    /// no free station (structural hazard).
    pub fn attempt_issue(&mut self, head: Option<&QueueEntry>, stations: &mut StationPools) -> bool {
        let Some(entry) = head else {
            return false;
        };
        let instruction = &entry.instruction;
        if self.algorithm.is_scoreboard() && self.has_waw_hazard(instruction) {
            debug!("issue: WAW hazard on {}, stalling", instruction.destination);
            return false;
        }
        let pool = pool_for(instruction);
        let Some(id) = stations.find_free(pool) else {
            debug!("issue: no free {} station, stalling", pool.label());
            return false;
        };
        let (source1_provider, source2_provider) = self.providers_for(instruction);
        if !instruction.destination.is_none() {
            self.register_status
                .insert(instruction.destination, Tag::Station(id));
        }
        let issue_number = self.issue_number;
        stations
            .get_mut(id)
            .issue(entry.clone(), source1_provider, source2_provider, issue_number);
        self.issue_number += 1;
        debug!(
            "issue #{}: '{}' -> station {}",
            issue_number, instruction.raw_text, id
        );
        true
    }

    /// Operand providers at issue time. Loads read only the register file;
    /// a store's address register is treated as register-file-resident while
    /// its data register goes through the status map.
    fn providers_for(&self, instruction: &Instruction) -> (Tag, Tag) {
        if instruction.is_load() {
            (Tag::RegisterFile, Tag::RegisterFile)
        } else if instruction.is_store() {
            (self.register_status(instruction.source1), Tag::RegisterFile)
        } else {
            (
                self.register_status(instruction.source1),
                self.register_status(instruction.source2),
            )
        }
    }

    fn has_waw_hazard(&self, instruction: &Instruction) -> bool {
        !self
            .register_status(instruction.destination)
            .is_register_file()
    }

    /// After write-back arbitration: mark the winner's destination register
    /// as register-file-resident again, unless a later issue has already
    /// renamed it to another station.
    pub fn update_register_status(&mut self, writer: Option<StationId>, stations: &StationPools) {
        let Some(id) = writer else {
            return;
        };
        let Some(instruction) = stations.get(id).instruction() else {
            return;
        };
        let destination = instruction.destination;
        if self.register_status(destination) == Tag::Station(id) {
            self.register_status.insert(destination, Tag::RegisterFile);
            debug!("cdb: {} now register-file-resident", destination);
        }
    }
}

fn pool_for(instruction: &Instruction) -> PoolKind {
    if instruction.is_add_sub() {
        PoolKind::AddSub
    } else if instruction.is_mul_div() {
        PoolKind::MulDiv
    } else {
        PoolKind::LoadStore
    }
}
