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

// components.rs
//
// This file contains the hardware components of the scheduling simulator:
// the instruction memory and queue, the reservation stations with their
// per-cycle state machine, the station pools, the common data bus, and the
// data-memory port. The two bus arbiters resolve contention by issue order;
// their selection logic is factored into pure helpers.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

use super::config::{Algorithm, ProcessorConfig};
use super::instruction::Instruction;

/// Number of slots in the instruction queue.
pub const INSTRUCTION_QUEUE_SLOTS: usize = 3;

/// The three classes of reservation stations, one per functional-unit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    LoadStore,
    AddSub,
    MulDiv,
}

impl PoolKind {
    pub const ALL: [PoolKind; 3] = [PoolKind::LoadStore, PoolKind::AddSub, PoolKind::MulDiv];

    pub fn label(&self) -> &'static str {
        match self {
            PoolKind::LoadStore => "load/store",
            PoolKind::AddSub => "add/sub",
            PoolKind::MulDiv => "mul/div",
        }
    }

    fn short_label(&self) -> &'static str {
        match self {
            PoolKind::LoadStore => "ls",
            PoolKind::AddSub => "as",
            PoolKind::MulDiv => "md",
        }
    }
}

/// Stable identity of a reservation station: the pool it belongs to plus its
/// slot index within the pool. Identities are only meaningful for the
/// station's current occupancy; they are never dereferenced across a reset
/// or a pool rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationId {
    pub pool: PoolKind,
    pub index: usize,
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pool.short_label(), self.index)
    }
}

/// A register-status entry: either the value lives in the register file, or
/// the named station is currently computing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    RegisterFile,
    Station(StationId),
}

impl Tag {
    pub fn is_register_file(&self) -> bool {
        matches!(self, Tag::RegisterFile)
    }
}

/// Read-only program storage, addressed by the instruction pointer.
#[derive(Debug, Default)]
pub struct InstructionMemory {
    instructions: Vec<Instruction>,
}

impl InstructionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored program.
    pub fn upload(&mut self, instructions: Vec<Instruction>) {
        self.instructions = instructions;
    }

    pub fn at(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// An instruction waiting in the queue, paired with its program-order index
/// (the row it occupies in the timing table).
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub index: usize,
    pub instruction: Instruction,
}

/// Bounded FIFO of fetched-but-not-issued instructions. The head is always
/// the program-order-oldest pending instruction.
#[derive(Debug, Default)]
pub struct InstructionQueue {
    entries: VecDeque<QueueEntry>,
}

impl InstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn num_slots() -> usize {
        INSTRUCTION_QUEUE_SLOTS
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_space(&self) -> bool {
        self.entries.len() < INSTRUCTION_QUEUE_SLOTS
    }

    pub fn num_empty_slots(&self) -> usize {
        INSTRUCTION_QUEUE_SLOTS - self.entries.len()
    }

    /// Append an entry; silently dropped when the queue is full.
    pub fn insert(&mut self, entry: QueueEntry) {
        if self.has_space() {
            self.entries.push_back(entry);
        }
    }

    pub fn top(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    pub fn consume(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn texts(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.instruction.raw_text.clone())
            .collect()
    }
}

/// Per-cycle state of a reservation station. `Executing` latches the pool
/// latency at entry, so a latency reconfiguration only affects stations that
/// begin executing afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationState {
    Free,
    JustIssued,
    WaitingForOperands,
    ReadOperands,
    Executing { counter: usize, latency: usize },
    AttemptMemoryAccess,
    Memory,
    AttemptWriteback,
    WriteBack,
}

/// A reservation station: one slot of a functional-unit pool, holding one
/// issued instruction and tracking where its operands come from.
#[derive(Debug, Clone)]
pub struct ReservationStation {
    id: StationId,
    latency_in_cycles: usize,
    state: StationState,
    source1_provider: Tag,
    source2_provider: Tag,
    instruction: Option<Instruction>,
    program_index: usize,
    issue_number: usize,
    writeback_succeeded: bool,
    memory_access_succeeded: bool,
}

impl ReservationStation {
    pub fn new(id: StationId, latency_in_cycles: usize) -> Self {
        Self {
            id,
            latency_in_cycles,
            state: StationState::Free,
            source1_provider: Tag::RegisterFile,
            source2_provider: Tag::RegisterFile,
            instruction: None,
            program_index: 0,
            issue_number: 0,
            writeback_succeeded: false,
            memory_access_succeeded: false,
        }
    }

    pub fn reset(&mut self) {
        self.state = StationState::Free;
        self.source1_provider = Tag::RegisterFile;
        self.source2_provider = Tag::RegisterFile;
        self.instruction = None;
        self.program_index = 0;
        self.issue_number = 0;
        self.writeback_succeeded = false;
        self.memory_access_succeeded = false;
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    pub fn instruction(&self) -> Option<&Instruction> {
        self.instruction.as_ref()
    }

    pub fn program_index(&self) -> usize {
        self.program_index
    }

    pub fn issue_number(&self) -> usize {
        self.issue_number
    }

    pub fn latency_in_cycles(&self) -> usize {
        self.latency_in_cycles
    }

    pub fn set_latency_cycles(&mut self, cycles: usize) {
        self.latency_in_cycles = cycles;
    }

    pub fn is_free(&self) -> bool {
        matches!(self.state, StationState::Free)
    }

    pub fn is_busy(&self) -> bool {
        !self.is_free()
    }

    pub fn is_just_issued(&self) -> bool {
        matches!(self.state, StationState::JustIssued)
    }

    pub fn source_providers(&self) -> (Tag, Tag) {
        (self.source1_provider, self.source2_provider)
    }

    /// One-character marker for the timing table; executing states carry the
    /// one-based cycle number of the execution.
    pub fn state_glyph(&self) -> String {
        match self.state {
            StationState::Free => String::new(),
            StationState::JustIssued => "I".to_string(),
            StationState::WaitingForOperands
            | StationState::AttemptMemoryAccess
            | StationState::AttemptWriteback => "-".to_string(),
            StationState::ReadOperands => "R".to_string(),
            StationState::Executing { counter, .. } => format!("E{}", counter + 1),
            StationState::Memory => "M".to_string(),
            StationState::WriteBack => "W".to_string(),
        }
    }

    /// Accept an instruction from the scheduler.
    pub fn issue(
        &mut self,
        entry: QueueEntry,
        source1_provider: Tag,
        source2_provider: Tag,
        issue_number: usize,
    ) {
        self.instruction = Some(entry.instruction);
        self.program_index = entry.index;
        self.source1_provider = source1_provider;
        self.source2_provider = source2_provider;
        self.state = StationState::JustIssued;
        self.issue_number = issue_number;
    }

    pub(crate) fn set_writeback_success(&mut self, succeeded: bool) {
        self.writeback_succeeded = succeeded;
    }

    pub(crate) fn set_memory_access_success(&mut self, succeeded: bool) {
        self.memory_access_succeeded = succeeded;
    }

    /// Advance the state machine by one cycle. Requests to the common data
    /// bus and the memory port are registered here; their outcomes are
    /// consumed in `after_tick`.
    pub fn tick(
        &mut self,
        algorithm: Algorithm,
        bus: &mut CommonDataBus,
        memory: &mut DataMemoryPort,
    ) {
        match self.state {
            StationState::Free => {},
            StationState::JustIssued => self.just_issued_logic(algorithm, bus),
            StationState::WaitingForOperands => self.waiting_for_operands_logic(algorithm, bus, memory),
            StationState::ReadOperands => {
                self.state = StationState::Executing {
                    counter: 0,
                    latency: self.latency_in_cycles,
                };
            },
            StationState::Executing { .. } => self.executing_logic(bus, memory),
            StationState::AttemptMemoryAccess => {}, // resolved in after_tick()
            StationState::Memory => self.memory_logic(bus),
            StationState::AttemptWriteback => {}, // resolved in after_tick()
            StationState::WriteBack => self.reset(),
        }
    }

    /// Consume the arbitration outcomes of the current cycle.
    pub fn after_tick(&mut self) {
        if matches!(self.state, StationState::AttemptMemoryAccess) && self.memory_access_succeeded {
            self.state = StationState::Memory;
            self.memory_access_succeeded = false;
        }
        if matches!(self.state, StationState::AttemptWriteback) && self.writeback_succeeded {
            self.state = StationState::WriteBack;
            self.writeback_succeeded = false;
        }
    }

    pub fn is_issued_earlier_than(&self, other: &ReservationStation) -> bool {
        self.issue_number < other.issue_number
    }

    /// True when this station was issued earlier than `writer`, still needs
    /// to read its operands, and one of those operands is the register
    /// `writer` is about to overwrite.
    pub fn has_war_hazard_with(&self, writer: &ReservationStation) -> bool {
        let still_needs_operands = matches!(
            self.state,
            StationState::WaitingForOperands | StationState::ReadOperands
        );
        if !still_needs_operands || !self.is_issued_earlier_than(writer) {
            return false;
        }
        let (Some(mine), Some(theirs)) = (self.instruction.as_ref(), writer.instruction.as_ref())
        else {
            return false;
        };
        let destination = theirs.destination;
        !destination.is_none() && (mine.source1 == destination || mine.source2 == destination)
    }

    fn just_issued_logic(&mut self, algorithm: Algorithm, bus: &CommonDataBus) {
        let is_store = self.instruction.as_ref().is_some_and(Instruction::is_store);
        if self.operands_ready(bus) {
            self.state = if algorithm.is_tomasulo() {
                StationState::Executing {
                    counter: 0,
                    latency: self.latency_in_cycles,
                }
            } else {
                StationState::ReadOperands
            };
        } else if algorithm.is_tomasulo() && is_store {
            // A store's address computation starts even while the data
            // operand is still in flight.
            self.state = StationState::Executing {
                counter: 0,
                latency: self.latency_in_cycles,
            };
        } else {
            self.state = StationState::WaitingForOperands;
        }
    }

    fn waiting_for_operands_logic(
        &mut self,
        algorithm: Algorithm,
        bus: &CommonDataBus,
        memory: &mut DataMemoryPort,
    ) {
        if !self.operands_ready(bus) {
            return;
        }
        let is_store = self.instruction.as_ref().is_some_and(Instruction::is_store);
        if is_store {
            if algorithm.is_tomasulo() {
                memory.attempt_access(self.id);
                self.state = StationState::AttemptMemoryAccess;
            } else {
                self.state = StationState::ReadOperands;
            }
        } else if algorithm.is_tomasulo() {
            self.state = StationState::Executing {
                counter: 0,
                latency: self.latency_in_cycles,
            };
        } else {
            self.state = StationState::ReadOperands;
        }
    }

    fn executing_logic(&mut self, bus: &mut CommonDataBus, memory: &mut DataMemoryPort) {
        let StationState::Executing { counter, latency } = self.state else {
            return;
        };
        let counter = counter + 1;
        if counter < latency {
            self.state = StationState::Executing { counter, latency };
            return;
        }
        let (is_load, is_store) = match self.instruction.as_ref() {
            Some(instruction) => (instruction.is_load(), instruction.is_store()),
            None => return,
        };
        if is_load || (is_store && self.operands_ready(bus)) {
            memory.attempt_access(self.id);
            self.state = StationState::AttemptMemoryAccess;
        } else if is_store {
            // Address is computed but the data operand is still pending.
            self.state = StationState::WaitingForOperands;
        } else {
            bus.attempt_write(self.id);
            self.state = StationState::AttemptWriteback;
        }
    }

    fn memory_logic(&mut self, bus: &mut CommonDataBus) {
        if self.instruction.as_ref().is_some_and(Instruction::is_store) {
            self.reset();
        } else {
            bus.attempt_write(self.id);
            self.state = StationState::AttemptWriteback;
        }
    }

    /// Check both operand providers, matching pending ones against the
    /// current write-back winner on the bus.
    fn operands_ready(&mut self, bus: &CommonDataBus) -> bool {
        let winner = bus.writing_station();
        let op1_ready = Self::resolve_provider(&mut self.source1_provider, winner);
        let op2_ready = Self::resolve_provider(&mut self.source2_provider, winner);
        op1_ready && op2_ready
    }

    fn resolve_provider(provider: &mut Tag, winner: Option<StationId>) -> bool {
        match *provider {
            Tag::RegisterFile => true,
            Tag::Station(id) if Some(id) == winner => {
                *provider = Tag::RegisterFile;
                true
            },
            Tag::Station(_) => false,
        }
    }
}

/// The three reservation-station pools, indexed by `StationId`.
#[derive(Debug)]
pub struct StationPools {
    load_store: Vec<ReservationStation>,
    add_sub: Vec<ReservationStation>,
    mul_div: Vec<ReservationStation>,
}

impl StationPools {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            load_store: Self::build_pool(PoolKind::LoadStore, config),
            add_sub: Self::build_pool(PoolKind::AddSub, config),
            mul_div: Self::build_pool(PoolKind::MulDiv, config),
        }
    }

    fn build_pool(kind: PoolKind, config: &ProcessorConfig) -> Vec<ReservationStation> {
        (0..config.station_count_for(kind))
            .map(|index| {
                ReservationStation::new(StationId { pool: kind, index }, config.latency_for(kind))
            })
            .collect()
    }

    /// Recreate every pool from the configuration. All occupancy is lost;
    /// station identities handed out before the rebuild are invalid.
    pub fn rebuild(&mut self, config: &ProcessorConfig) {
        self.load_store = Self::build_pool(PoolKind::LoadStore, config);
        self.add_sub = Self::build_pool(PoolKind::AddSub, config);
        self.mul_div = Self::build_pool(PoolKind::MulDiv, config);
    }

    pub fn pool(&self, kind: PoolKind) -> &[ReservationStation] {
        match kind {
            PoolKind::LoadStore => &self.load_store,
            PoolKind::AddSub => &self.add_sub,
            PoolKind::MulDiv => &self.mul_div,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut Vec<ReservationStation> {
        match kind {
            PoolKind::LoadStore => &mut self.load_store,
            PoolKind::AddSub => &mut self.add_sub,
            PoolKind::MulDiv => &mut self.mul_div,
        }
    }

    pub fn get(&self, id: StationId) -> &ReservationStation {
        &self.pool(id.pool)[id.index]
    }

    pub fn get_mut(&mut self, id: StationId) -> &mut ReservationStation {
        &mut self.pool_mut(id.pool)[id.index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReservationStation> {
        self.load_store
            .iter()
            .chain(self.add_sub.iter())
            .chain(self.mul_div.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ReservationStation> {
        self.load_store
            .iter_mut()
            .chain(self.add_sub.iter_mut())
            .chain(self.mul_div.iter_mut())
    }

    pub fn all_free(&self) -> bool {
        self.iter().all(ReservationStation::is_free)
    }

    pub fn find_free(&self, kind: PoolKind) -> Option<StationId> {
        self.pool(kind)
            .iter()
            .find(|station| station.is_free())
            .map(ReservationStation::id)
    }

    pub fn reset_all(&mut self) {
        for station in self.iter_mut() {
            station.reset();
        }
    }

    pub fn set_latency_cycles(&mut self, kind: PoolKind, cycles: usize) {
        for station in self.pool_mut(kind) {
            station.set_latency_cycles(cycles);
        }
    }
}

/// The common data bus: collects write-back requests during the cycle and
/// grants exactly one of them at arbitration time. The winner's identity
/// stays published until the next arbitration so that waiting stations can
/// match their operand providers against it.
#[derive(Debug, Default)]
pub struct CommonDataBus {
    pending_writers: Vec<StationId>,
    writing_station: Option<StationId>,
}

impl CommonDataBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.pending_writers.clear();
        self.writing_station = None;
    }

    /// Register a write-back request. Requests persist across cycles until
    /// they win arbitration.
    pub fn attempt_write(&mut self, id: StationId) {
        self.pending_writers.push(id);
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending_writers.is_empty()
    }

    /// The station granted the bus in the most recent arbitration.
    pub fn writing_station(&self) -> Option<StationId> {
        self.writing_station
    }

    /// Pick this cycle's write-back winner and flag it. Losing requests stay
    /// pending and compete again next cycle. Under the scoreboard policy a
    /// candidate is skipped while any older station still has to read the
    /// register the candidate would overwrite.
    pub fn arbitrate_write_backs(
        &mut self,
        stations: &mut StationPools,
        algorithm: Algorithm,
    ) -> Option<StationId> {
        self.writing_station = None;
        if self.pending_writers.is_empty() {
            return None;
        }
        let mut candidates = self.pending_writers.clone();
        candidates.sort_by_key(|id| stations.get(*id).issue_number());
        let winner = select_write_back(&candidates, stations, algorithm);
        if let Some(id) = winner {
            self.pending_writers.retain(|pending| *pending != id);
            self.writing_station = Some(id);
            stations.get_mut(id).set_writeback_success(true);
            debug!("cdb: station {} wins write-back arbitration", id);
        }
        winner
    }
}

/// Write-back selection policy over candidates sorted by issue number.
fn select_write_back(
    candidates: &[StationId],
    stations: &StationPools,
    algorithm: Algorithm,
) -> Option<StationId> {
    match algorithm {
        Algorithm::Tomasulo => candidates.first().copied(),
        Algorithm::Scoreboard => candidates.iter().copied().find(|candidate| {
            let writer = stations.get(*candidate);
            !stations
                .iter()
                .any(|station| station.is_busy() && station.has_war_hazard_with(writer))
        }),
    }
}

/// The single-ported data memory. Only the arbitration of the port is
/// modeled; memory contents are not.
#[derive(Debug, Default)]
pub struct DataMemoryPort {
    pending_accesses: Vec<StationId>,
}

impl DataMemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.pending_accesses.clear();
    }

    /// Register a memory-access request. Requests persist across cycles
    /// until they win arbitration.
    pub fn attempt_access(&mut self, id: StationId) {
        self.pending_accesses.push(id);
    }

    pub fn has_pending_accesses(&self) -> bool {
        !self.pending_accesses.is_empty()
    }

    /// Grant the port to the oldest pending request by issue number.
    pub fn arbitrate_accesses(&mut self, stations: &mut StationPools) -> Option<StationId> {
        let winner = self
            .pending_accesses
            .iter()
            .copied()
            .min_by_key(|id| stations.get(*id).issue_number())?;
        self.pending_accesses.retain(|pending| *pending != winner);
        stations.get_mut(winner).set_memory_access_success(true);
        debug!("memory: station {} wins port arbitration", winner);
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;

    fn entry(source: &str, index: usize) -> QueueEntry {
        let instruction = assemble(source).unwrap().remove(0);
        QueueEntry { index, instruction }
    }

    fn pools_with_issued(lines: &[&str]) -> StationPools {
        let config = ProcessorConfig::new();
        let mut pools = StationPools::new(&config);
        for (number, line) in lines.iter().enumerate() {
            let queue_entry = entry(line, number);
            let kind = if queue_entry.instruction.is_add_sub() {
                PoolKind::AddSub
            } else if queue_entry.instruction.is_mul_div() {
                PoolKind::MulDiv
            } else {
                PoolKind::LoadStore
            };
            let id = pools.find_free(kind).unwrap();
            pools
                .get_mut(id)
                .issue(queue_entry, Tag::RegisterFile, Tag::RegisterFile, number);
        }
        pools
    }

    #[test]
    fn tomasulo_write_back_selects_oldest() {
        let pools = pools_with_issued(&["fadd f1, f2, f3", "fsub f4, f5, f6"]);
        let first = StationId { pool: PoolKind::AddSub, index: 0 };
        let second = StationId { pool: PoolKind::AddSub, index: 1 };
        let winner = select_write_back(&[first, second], &pools, Algorithm::Tomasulo);
        assert_eq!(winner, Some(first));
    }

    #[test]
    fn scoreboard_write_back_skips_war_hazards() {
        // Station 1 still has to read f1, which station 2 wants to write.
        let mut pools = pools_with_issued(&["fadd f1, f2, f3", "fsub f4, f1, f6", "fadd f1, f5, f7"]);
        let reader = StationId { pool: PoolKind::AddSub, index: 1 };
        let writer = StationId { pool: PoolKind::AddSub, index: 2 };
        pools.get_mut(reader).state = StationState::WaitingForOperands;
        pools.get_mut(writer).state = StationState::AttemptWriteback;

        let winner = select_write_back(&[writer], &pools, Algorithm::Scoreboard);
        assert_eq!(winner, None);

        // Once the reader has its operands, the write-back goes through.
        pools.get_mut(reader).state = StationState::Executing { counter: 0, latency: 3 };
        let winner = select_write_back(&[writer], &pools, Algorithm::Scoreboard);
        assert_eq!(winner, Some(writer));
    }

    #[test]
    fn losing_write_request_stays_pending() {
        let mut pools = pools_with_issued(&["fadd f1, f2, f3", "fsub f4, f5, f6"]);
        let first = StationId { pool: PoolKind::AddSub, index: 0 };
        let second = StationId { pool: PoolKind::AddSub, index: 1 };
        let mut bus = CommonDataBus::new();
        bus.attempt_write(second);
        bus.attempt_write(first);

        assert_eq!(bus.arbitrate_write_backs(&mut pools, Algorithm::Tomasulo), Some(first));
        assert!(bus.has_pending_writes());
        assert_eq!(bus.arbitrate_write_backs(&mut pools, Algorithm::Tomasulo), Some(second));
        assert!(!bus.has_pending_writes());
    }

    #[test]
    fn provider_resolves_against_bus_winner() {
        let mut pools = pools_with_issued(&["fadd f1, f2, f3", "fsub f4, f5, f6"]);
        let producer = StationId { pool: PoolKind::AddSub, index: 0 };
        let consumer = StationId { pool: PoolKind::AddSub, index: 1 };
        let mut bus = CommonDataBus::new();

        pools.get_mut(consumer).source1_provider = Tag::Station(producer);
        assert!(!pools.get_mut(consumer).operands_ready(&bus));

        bus.attempt_write(producer);
        bus.arbitrate_write_backs(&mut pools, Algorithm::Tomasulo);
        let consumer_station = pools.get_mut(consumer);
        assert!(consumer_station.operands_ready(&bus));
        assert_eq!(consumer_station.source_providers().0, Tag::RegisterFile);
    }

    #[test]
    fn memory_port_grants_oldest_access() {
        let mut pools = pools_with_issued(&["flw f1, 0(x1)", "flw f2, 4(x1)"]);
        let first = StationId { pool: PoolKind::LoadStore, index: 0 };
        let second = StationId { pool: PoolKind::LoadStore, index: 1 };
        let mut port = DataMemoryPort::new();
        port.attempt_access(second);
        port.attempt_access(first);

        assert_eq!(port.arbitrate_accesses(&mut pools), Some(first));
        assert!(port.has_pending_accesses());
        assert_eq!(port.arbitrate_accesses(&mut pools), Some(second));
    }

    #[test]
    fn queue_is_bounded_and_fifo() {
        let mut queue = InstructionQueue::new();
        for index in 0..5 {
            queue.insert(entry("fadd f1, f2, f3", index));
        }
        assert_eq!(queue.len(), INSTRUCTION_QUEUE_SLOTS);
        assert_eq!(queue.num_empty_slots(), 0);
        assert_eq!(queue.top().unwrap().index, 0);
        assert_eq!(queue.consume().unwrap().index, 0);
        assert_eq!(queue.consume().unwrap().index, 1);
        assert_eq!(queue.consume().unwrap().index, 2);
        assert!(queue.consume().is_none());
    }
}
