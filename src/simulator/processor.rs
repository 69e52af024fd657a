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

// processor.rs
//
// This file contains the processor facade. It owns every component, drives
// the fixed per-cycle order, applies configuration changes, and exposes the
// read-only observers that the presentation layer polls each cycle.

use log::info;

use super::components::{
    CommonDataBus, DataMemoryPort, InstructionMemory, InstructionQueue, PoolKind, QueueEntry,
    ReservationStation, StationPools, Tag,
};
use super::config::{Algorithm, ProcessorConfig, MAX_STATIONS_PER_POOL, RUN_CYCLE_LIMIT};
use super::instruction::{Instruction, Register};
use super::scheduler::Scheduler;

/// The simulated processor.
///
/// One call to `tick` is one clock edge. Within a tick the order of
/// operations is fixed: station state machines advance, the queue head is
/// issued if possible, the common data bus and then the memory port
/// arbitrate, and finally every station consumes its arbitration outcome.
#[derive(Debug)]
pub struct Processor {
    config: ProcessorConfig,
    program_loaded: bool,
    instruction_memory: InstructionMemory,
    instruction_pointer: usize,
    cycle_count: usize,
    instruction_queue: InstructionQueue,
    data_memory: DataMemoryPort,
    common_data_bus: CommonDataBus,
    stations: StationPools,
    scheduler: Scheduler,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        let stations = StationPools::new(&config);
        let scheduler = Scheduler::new(config.algorithm);
        Self {
            config,
            program_loaded: false,
            instruction_memory: InstructionMemory::new(),
            instruction_pointer: 0,
            cycle_count: 0,
            instruction_queue: InstructionQueue::new(),
            data_memory: DataMemoryPort::new(),
            common_data_bus: CommonDataBus::new(),
            stations,
            scheduler,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Return every component to its initial state. A reset processor is
    /// indistinguishable from a freshly constructed one with the same
    /// configuration.
    pub fn reset(&mut self) {
        self.program_loaded = false;
        self.instruction_memory = InstructionMemory::new();
        self.instruction_pointer = 0;
        self.cycle_count = 0;
        self.instruction_queue.reset();
        self.data_memory.reset();
        self.common_data_bus.reset();
        self.stations.reset_all();
        self.scheduler.reset();
        info!("processor reset");
    }

    /// Load a program, resetting first, and pre-fill the instruction queue.
    pub fn upload_to_memory(&mut self, instructions: Vec<Instruction>) {
        self.reset();
        info!("uploading {} instructions", instructions.len());
        self.instruction_memory.upload(instructions);
        self.program_loaded = true;
        self.fill_instruction_queue();
    }

    /// Advance the machine by one cycle. A no-op when no program is loaded
    /// or when the machine is quiescent.
    pub fn tick(&mut self) {
        if !self.program_loaded || self.is_quiescent() {
            return;
        }
        self.cycle_count += 1;
        let algorithm = self.scheduler.algorithm();

        for station in self.stations.iter_mut() {
            station.tick(algorithm, &mut self.common_data_bus, &mut self.data_memory);
        }

        let issued = self
            .scheduler
            .attempt_issue(self.instruction_queue.top(), &mut self.stations);
        if issued {
            self.instruction_queue.consume();
            if !self.program_finished() {
                self.fetch_into_queue();
            }
        }

        let writer = self
            .common_data_bus
            .arbitrate_write_backs(&mut self.stations, algorithm);
        self.scheduler.update_register_status(writer, &self.stations);
        self.data_memory.arbitrate_accesses(&mut self.stations);

        for station in self.stations.iter_mut() {
            station.after_tick();
        }
    }

    /// Tick until the machine is quiescent, up to the run cycle limit.
    /// Returns the cycle count reached.
    pub fn run_to_end(&mut self) -> usize {
        for _ in 0..RUN_CYCLE_LIMIT {
            if !self.program_loaded || self.is_quiescent() {
                break;
            }
            self.tick();
        }
        self.cycle_count
    }

    /// True once the whole program has drained: everything fetched, the
    /// queue empty, and every station free.
    pub fn is_quiescent(&self) -> bool {
        self.program_finished() && self.instruction_queue.is_empty() && self.stations.all_free()
    }

    // --- Configuration -----------------------------------------------------

    pub fn algorithm(&self) -> Algorithm {
        self.scheduler.algorithm()
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
        self.scheduler.set_algorithm(algorithm);
    }

    /// Update the per-pool execution latencies. Non-positive values keep
    /// the previous setting. Stations already executing keep the latency
    /// they latched when execution began.
    pub fn set_latency_cycles(&mut self, load_store: usize, add_sub: usize, mul_div: usize) {
        if load_store > 0 {
            self.config.load_store_latency = load_store;
        }
        if add_sub > 0 {
            self.config.add_sub_latency = add_sub;
        }
        if mul_div > 0 {
            self.config.mul_div_latency = mul_div;
        }
        for pool in PoolKind::ALL {
            self.stations
                .set_latency_cycles(pool, self.config.latency_for(pool));
        }
    }

    /// Resize the station pools. Non-positive values keep the previous
    /// setting; values above the pool cap are clamped. Rebuilding discards
    /// all in-flight work, so the register-status map and both arbiters are
    /// cleared along with the pools (station identities do not survive a
    /// rebuild).
    pub fn set_station_counts(&mut self, load_store: usize, add_sub: usize, mul_div: usize) {
        if load_store > 0 {
            self.config.load_store_stations = load_store.min(MAX_STATIONS_PER_POOL);
        }
        if add_sub > 0 {
            self.config.add_sub_stations = add_sub.min(MAX_STATIONS_PER_POOL);
        }
        if mul_div > 0 {
            self.config.mul_div_stations = mul_div.min(MAX_STATIONS_PER_POOL);
        }
        self.stations.rebuild(&self.config);
        self.common_data_bus.reset();
        self.data_memory.reset();
        self.scheduler.reset();
    }

    // --- Observers ---------------------------------------------------------

    pub fn cycle_count(&self) -> usize {
        self.cycle_count
    }

    pub fn num_queue_slots(&self) -> usize {
        InstructionQueue::num_slots()
    }

    /// Raw text of each occupied queue slot, head first.
    pub fn queue_texts(&self) -> Vec<String> {
        self.instruction_queue.texts()
    }

    pub fn station_is_free(&self, pool: PoolKind, index: usize) -> bool {
        self.stations
            .pool(pool)
            .get(index)
            .is_some_and(ReservationStation::is_free)
    }

    pub fn station_is_just_issued(&self, pool: PoolKind, index: usize) -> bool {
        self.stations
            .pool(pool)
            .get(index)
            .is_some_and(ReservationStation::is_just_issued)
    }

    pub fn station_instruction_text(&self, pool: PoolKind, index: usize) -> Option<String> {
        self.stations
            .pool(pool)
            .get(index)?
            .instruction()
            .map(|instruction| instruction.raw_text.clone())
    }

    /// `(program_index, glyph)` for every occupied station; the timing table
    /// writes each glyph into the row of the instruction at the current
    /// cycle's column.
    pub fn station_states(&self) -> Vec<(usize, String)> {
        self.stations
            .iter()
            .filter(|station| station.is_busy())
            .map(|station| (station.program_index(), station.state_glyph()))
            .collect()
    }

    /// Current provider of a register's next value.
    pub fn register_status(&self, register: Register) -> Tag {
        self.scheduler.register_status(register)
    }

    /// Read-only view of every reservation station, load/store pool first.
    pub fn reservation_stations(&self) -> impl Iterator<Item = &ReservationStation> {
        self.stations.iter()
    }

    fn program_finished(&self) -> bool {
        self.instruction_pointer >= self.instruction_memory.len()
    }

    fn fill_instruction_queue(&mut self) {
        for _ in 0..self.instruction_queue.num_empty_slots() {
            if self.program_finished() {
                break;
            }
            self.fetch_into_queue();
        }
    }

    fn fetch_into_queue(&mut self) {
        if let Some(instruction) = self.instruction_memory.at(self.instruction_pointer).cloned() {
            self.instruction_queue.insert(QueueEntry {
                index: self.instruction_pointer,
                instruction,
            });
            self.instruction_pointer += 1;
        }
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessorConfig::new())
    }
}
