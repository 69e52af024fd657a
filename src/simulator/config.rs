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

// config.rs
//
// This file contains the configuration structs for the scheduling simulator.
// It defines the algorithm selector, the per-pool latencies and station
// counts, and the lenient field-parsing helpers used by live configuration
// surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::components::PoolKind;

/// Upper bound on the number of reservation stations in a single pool.
pub const MAX_STATIONS_PER_POOL: usize = 10;

/// Cycle budget for the run-to-end helper.
pub const RUN_CYCLE_LIMIT: usize = 300;

/// The dynamic-scheduling algorithm driving issue and write-back decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Register renaming through reservation stations; WAW and WAR hazards
    /// are eliminated, only RAW dependencies stall.
    Tomasulo,
    /// No renaming; issue stalls on WAW, write-back stalls on WAR.
    Scoreboard,
}

impl Algorithm {
    pub fn is_tomasulo(&self) -> bool {
        matches!(self, Algorithm::Tomasulo)
    }

    pub fn is_scoreboard(&self) -> bool {
        matches!(self, Algorithm::Scoreboard)
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Tomasulo
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Tomasulo => write!(f, "Tomasulo"),
            Algorithm::Scoreboard => write!(f, "Scoreboard"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tomasulo" => Ok(Algorithm::Tomasulo),
            "scoreboard" => Ok(Algorithm::Scoreboard),
            other => Err(format!("unknown scheduling algorithm: {}", other)),
        }
    }
}

/// Configuration for the processor: scheduling algorithm, execution latency
/// per pool, and reservation-station count per pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub algorithm: Algorithm,
    pub load_store_latency: usize,
    pub add_sub_latency: usize,
    pub mul_div_latency: usize,
    pub load_store_stations: usize,
    pub add_sub_stations: usize,
    pub mul_div_stations: usize,
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::Tomasulo,
            load_store_latency: 1,
            add_sub_latency: 3,
            mul_div_latency: 7,
            load_store_stations: 4,
            add_sub_stations: 3,
            mul_div_stations: 2,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_latencies(mut self, load_store: usize, add_sub: usize, mul_div: usize) -> Self {
        assert!(load_store > 0, "Load/store latency must be positive");
        assert!(add_sub > 0, "Add/sub latency must be positive");
        assert!(mul_div > 0, "Mul/div latency must be positive");
        self.load_store_latency = load_store;
        self.add_sub_latency = add_sub;
        self.mul_div_latency = mul_div;
        self
    }

    pub fn with_station_counts(mut self, load_store: usize, add_sub: usize, mul_div: usize) -> Self {
        assert!(load_store > 0, "Load/store station count must be positive");
        assert!(add_sub > 0, "Add/sub station count must be positive");
        assert!(mul_div > 0, "Mul/div station count must be positive");
        self.load_store_stations = load_store.min(MAX_STATIONS_PER_POOL);
        self.add_sub_stations = add_sub.min(MAX_STATIONS_PER_POOL);
        self.mul_div_stations = mul_div.min(MAX_STATIONS_PER_POOL);
        self
    }

    pub fn latency_for(&self, pool: PoolKind) -> usize {
        match pool {
            PoolKind::LoadStore => self.load_store_latency,
            PoolKind::AddSub => self.add_sub_latency,
            PoolKind::MulDiv => self.mul_div_latency,
        }
    }

    pub fn station_count_for(&self, pool: PoolKind) -> usize {
        match pool {
            PoolKind::LoadStore => self.load_store_stations,
            PoolKind::AddSub => self.add_sub_stations,
            PoolKind::MulDiv => self.mul_div_stations,
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a latency field from a live configuration surface. Unparseable text
/// and non-positive values keep the previous setting.
pub fn parse_latency_field(text: &str, previous: usize) -> usize {
    match text.trim().parse::<usize>() {
        Ok(value) if value > 0 => value,
        _ => previous,
    }
}

/// Parse a station-count field from a live configuration surface.
/// Unparseable text and non-positive values keep the previous setting;
/// values above the pool cap are clamped to it.
pub fn parse_station_count_field(text: &str, previous: usize) -> usize {
    match text.trim().parse::<usize>() {
        Ok(value) if value > 0 => value.min(MAX_STATIONS_PER_POOL),
        _ => previous,
    }
}
