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

// visualization.rs
//
// This file contains the timing-table builder. It polls the processor's
// per-station states after each cycle and renders the resulting
// instruction-by-cycle grid in different output formats (text, CSV, JSON).

use super::instruction::Instruction;
use super::processor::Processor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

/// Per-instruction, per-cycle record of pipeline-stage glyphs.
///
/// Rows are the program's instructions in order; column `c` holds the glyph
/// each instruction's station showed at the end of cycle `c`.
#[derive(Debug, Clone)]
pub struct TimingTable {
    row_labels: Vec<String>,
    cells: Vec<Vec<String>>,
    cycles: usize,
}

impl TimingTable {
    pub fn new(program: &[Instruction]) -> Self {
        Self {
            row_labels: program
                .iter()
                .map(|instruction| instruction.raw_text.clone())
                .collect(),
            cells: vec![Vec::new(); program.len()],
            cycles: 0,
        }
    }

    /// Poll the processor after a tick and record every occupied station's
    /// glyph in the current cycle's column.
    pub fn record_cycle(&mut self, processor: &Processor) {
        let cycle = processor.cycle_count();
        if cycle == 0 {
            return;
        }
        if cycle > self.cycles {
            self.cycles = cycle;
        }
        for row in &mut self.cells {
            while row.len() < self.cycles {
                row.push(String::new());
            }
        }
        for (index, glyph) in processor.station_states() {
            if let Some(row) = self.cells.get_mut(index) {
                row[cycle - 1] = glyph;
            }
        }
    }

    pub fn num_cycles(&self) -> usize {
        self.cycles
    }

    pub fn num_rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Glyphs of one instruction across all recorded cycles.
    pub fn row(&self, index: usize) -> &[String] {
        &self.cells[index]
    }

    /// Glyph of one instruction at a one-based cycle, empty if out of range.
    pub fn glyph(&self, row: usize, cycle: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(cycle.wrapping_sub(1)))
            .map_or("", String::as_str)
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Csv => self.render_csv(),
            OutputFormat::Json => self.render_json(),
        }
    }

    fn render_text(&self) -> String {
        let label_width = self
            .row_labels
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Instruction".len());
        let cell_width = self
            .cells
            .iter()
            .flatten()
            .map(String::len)
            .max()
            .unwrap_or(1)
            .max(self.cycles.to_string().len())
            .max(2);

        let mut result = String::new();
        let mut border = format!("+{}+", "-".repeat(label_width + 2));
        for _ in 0..self.cycles {
            border.push_str(&"-".repeat(cell_width + 2));
            border.push('+');
        }
        border.push('\n');

        result.push_str(&border);
        result.push_str(&format!("| {:<label_width$} |", "Instruction"));
        for cycle in 1..=self.cycles {
            result.push_str(&format!(" {:>cell_width$} |", cycle));
        }
        result.push('\n');
        result.push_str(&border);

        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            result.push_str(&format!("| {:<label_width$} |", label));
            for cycle in 0..self.cycles {
                let glyph = row.get(cycle).map_or("", String::as_str);
                result.push_str(&format!(" {:>cell_width$} |", glyph));
            }
            result.push('\n');
        }
        result.push_str(&border);
        result
    }

    fn render_csv(&self) -> String {
        let mut result = String::from("Instruction");
        for cycle in 1..=self.cycles {
            result.push_str(&format!(",{}", cycle));
        }
        result.push('\n');
        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            result.push_str(&format!("\"{}\"", label));
            for cycle in 0..self.cycles {
                result.push(',');
                result.push_str(row.get(cycle).map_or("", String::as_str));
            }
            result.push('\n');
        }
        result
    }

    fn render_json(&self) -> String {
        let mut result = String::new();
        result.push_str("{\n");
        result.push_str(&format!("  \"cycles\": {},\n", self.cycles));
        result.push_str("  \"rows\": [\n");
        for (i, (label, row)) in self.row_labels.iter().zip(&self.cells).enumerate() {
            result.push_str("    {\n");
            result.push_str(&format!("      \"instruction\": \"{}\",\n", label));
            result.push_str("      \"states\": [");
            for cycle in 0..self.cycles {
                if cycle > 0 {
                    result.push_str(", ");
                }
                result.push_str(&format!("\"{}\"", row.get(cycle).map_or("", String::as_str)));
            }
            result.push_str("]\n");
            result.push_str("    }");
            if i < self.row_labels.len() - 1 {
                result.push(',');
            }
            result.push('\n');
        }
        result.push_str("  ]\n");
        result.push_str("}\n");
        result
    }
}
