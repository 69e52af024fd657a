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

// main.rs
//
// This file contains the main entry point for the scheduling simulator.
// It provides a command-line interface for running an assembly program
// through the Tomasulo or scoreboard scheduler and printing the resulting
// timing table.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use tomasim::assembler::assemble;
use tomasim::simulator::config::{Algorithm, ProcessorConfig};
use tomasim::simulator::instruction::Instruction;
use tomasim::simulator::processor::Processor;
use tomasim::simulator::visualization::{OutputFormat, TimingTable};

#[derive(Parser)]
#[command(name = "tomasim")]
#[command(about = "A cycle-accurate Tomasulo and scoreboard dynamic-scheduling simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program through the scheduling simulator
    Run {
        /// Input assembly file (defaults to a built-in sample program)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Scheduling algorithm (tomasulo, scoreboard)
        #[arg(short, long, default_value = "tomasulo")]
        algorithm: String,

        /// JSON configuration file; overrides the latency and station flags
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Load/store execution latency in cycles
        #[arg(long, default_value = "1")]
        load_store_latency: usize,

        /// Add/sub execution latency in cycles
        #[arg(long, default_value = "3")]
        add_sub_latency: usize,

        /// Mul/div execution latency in cycles
        #[arg(long, default_value = "7")]
        mul_div_latency: usize,

        /// Number of load/store reservation stations
        #[arg(long, default_value = "4")]
        load_store_stations: usize,

        /// Number of add/sub reservation stations
        #[arg(long, default_value = "3")]
        add_sub_stations: usize,

        /// Number of mul/div reservation stations
        #[arg(long, default_value = "2")]
        mul_div_stations: usize,

        /// Output format for the timing table (text, csv, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Maximum number of cycles to simulate
        #[arg(long, default_value = "300")]
        max_cycles: usize,

        /// Print per-cycle reservation-station occupancy
        #[arg(short, long)]
        trace: bool,
    },
    /// Assemble a program and report the first offending line, if any
    Assemble {
        /// Input assembly file (defaults to a built-in sample program)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

// The program preloaded into the editor of the original tool
fn sample_program() -> String {
    "fadd f1, f2, f3\n\
     fsub f3, f4, f6\n\
     fmul f5, f10, f1\n\
     flw f5, 100(x1)\n\
     fsw f6, 200(x2)\n"
        .to_string()
}

fn load_source(input: Option<&PathBuf>) -> String {
    match input {
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("Failed to read {}: {}", path.display(), err);
                process::exit(2);
            },
        },
        None => sample_program(),
    }
}

fn parse_algorithm(name: &str) -> Algorithm {
    match Algorithm::from_str(name) {
        Ok(algorithm) => algorithm,
        Err(err) => {
            eprintln!("{} (expected 'tomasulo' or 'scoreboard')", err);
            process::exit(2);
        },
    }
}

fn parse_format(name: &str) -> OutputFormat {
    match name.to_lowercase().as_str() {
        "text" => OutputFormat::Text,
        "csv" => OutputFormat::Csv,
        "json" => OutputFormat::Json,
        other => {
            eprintln!("Unknown output format: {} (expected text, csv, or json)", other);
            process::exit(2);
        },
    }
}

fn load_config_file(path: &PathBuf) -> ProcessorConfig {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read {}: {}", path.display(), err);
            process::exit(2);
        },
    };
    match serde_json::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration in {}: {}", path.display(), err);
            process::exit(2);
        },
    }
}

fn assemble_or_exit(source: &str) -> Vec<Instruction> {
    match assemble(source) {
        Ok(instructions) => instructions,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            process::exit(1);
        },
    }
}

fn print_trace(processor: &Processor) {
    println!("cycle {}:", processor.cycle_count());
    for station in processor.reservation_stations() {
        if let Some(instruction) = station.instruction() {
            println!(
                "  {} [{:>2}] {}",
                station.id(),
                station.state_glyph(),
                instruction
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_command(
    input: Option<&PathBuf>,
    algorithm: &str,
    config_file: Option<&PathBuf>,
    latencies: (usize, usize, usize),
    station_counts: (usize, usize, usize),
    format: &str,
    max_cycles: usize,
    trace: bool,
) {
    let source = load_source(input);
    let instructions = assemble_or_exit(&source);
    if instructions.is_empty() {
        println!("Nothing to simulate");
        return;
    }

    let config = match config_file {
        Some(path) => load_config_file(path),
        None => ProcessorConfig::new()
            .with_algorithm(parse_algorithm(algorithm))
            .with_latencies(latencies.0, latencies.1, latencies.2)
            .with_station_counts(station_counts.0, station_counts.1, station_counts.2),
    };
    let format = parse_format(format);

    let mut processor = Processor::new(config);
    processor.upload_to_memory(instructions.clone());

    let mut table = TimingTable::new(&instructions);
    for _ in 0..max_cycles {
        if processor.is_quiescent() {
            break;
        }
        processor.tick();
        table.record_cycle(&processor);
        if trace {
            print_trace(&processor);
        }
    }

    println!("{}", table.render(format));
    let summary = format!(
        "Completed in {} cycles ({})",
        processor.cycle_count(),
        processor.algorithm()
    );
    if processor.is_quiescent() {
        println!("{}", summary.green());
    } else {
        println!(
            "{}",
            format!("Stopped after {} cycles without draining", processor.cycle_count()).yellow()
        );
    }
}

fn assemble_command(input: Option<&PathBuf>) {
    let source = load_source(input);
    match assemble(&source) {
        Ok(instructions) => {
            println!("{} ({} instructions)", "Pass".green(), instructions.len());
        },
        Err(err) => {
            println!("{}", err.to_string().red());
            process::exit(1);
        },
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            algorithm,
            config,
            load_store_latency,
            add_sub_latency,
            mul_div_latency,
            load_store_stations,
            add_sub_stations,
            mul_div_stations,
            format,
            max_cycles,
            trace,
        } => run_command(
            input.as_ref(),
            &algorithm,
            config.as_ref(),
            (load_store_latency, add_sub_latency, mul_div_latency),
            (load_store_stations, add_sub_stations, mul_div_stations),
            &format,
            max_cycles,
            trace,
        ),
        Commands::Assemble { input } => assemble_command(input.as_ref()),
    }
}
