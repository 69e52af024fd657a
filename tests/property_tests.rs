// tests/property_tests.rs
use proptest::prelude::*;
use quickcheck::TestResult;
use std::collections::HashSet;
use tomasim::assembler::assemble;
use tomasim::simulator::components::{InstructionQueue, QueueEntry, StationState, Tag};
use tomasim::simulator::config::{Algorithm, ProcessorConfig};
use tomasim::simulator::instruction::Register;
use tomasim::simulator::processor::Processor;

// Property-based tests over randomly generated programs and configurations

fn arbitrary_line() -> impl Strategy<Value = String> {
    (0usize..6, 0u8..8, 0u8..8, 0u8..8, 0u8..4, -64i32..64).prop_map(
        |(op, a, b, c, x, offset)| match op {
            0 => format!("fadd f{}, f{}, f{}", a, b, c),
            1 => format!("fsub f{}, f{}, f{}", a, b, c),
            2 => format!("fmul f{}, f{}, f{}", a, b, c),
            3 => format!("fdiv f{}, f{}, f{}", a, b, c),
            4 => format!("flw f{}, {}(x{})", a, offset, x),
            _ => format!("fsw f{}, {}(x{})", a, offset, x),
        },
    )
}

fn arbitrary_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arbitrary_line(), 1..8).prop_map(|lines| lines.join("\n"))
}

fn arbitrary_config() -> impl Strategy<Value = ProcessorConfig> {
    (
        1usize..5,
        1usize..5,
        1usize..5,
        1usize..4,
        1usize..4,
        1usize..4,
        any::<bool>(),
    )
        .prop_map(|(ls_lat, as_lat, md_lat, ls_n, as_n, md_n, scoreboard)| {
            ProcessorConfig::new()
                .with_latencies(ls_lat, as_lat, md_lat)
                .with_station_counts(ls_n, as_n, md_n)
                .with_algorithm(if scoreboard {
                    Algorithm::Scoreboard
                } else {
                    Algorithm::Tomasulo
                })
        })
}

/// Machine-wide invariants that must hold after every cycle.
fn check_invariants(processor: &Processor) {
    let stations: Vec<_> = processor.reservation_stations().collect();

    // At most one write-back and one memory access are granted per cycle.
    let writing = stations
        .iter()
        .filter(|station| matches!(station.state(), StationState::WriteBack))
        .count();
    assert!(writing <= 1, "more than one station won the data bus");
    let accessing = stations
        .iter()
        .filter(|station| matches!(station.state(), StationState::Memory))
        .count();
    assert!(accessing <= 1, "more than one station won the memory port");

    // Issue numbers of busy stations are distinct and follow program order.
    let mut issued: Vec<_> = stations
        .iter()
        .filter(|station| station.is_busy())
        .map(|station| (station.program_index(), station.issue_number()))
        .collect();
    issued.sort_by_key(|(program_index, _)| *program_index);
    for pair in issued.windows(2) {
        assert!(
            pair[0].1 < pair[1].1,
            "issue numbers must increase in program order"
        );
    }

    // An executing station never runs past its latched latency.
    for station in &stations {
        if let StationState::Executing { counter, latency } = station.state() {
            assert!(counter < latency, "execution counter ran past the latency");
        }
    }

    // Every non-free register-status entry names exactly one busy station
    // that is computing that register.
    for index in 0..32 {
        let register = Register::F(index);
        if let Tag::Station(id) = processor.register_status(register) {
            let owners = stations
                .iter()
                .filter(|station| {
                    station.is_busy()
                        && station.id() == id
                        && station.instruction().map(|i| i.destination) == Some(register)
                })
                .count();
            assert_eq!(owners, 1, "dangling register-status entry for {}", register);
        }
    }

    // The queue never grows past its slot count.
    assert!(processor.queue_texts().len() <= processor.num_queue_slots());

    // Without renaming there is never more than one in-flight writer per
    // register.
    if processor.algorithm().is_scoreboard() {
        let mut destinations = HashSet::new();
        for station in &stations {
            if !station.is_busy() {
                continue;
            }
            if let Some(destination) = station.instruction().map(|i| i.destination) {
                if !destination.is_none() {
                    assert!(
                        destinations.insert(destination),
                        "two busy stations write {}",
                        destination
                    );
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_on_every_cycle(
        source in arbitrary_program(),
        config in arbitrary_config(),
    ) {
        let instructions = assemble(&source).expect("generated programs are well-formed");
        let mut processor = Processor::new(config);
        processor.upload_to_memory(instructions);

        for _ in 0..300 {
            if processor.is_quiescent() {
                break;
            }
            processor.tick();
            check_invariants(&processor);
        }
        prop_assert!(processor.is_quiescent(), "program failed to drain in 300 cycles");
    }

    #[test]
    fn simulation_is_deterministic(
        source in arbitrary_program(),
        config in arbitrary_config(),
    ) {
        let instructions = assemble(&source).expect("generated programs are well-formed");

        let mut traces = Vec::new();
        for _ in 0..2 {
            let mut processor = Processor::new(config.clone());
            processor.upload_to_memory(instructions.clone());
            let mut trace = Vec::new();
            for _ in 0..300 {
                if processor.is_quiescent() {
                    break;
                }
                processor.tick();
                trace.push(processor.station_states());
            }
            traces.push((processor.cycle_count(), trace));
        }
        prop_assert_eq!(&traces[0], &traces[1]);
    }
}

// QuickCheck-based tests

fn make_entry(index: usize) -> QueueEntry {
    let instruction = assemble("fadd f1, f2, f3").unwrap().remove(0);
    QueueEntry { index, instruction }
}

fn qc_queue_is_bounded_and_fifo(count: u8) -> bool {
    let count = (count % 12) as usize;
    let mut queue = InstructionQueue::new();
    for index in 0..count {
        queue.insert(make_entry(index));
    }
    if queue.len() > InstructionQueue::num_slots() {
        return false;
    }

    let mut consumed = Vec::new();
    while let Some(entry) = queue.consume() {
        consumed.push(entry.index);
    }
    consumed == (0..count.min(InstructionQueue::num_slots())).collect::<Vec<_>>()
}

fn qc_arithmetic_lines_always_assemble(a: u8, b: u8, c: u8) -> bool {
    let line = format!("fadd f{}, f{}, f{}", a % 32, b % 32, c % 32);
    assemble(&line).is_ok()
}

fn qc_error_lines_are_one_based(valid_prefix: u8) -> TestResult {
    if valid_prefix > 20 {
        return TestResult::discard();
    }
    let mut lines = vec!["fadd f1, f2, f3"; valid_prefix as usize];
    lines.push("not an instruction");
    let source = lines.join("\n");

    match assemble(&source) {
        Err(tomasim::SimulatorError::AssemblyError { line }) => {
            TestResult::from_bool(line == valid_prefix as usize + 1)
        },
        _ => TestResult::from_bool(false),
    }
}

#[test]
fn run_quickcheck_tests() {
    quickcheck::QuickCheck::new()
        .tests(50)
        .quickcheck(qc_queue_is_bounded_and_fifo as fn(u8) -> bool);

    quickcheck::QuickCheck::new()
        .tests(50)
        .quickcheck(qc_arithmetic_lines_always_assemble as fn(u8, u8, u8) -> bool);

    quickcheck::QuickCheck::new()
        .tests(25)
        .quickcheck(qc_error_lines_are_one_based as fn(u8) -> TestResult);
}
