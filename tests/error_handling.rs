// tests/error_handling.rs
use tomasim::assembler::assemble;
use tomasim::errors::SimulatorError;
use tomasim::simulator::config::{parse_latency_field, parse_station_count_field};
use tomasim::simulator::instruction::{Operation, Register};

fn offending_line(source: &str) -> usize {
    match assemble(source) {
        Err(SimulatorError::AssemblyError { line }) => line,
        other => panic!("expected an assembly error, got {:?}", other.map(|i| i.len())),
    }
}

#[test]
fn assembles_the_full_instruction_set() {
    let source = "fadd f1, f2, f3\n\
                  fsub f3, f4, f6\n\
                  fmul f5, f10, f1\n\
                  fdiv f7, f8, f9\n\
                  flw f5, 100(x1)\n\
                  fsw f6, 200(x2)";
    let instructions = assemble(source).unwrap();
    assert_eq!(instructions.len(), 6);

    assert_eq!(instructions[0].operation, Operation::Add);
    assert_eq!(instructions[0].destination, Register::F(1));
    assert_eq!(instructions[0].source1, Register::F(2));
    assert_eq!(instructions[0].source2, Register::F(3));
    assert_eq!(instructions[0].offset, None);

    let load = &instructions[4];
    assert_eq!(load.operation, Operation::Load);
    assert_eq!(load.destination, Register::F(5));
    assert_eq!(load.source1, Register::X(1));
    assert_eq!(load.source2, Register::None);
    assert_eq!(load.offset, Some(100));

    let store = &instructions[5];
    assert_eq!(store.operation, Operation::Store);
    assert_eq!(store.destination, Register::None);
    assert_eq!(store.source1, Register::F(6));
    assert_eq!(store.source2, Register::X(2));
    assert_eq!(store.offset, Some(200));
}

#[test]
fn source_is_case_insensitive_and_text_is_normalized() {
    let instructions = assemble("  FADD F1, F2, F3  ").unwrap();
    assert_eq!(instructions[0].raw_text, "fadd f1, f2, f3");
}

#[test]
fn empty_lines_are_skipped_but_still_counted() {
    let instructions = assemble("\nfadd f1, f2, f3\n\n\nfsw f6, 0(x0)\n").unwrap();
    assert_eq!(instructions.len(), 2);

    assert_eq!(offending_line("fadd f1, f2, f3\n\nbogus line"), 3);
}

#[test]
fn reports_the_first_offending_line() {
    assert_eq!(offending_line("nonsense"), 1);
    assert_eq!(offending_line("fadd f1, f2, f3\nfadd f1, f2\nfadd f1, f2, f3"), 2);
}

#[test]
fn rejects_malformed_operands() {
    // Register index out of range.
    assert!(assemble("fadd f32, f2, f3").is_err());
    // Leading zero in a register name.
    assert!(assemble("fadd f01, f2, f3").is_err());
    // Address register where a floating-point register is required.
    assert!(assemble("fadd x1, f2, f3").is_err());
    // Wrong token count.
    assert!(assemble("fadd f1, f2").is_err());
    assert!(assemble("fadd f1, f2, f3, f4").is_err());
    // Unknown opcode.
    assert!(assemble("fmadd f1, f2, f3").is_err());
    // Offset must be an integer.
    assert!(assemble("flw f1, abc(x1)").is_err());
    // Loads and stores need an address register.
    assert!(assemble("flw f1, 4(f1)").is_err());
}

#[test]
fn accepts_negative_offsets() {
    let instructions = assemble("flw f1, -8(x2)").unwrap();
    assert_eq!(instructions[0].offset, Some(-8));
    let instructions = assemble("fsw f1, -0(x2)").unwrap();
    assert_eq!(instructions[0].offset, Some(0));
}

#[test]
fn boundary_register_indices_are_accepted() {
    let instructions = assemble("fadd f0, f31, f0\nflw f31, 0(x31)").unwrap();
    assert_eq!(instructions[0].destination, Register::F(0));
    assert_eq!(instructions[0].source1, Register::F(31));
    assert_eq!(instructions[1].source1, Register::X(31));
}

#[test]
fn assembly_errors_render_the_line_number() {
    let err = assemble("what is this").unwrap_err();
    assert_eq!(err.to_string(), "Assembly error at line 1");
}

#[test]
fn latency_fields_keep_previous_value_on_bad_input() {
    assert_eq!(parse_latency_field("4", 3), 4);
    assert_eq!(parse_latency_field(" 7 ", 3), 7);
    assert_eq!(parse_latency_field("0", 3), 3);
    assert_eq!(parse_latency_field("-2", 3), 3);
    assert_eq!(parse_latency_field("abc", 3), 3);
    assert_eq!(parse_latency_field("", 3), 3);
}

#[test]
fn station_count_fields_are_clamped_to_the_cap() {
    assert_eq!(parse_station_count_field("5", 2), 5);
    assert_eq!(parse_station_count_field("10", 2), 10);
    assert_eq!(parse_station_count_field("11", 2), 10);
    assert_eq!(parse_station_count_field("999", 2), 10);
    assert_eq!(parse_station_count_field("0", 2), 2);
    assert_eq!(parse_station_count_field("three", 2), 2);
}
